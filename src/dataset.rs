//! One-shot loader for the two dashboard inputs: the GeoJSON world-geometry
//! document and the emissions CSV.
//!
//! Loading happens once at startup and either yields a complete [`Dataset`]
//! or fails with [`LoadError`]; there is no retry and no partial result.
//! Sparse data (a country-year with no row) is not an error here; it
//! surfaces downstream as a name-only stub and the no-data fill.

use crate::models::{EmissionRecord, FeatureProps, GeometryFeature, PolygonRings};
use ahash::AHashMap;
use geojson::{GeoJson, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse CSV row")]
    Csv(#[from] csv::Error),
    #[error("failed to parse geometry document")]
    Geometry(#[from] geojson::Error),
    #[error("dataset contains no usable rows")]
    Empty,
}

/// The loaded dataset: records are immutable after load; features carry the
/// mutable per-year `props` reattached by [`Dataset::attach_year`].
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<EmissionRecord>,
    pub features: Vec<GeometryFeature>,
    /// (country_code, year) -> index into `records`.
    index: AHashMap<(String, i32), usize>,
    /// country_code -> country name, for the stub when a year is missing.
    name_by_code: AHashMap<String, String>,
    year_extent: (i32, i32),
}

impl Dataset {
    /// Load both resources. Either both parse or the whole load fails.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        geometry_path: P,
        csv_path: Q,
    ) -> Result<Self, LoadError> {
        let records = read_records(csv_path)?;
        let features = read_features(geometry_path)?;
        log::info!(
            "loaded {} records across {} features",
            records.len(),
            features.len()
        );
        Self::from_parts(features, records)
    }

    /// Assemble a dataset from already-parsed parts (also the test seam).
    pub fn from_parts(
        features: Vec<GeometryFeature>,
        records: Vec<EmissionRecord>,
    ) -> Result<Self, LoadError> {
        let years: Vec<i32> = records.iter().map(|r| r.year).collect();
        let (min_year, max_year) = match (years.iter().min(), years.iter().max()) {
            (Some(&lo), Some(&hi)) => (lo, hi),
            _ => return Err(LoadError::Empty),
        };

        let mut index = AHashMap::with_capacity(records.len());
        let mut name_by_code = AHashMap::new();
        for (i, r) in records.iter().enumerate() {
            index.entry((r.country_code.clone(), r.year)).or_insert(i);
            name_by_code
                .entry(r.country_code.clone())
                .or_insert_with(|| r.country.clone());
        }

        Ok(Self {
            records,
            features,
            index,
            name_by_code,
            year_extent: (min_year, max_year),
        })
    }

    /// (min, max) year across all records.
    pub fn year_extent(&self) -> (i32, i32) {
        self.year_extent
    }

    /// Attach each feature's record for `year`, or the name-only stub when
    /// the dataset has no row for that (code, year).
    pub fn attach_year(&mut self, year: i32) {
        let Dataset {
            features,
            index,
            records,
            name_by_code,
            ..
        } = self;
        for f in features.iter_mut() {
            f.props = match index.get(&(f.id.clone(), year)) {
                Some(&i) => FeatureProps::Record(records[i].clone()),
                None => FeatureProps::Stub {
                    country: name_by_code.get(&f.id).cloned().unwrap_or_default(),
                },
            };
        }
    }

    pub fn records_for_year(&self, year: i32) -> impl Iterator<Item = &EmissionRecord> {
        self.records.iter().filter(move |r| r.year == year)
    }

    pub fn records_for_country<'a>(
        &'a self,
        country: &'a str,
    ) -> impl Iterator<Item = &'a EmissionRecord> {
        self.records.iter().filter(move |r| r.country == country)
    }
}

/// Parse the CSV into records. Public so the CLI `export` path can run
/// without a geometry document.
pub fn read_records<P: AsRef<Path>>(csv_path: P) -> Result<Vec<EmissionRecord>, LoadError> {
    let path = csv_path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = csv::Reader::from_reader(BufReader::new(file));
    let mut records = Vec::new();
    for row in rdr.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Parse the geometry document into features. Only polygonal geometry is
/// kept; the dashboard has no use for points or lines.
pub fn read_features<P: AsRef<Path>>(geometry_path: P) -> Result<Vec<GeometryFeature>, LoadError> {
    let path = geometry_path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson = GeoJson::from_reader(BufReader::new(file)).map_err(geojson::Error::from)?;

    let mut out = Vec::new();
    if let GeoJson::FeatureCollection(collection) = geojson {
        for feature in collection.features {
            let id = match &feature.id {
                Some(geojson::feature::Id::String(s)) => s.clone(),
                Some(geojson::feature::Id::Number(n)) => n.to_string(),
                None => continue,
            };
            let Some(geometry) = feature.geometry else {
                continue;
            };
            let polygons = polygons_of(&geometry.value);
            if polygons.is_empty() {
                continue;
            }
            out.push(GeometryFeature {
                id,
                polygons,
                props: FeatureProps::Stub {
                    country: String::new(),
                },
            });
        }
    }
    Ok(out)
}

fn polygons_of(value: &Value) -> Vec<PolygonRings> {
    let ring = |positions: &[Vec<f64>]| -> Vec<(f64, f64)> {
        positions
            .iter()
            .filter(|p| p.len() >= 2)
            .map(|p| (p[0], p[1]))
            .collect()
    };
    let polygon = |rings: &[Vec<Vec<f64>>]| -> Option<PolygonRings> {
        let mut it = rings.iter();
        let exterior = ring(it.next()?);
        Some(PolygonRings {
            exterior,
            holes: it.map(|r| ring(r)).collect(),
        })
    };
    match value {
        Value::Polygon(rings) => polygon(rings).into_iter().collect(),
        Value::MultiPolygon(polygons) => polygons.iter().filter_map(|p| polygon(p)).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metric;

    fn rec(code: &str, country: &str, year: i32, emissions: Option<f64>) -> EmissionRecord {
        EmissionRecord {
            continent: "Europe".into(),
            country: country.into(),
            country_code: code.into(),
            emissions,
            per_capita: None,
            per_gdp: None,
            region: "West".into(),
            year,
        }
    }

    fn feat(id: &str) -> GeometryFeature {
        GeometryFeature {
            id: id.into(),
            polygons: vec![PolygonRings {
                exterior: vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
                holes: vec![],
            }],
            props: FeatureProps::Stub {
                country: String::new(),
            },
        }
    }

    #[test]
    fn attach_year_pins_every_record_to_that_year() {
        let mut ds = Dataset::from_parts(
            vec![feat("250"), feat("276")],
            vec![
                rec("250", "France", 2000, Some(1.0)),
                rec("250", "France", 2001, Some(2.0)),
                rec("276", "Germany", 2001, Some(3.0)),
            ],
        )
        .unwrap();

        for year in 2000..=2001 {
            ds.attach_year(year);
            for f in &ds.features {
                if let Some(r) = f.props.record() {
                    assert_eq!(r.year, year);
                }
            }
        }
    }

    #[test]
    fn missing_year_attaches_a_named_stub() {
        let mut ds = Dataset::from_parts(
            vec![feat("276")],
            vec![
                rec("276", "Germany", 2001, Some(3.0)),
                rec("250", "France", 2000, Some(1.0)),
            ],
        )
        .unwrap();
        ds.attach_year(2000);
        assert_eq!(
            ds.features[0].props,
            FeatureProps::Stub {
                country: "Germany".into()
            }
        );
    }

    #[test]
    fn unknown_code_attaches_a_nameless_stub() {
        let mut ds = Dataset::from_parts(vec![feat("999")], vec![rec("250", "France", 2000, None)])
            .unwrap();
        ds.attach_year(2000);
        assert_eq!(ds.features[0].props.country(), "");
    }

    #[test]
    fn empty_records_fail_the_load() {
        assert!(matches!(
            Dataset::from_parts(vec![feat("250")], vec![]),
            Err(LoadError::Empty)
        ));
    }

    #[test]
    fn year_extent_and_filters() {
        let ds = Dataset::from_parts(
            vec![],
            vec![
                rec("250", "France", 2000, Some(1.0)),
                rec("250", "France", 2004, Some(2.0)),
                rec("276", "Germany", 2002, Some(3.0)),
            ],
        )
        .unwrap();
        assert_eq!(ds.year_extent(), (2000, 2004));
        assert_eq!(ds.records_for_year(2002).count(), 1);
        assert_eq!(ds.records_for_country("France").count(), 2);
        let max = ds
            .records_for_country("France")
            .filter_map(|r| Metric::Emissions.value_of(r))
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(max, 2.0);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_records("/nonexistent/data.csv").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
