//! Choropleth world map.
//!
//! `update` projects the features through a fixed-scale Mercator projection
//! and colors each country by the selected metric's threshold ramp; the
//! caller attaches the selected year's records first (see
//! [`crate::dataset::Dataset::attach_year`]).

use super::ease::{Easing, Transition};
use super::MapDatum;
use crate::models::{GeometryFeature, SelectionState};
use crate::scale::{self, NO_DATA};
use plotters::style::RGBColor;
use std::f64::consts::FRAC_PI_4;

/// Projection scale factor.
pub const MERCATOR_SCALE: f64 = 130.0;
/// Latitude limit; beyond this the Mercator Y diverges.
const MAX_LAT_DEG: f64 = 85.051_128;
/// Fill-color transition on year or metric change.
pub const FILL_TRANSITION: Transition = Transition::new(750, Easing::CubicInOut);
/// Hover dims a country to this opacity.
pub const HOVER_OPACITY: f64 = 0.8;

/// One polygon of a country in screen space.
#[derive(Debug, Clone)]
pub struct ProjectedPolygon {
    pub exterior: Vec<(f64, f64)>,
    pub holes: Vec<Vec<(f64, f64)>>,
}

/// One country's projected outline and fill.
#[derive(Debug, Clone)]
pub struct CountryShape {
    pub code: String,
    pub polygons: Vec<ProjectedPolygon>,
    pub fill: RGBColor,
    /// True when this country is the current selection.
    pub active: bool,
    pub datum: MapDatum,
}

impl CountryShape {
    /// Every ring, exterior and hole alike.
    pub fn rings(&self) -> impl Iterator<Item = &Vec<(f64, f64)>> {
        self.polygons
            .iter()
            .flat_map(|p| std::iter::once(&p.exterior).chain(p.holes.iter()))
    }
}

#[derive(Debug, Clone)]
pub struct MapScene {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub shapes: Vec<CountryShape>,
    pub fill_transition: Transition,
}

/// Build the map scene for the current state.
pub fn update(
    features: &[GeometryFeature],
    state: &SelectionState,
    width: f64,
    height: f64,
) -> MapScene {
    let metric = state.selected_metric;
    let shapes = features
        .iter()
        .map(|f| {
            let record = f.props.record().cloned();
            let value = record.as_ref().and_then(|r| metric.value_of(r));
            let project_ring = |ring: &Vec<(f64, f64)>| -> Vec<(f64, f64)> {
                ring.iter()
                    .map(|&(lon, lat)| project(lon, lat, width, height))
                    .collect()
            };
            let polygons = f
                .polygons
                .iter()
                .map(|p| ProjectedPolygon {
                    exterior: project_ring(&p.exterior),
                    holes: p.holes.iter().map(project_ring).collect(),
                })
                .collect();
            CountryShape {
                code: f.id.clone(),
                polygons,
                fill: scale::color_for(metric, value),
                active: state
                    .selected_country
                    .as_deref()
                    .is_some_and(|c| !c.is_empty() && c == f.props.country()),
                datum: MapDatum {
                    country: f.props.country().to_string(),
                    record,
                },
            }
        })
        .collect();

    MapScene {
        title: format!(
            "Carbon dioxide {}, {}",
            metric.label(),
            state.selected_year
        ),
        width,
        height,
        shapes,
        fill_transition: FILL_TRANSITION,
    }
}

/// Fixed-scale Mercator: the projected origin lands at (w/2, h/1.4).
pub fn project(lon: f64, lat: f64, width: f64, height: f64) -> (f64, f64) {
    let lambda = lon.to_radians();
    let phi = lat.clamp(-MAX_LAT_DEG, MAX_LAT_DEG).to_radians();
    let x = width / 2.0 + MERCATOR_SCALE * lambda;
    let y = height / 1.4 - MERCATOR_SCALE * (FRAC_PI_4 + phi / 2.0).tan().ln();
    (x, y)
}

/// Topmost shape containing the point, by even-odd test over all rings
/// (holes therefore punch through).
pub fn hit(scene: &MapScene, x: f64, y: f64) -> Option<&CountryShape> {
    scene.shapes.iter().rev().find(|s| contains(s, x, y))
}

fn contains(shape: &CountryShape, x: f64, y: f64) -> bool {
    let mut inside = false;
    for ring in shape.rings() {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = ring[i];
            let (xj, yj) = ring[j];
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}

/// Whether a shape's fill means "no data" for the current metric.
pub fn is_no_data(shape: &CountryShape) -> bool {
    shape.fill == NO_DATA
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmissionRecord, FeatureProps, Metric, PolygonRings};

    fn feature(id: &str, props: FeatureProps) -> GeometryFeature {
        GeometryFeature {
            id: id.into(),
            // A small lon/lat box near the origin.
            polygons: vec![PolygonRings {
                exterior: vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
                holes: vec![],
            }],
            props,
        }
    }

    fn record(country: &str, year: i32, emissions: Option<f64>) -> EmissionRecord {
        EmissionRecord {
            continent: "Europe".into(),
            country: country.into(),
            country_code: "250".into(),
            emissions,
            per_capita: None,
            per_gdp: None,
            region: String::new(),
            year,
        }
    }

    fn state(year: i32, country: Option<&str>) -> SelectionState {
        SelectionState {
            selected_year: year,
            selected_metric: Metric::Emissions,
            selected_country: country.map(Into::into),
        }
    }

    #[test]
    fn origin_projects_to_the_translate_point() {
        let (x, y) = project(0.0, 0.0, 900.0, 600.0);
        assert!((x - 450.0).abs() < 1e-9);
        assert!((y - 600.0 / 1.4).abs() < 1e-9);
    }

    #[test]
    fn projection_moves_east_right_and_north_up() {
        let (x0, y0) = project(0.0, 0.0, 900.0, 600.0);
        let (xe, _) = project(10.0, 0.0, 900.0, 600.0);
        let (_, yn) = project(0.0, 10.0, 900.0, 600.0);
        assert!(xe > x0);
        assert!(yn < y0);
    }

    #[test]
    fn polar_latitudes_stay_finite() {
        let (_, y) = project(0.0, 90.0, 900.0, 600.0);
        assert!(y.is_finite());
    }

    #[test]
    fn no_data_countries_fill_gray() {
        let features = vec![
            feature(
                "250",
                FeatureProps::Record(record("France", 2000, Some(500_000.0))),
            ),
            feature("276", FeatureProps::Stub {
                country: "Germany".into(),
            }),
            feature("380", FeatureProps::Record(record("Italy", 2000, None))),
        ];
        let scene = update(&features, &state(2000, None), 900.0, 600.0);
        assert!(!is_no_data(&scene.shapes[0]));
        assert!(is_no_data(&scene.shapes[1]));
        assert!(is_no_data(&scene.shapes[2]));
    }

    #[test]
    fn title_names_metric_and_year() {
        let scene = update(&[], &state(1994, None), 900.0, 600.0);
        assert_eq!(scene.title, "Carbon dioxide Emissions, 1994");
    }

    #[test]
    fn only_the_selected_country_is_active() {
        let features = vec![
            feature(
                "250",
                FeatureProps::Record(record("France", 2000, Some(1.0))),
            ),
            feature(
                "276",
                FeatureProps::Record(record("Germany", 2000, Some(1.0))),
            ),
        ];
        let scene = update(&features, &state(2000, Some("France")), 900.0, 600.0);
        let active: Vec<&str> = scene
            .shapes
            .iter()
            .filter(|s| s.active)
            .map(|s| s.datum.country.as_str())
            .collect();
        assert_eq!(active, ["France"]);
    }

    #[test]
    fn hit_test_finds_the_containing_shape() {
        let features = vec![feature("250", FeatureProps::Stub {
            country: "France".into(),
        })];
        let scene = update(&features, &state(2000, None), 900.0, 600.0);
        let (cx, cy) = project(5.0, 5.0, 900.0, 600.0);
        assert_eq!(hit(&scene, cx, cy).unwrap().code, "250");
        let (ox, oy) = project(50.0, 50.0, 900.0, 600.0);
        assert!(hit(&scene, ox, oy).is_none());
    }

    #[test]
    fn hole_rings_punch_through() {
        let outer = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let hole = vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)];
        let f = GeometryFeature {
            id: "710".into(),
            polygons: vec![PolygonRings {
                exterior: outer,
                holes: vec![hole],
            }],
            props: FeatureProps::Stub {
                country: "South Africa".into(),
            },
        };
        let scene = update(&[f], &state(2000, None), 900.0, 600.0);
        let (hx, hy) = project(5.0, 5.0, 900.0, 600.0);
        let (sx, sy) = project(2.0, 2.0, 900.0, 600.0);
        assert!(hit(&scene, hx, hy).is_none());
        assert!(hit(&scene, sx, sy).is_some());
    }
}
