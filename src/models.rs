use serde::{Deserialize, Serialize};

/// The three metrics selectable in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Absolute CO2 emissions, thousand metric tonnes.
    Emissions,
    /// Emissions per person.
    PerCapita,
    /// Emissions per unit of GDP.
    PerGdp,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Emissions, Metric::PerCapita, Metric::PerGdp];

    /// Display label used in chart titles and tooltips.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Emissions => "Emissions",
            Metric::PerCapita => "Emissions Per Capita",
            Metric::PerGdp => "Emissions Per $ GDP",
        }
    }

    /// Unit string shown on the bar chart Y axis and after tooltip values.
    pub fn unit(self) -> &'static str {
        match self {
            Metric::Emissions => "thousand metric tonnes",
            Metric::PerCapita => "metric tonnes per capita",
            Metric::PerGdp => "kg CO2 per $1 GDP",
        }
    }

    /// The record field this metric reads.
    pub fn value_of(self, record: &EmissionRecord) -> Option<f64> {
        match self {
            Metric::Emissions => record.emissions,
            Metric::PerCapita => record.per_capita,
            Metric::PerGdp => record.per_gdp,
        }
    }
}

/// One country-year row of the dataset.
///
/// Field renames match the source CSV header exactly, so the same type reads
/// the input and writes exports. Numeric cells that are empty or otherwise
/// unparseable become `None`; every consumer treats those as missing data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmissionRecord {
    #[serde(rename = "Continent")]
    pub continent: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Code")]
    pub country_code: String,
    #[serde(rename = "CO2 Emissions", deserialize_with = "de_tolerant_f64")]
    pub emissions: Option<f64>,
    #[serde(
        rename = "CO2 Emissions Per Capita",
        deserialize_with = "de_tolerant_f64"
    )]
    pub per_capita: Option<f64>,
    #[serde(
        rename = "CO2 Emissions Per $1 GDP",
        deserialize_with = "de_tolerant_f64"
    )]
    pub per_gdp: Option<f64>,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Year")]
    pub year: i32,
}

/// Serde helper: parse `Option<f64>` from a number or a string, mapping
/// empty/unparseable/non-finite input to `None` instead of failing the row.
fn de_tolerant_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct F64Visitor;

    impl<'de> Visitor<'de> for F64Visitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number, a numeric string, or an empty cell")
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.is_finite().then_some(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v as f64))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v as f64))
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(s.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(F64Visitor)
}

/// One polygon of a feature: the exterior ring plus any hole rings, in
/// lon/lat degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRings {
    pub exterior: Vec<(f64, f64)>,
    pub holes: Vec<Vec<(f64, f64)>>,
}

/// A country's map geometry plus its currently attached record.
///
/// `props` is reattached on every year change.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryFeature {
    /// Feature id from the geometry document; matches `EmissionRecord::country_code`.
    pub id: String,
    pub polygons: Vec<PolygonRings>,
    pub props: FeatureProps,
}

/// What a feature knows about itself for the selected year.
///
/// Invariant: every feature always carries at least a country name (possibly
/// empty when the dataset has no row for its code at all).
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureProps {
    /// The record for (feature id, selected year).
    Record(EmissionRecord),
    /// No record for the selected year; only the country name is known.
    Stub { country: String },
}

impl FeatureProps {
    pub fn country(&self) -> &str {
        match self {
            FeatureProps::Record(r) => &r.country,
            FeatureProps::Stub { country } => country,
        }
    }

    pub fn record(&self) -> Option<&EmissionRecord> {
        match self {
            FeatureProps::Record(r) => Some(r),
            FeatureProps::Stub { .. } => None,
        }
    }
}

/// The dashboard's single selection tri-state.
///
/// Owned by the interaction dispatcher; chart updates only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    pub selected_year: i32,
    pub selected_metric: Metric,
    /// At most one country is selected at a time.
    pub selected_country: Option<String>,
}

impl SelectionState {
    /// Initial state: the dataset's first year, absolute emissions, no country.
    pub fn new(min_year: i32) -> Self {
        Self {
            selected_year: min_year,
            selected_metric: Metric::Emissions,
            selected_country: None,
        }
    }
}
