use crate::models::{EmissionRecord, Metric};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary statistics for one continent under one metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub continent: String,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute per-continent statistics for the chosen metric.
pub fn grouped_summary(records: &[EmissionRecord], metric: Metric) -> Vec<Summary> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut missing: BTreeMap<String, usize> = BTreeMap::new();
    for r in records {
        match metric.value_of(r) {
            Some(v) => groups.entry(r.continent.clone()).or_default().push(v),
            None => *missing.entry(r.continent.clone()).or_default() += 1,
        }
    }
    // Continents with only missing values still get a row.
    for continent in missing.keys() {
        groups.entry(continent.clone()).or_default();
    }

    let mut out = Vec::new();
    for (continent, mut vals) in groups {
        vals.sort_by(|a, b| a.total_cmp(b));
        let count = vals.len();
        let min = vals.first().cloned();
        let max = vals.last().cloned();
        let mean = if count > 0 {
            Some(vals.iter().copied().sum::<f64>() / count as f64)
        } else {
            None
        };
        let median = if count == 0 {
            None
        } else if count % 2 == 1 {
            Some(vals[count / 2])
        } else {
            Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
        };
        let miss = missing.get(&continent).cloned().unwrap_or(0);
        out.push(Summary {
            continent,
            count,
            missing: miss,
            min,
            max,
            mean,
            median,
        });
    }
    out
}
