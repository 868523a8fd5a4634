use crate::models::EmissionRecord;
use anyhow::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Save records as CSV with the same header the loader reads.
pub fn save_csv<P: AsRef<Path>>(records: &[EmissionRecord], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    for r in records {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save records as a pretty JSON array.
pub fn save_json<P: AsRef<Path>>(records: &[EmissionRecord], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(records)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::read_records;
    use tempfile::tempdir;

    fn sample() -> Vec<EmissionRecord> {
        vec![EmissionRecord {
            continent: "Europe".into(),
            country: "France".into(),
            country_code: "250".into(),
            emissions: Some(362_000.0),
            per_capita: Some(5.1),
            per_gdp: None,
            region: "Western Europe".into(),
            year: 2000,
        }]
    }

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        save_csv(&sample(), &csvp).unwrap();
        save_json(&sample(), &jsonp).unwrap();
        assert!(csvp.exists());
        assert!(jsonp.exists());
    }

    #[test]
    fn csv_round_trips_through_the_loader() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("rt.csv");
        let records = sample();
        save_csv(&records, &csvp).unwrap();
        let back = read_records(&csvp).unwrap();
        assert_eq!(back, records);
    }
}
