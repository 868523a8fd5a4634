use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const CSV: &str = "\
Continent,Country,Code,CO2 Emissions,CO2 Emissions Per Capita,CO2 Emissions Per $1 GDP,Region,Year
Europe,France,250,362000,6.2,0.3,Western Europe,2000
Europe,France,250,371000,6.3,0.29,Western Europe,2001
";

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("co2view").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("co2view"));
}

#[test]
fn export_infers_json_from_the_extension() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("in.csv");
    let out = dir.path().join("out.json");
    fs::write(&csv, CSV).unwrap();

    let mut cmd = Command::cargo_bin("co2view").unwrap();
    cmd.args(["export", "--csv"])
        .arg(&csv)
        .arg("--out")
        .arg(&out);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Saved 2 rows"));

    let body = fs::read_to_string(&out).unwrap();
    assert!(body.contains("France"));
    assert!(body.contains("362000"));
}

#[test]
fn export_round_trips_csv() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("in.csv");
    let out = dir.path().join("out.csv");
    fs::write(&csv, CSV).unwrap();

    let mut cmd = Command::cargo_bin("co2view").unwrap();
    cmd.args(["export", "--format", "csv", "--csv"])
        .arg(&csv)
        .arg("--out")
        .arg(&out);
    cmd.assert().success();

    let body = fs::read_to_string(&out).unwrap();
    assert!(body.starts_with("Continent,Country,Code,CO2 Emissions"));
}

#[test]
fn render_with_missing_inputs_fails() {
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("co2view").unwrap();
    cmd.args(["render", "--geometry"])
        .arg(dir.path().join("absent.geojson"))
        .args(["--csv"])
        .arg(dir.path().join("absent.csv"))
        .args(["--map"])
        .arg(dir.path().join("map.svg"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn render_stats_prints_continent_rows() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("in.csv");
    let geometry = dir.path().join("world.geojson");
    fs::write(&csv, CSV).unwrap();
    fs::write(
        &geometry,
        r#"{"type":"FeatureCollection","features":[]}"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("co2view").unwrap();
    cmd.args(["render", "--stats", "--geometry"])
        .arg(&geometry)
        .args(["--csv"])
        .arg(&csv);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Europe"));
}
