use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};

const RECTANGLE_SESSION: &str = r#"{
    "taps": [[0, 0], [100, 0], [100, 50], [0, 50]],
    "calibration": { "pixels_per_unit": 10.0, "unit": "in" }
}"#;

const METRIC_SESSION: &str = r#"{
    "taps": [[0, 0], [100, 0], [100, 50], [0, 50]],
    "calibration": { "pixel_length": 100, "known_length": 25, "unit": "cm" }
}"#;

const BAD_CALIBRATION_SESSION: &str = r#"{
    "taps": [[0, 0], [10, 0]],
    "calibration": { "pixel_length": 100, "known_length": 0, "unit": "in" }
}"#;

const OPEN_SESSION: &str = r#"{ "taps": [[0, 0], [300, 0], [300, 80]] }"#;

const NO_AUTO_CLOSE_CONFIG: &str = r#"{ "auto_close_on_fourth_pin": false }"#;

fn write_session(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("session file should be written");
    path
}

fn measure_json(args: &[&str], session: &Path) -> Value {
    let output = cargo_bin_cmd!("photo-measure")
        .arg("measure")
        .arg(session)
        .args(args)
        .env_remove("PHOTO_MEASURE_SNAP_RADIUS_PX")
        .env_remove("PHOTO_MEASURE_PIXELS_PER_INCH")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    serde_json::from_slice(&output).expect("stdout should contain valid json")
}

#[test]
fn measure_reports_tapped_rectangle() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let session = write_session(temp.path(), "rect.json", RECTANGLE_SESSION);

    let value = measure_json(&[], &session);

    assert_eq!(value["shape"], "Rectangle");
    assert_eq!(value["calibrated"], true);
    assert_eq!(value["pins"], 4);
    assert_eq!(value["lines"], 4);
    assert_eq!(value["metrics"]["unit"], "in");
    assert_eq!(value["metrics"]["length"], 10.0);
    assert_eq!(value["metrics"]["width"], 5.0);
    assert_eq!(value["metrics"]["area"], 50.0);
    assert_eq!(value["validation"]["has_right_angles"], true);
}

#[test]
fn measure_converts_display_unit() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let session = write_session(temp.path(), "rect.json", RECTANGLE_SESSION);

    let value = measure_json(&["--unit", "cm"], &session);

    assert_eq!(value["metrics"]["unit"], "cm");
    let length = value["metrics"]["length"]
        .as_f64()
        .expect("length should be a number");
    assert!((length - 25.4).abs() < 1e-9);
}

#[test]
fn measure_reports_in_calibration_unit() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let session = write_session(temp.path(), "metric.json", METRIC_SESSION);

    let value = measure_json(&[], &session);

    assert_eq!(value["metrics"]["unit"], "cm");
    assert_eq!(value["metrics"]["length"], 25.0);
    assert_eq!(value["metrics"]["width"], 12.5);
}

#[test]
fn measure_without_calibration_reports_pixels() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let session = write_session(temp.path(), "open.json", OPEN_SESSION);

    let value = measure_json(&[], &session);

    assert_eq!(value["shape"], "OpenPolyline");
    assert_eq!(value["calibrated"], false);
    assert_eq!(value["metrics"]["path_length"], 380.0);
    assert!(value["metrics"].get("area").is_none());
}

#[test]
fn measure_honours_config_file() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let session = write_session(temp.path(), "rect.json", RECTANGLE_SESSION);
    let config = write_session(temp.path(), "config.json", NO_AUTO_CLOSE_CONFIG);
    let config_arg = config.to_str().expect("utf-8 path");

    let value = measure_json(&["--config", config_arg], &session);

    assert_eq!(value["shape"], "OpenPolyline");
    assert_eq!(value["lines"], 3);
}

#[test]
fn export_csv_writes_file() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let session = write_session(temp.path(), "rect.json", RECTANGLE_SESSION);
    let output_path = temp.path().join("out/report.csv");

    cargo_bin_cmd!("photo-measure")
        .arg("export-csv")
        .arg(&session)
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success();

    let csv = std::fs::read_to_string(&output_path).expect("csv output should exist");
    assert!(csv.starts_with("Line,Start Pin,End Pin"));
    assert!(csv.contains("Area,50,sq in"));
}

#[test]
fn export_csv_to_stdout() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let session = write_session(temp.path(), "rect.json", RECTANGLE_SESSION);

    cargo_bin_cmd!("photo-measure")
        .arg("export-csv")
        .arg(&session)
        .assert()
        .success()
        .stdout(predicate::str::contains("Shape,Rectangle"));
}

#[test]
fn measure_fails_for_missing_file() {
    cargo_bin_cmd!("photo-measure")
        .arg("measure")
        .arg("does-not-exist.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("file does not exist"));
}

#[test]
fn measure_fails_for_invalid_calibration() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let session = write_session(temp.path(), "bad.json", BAD_CALIBRATION_SESSION);

    cargo_bin_cmd!("photo-measure")
        .arg("measure")
        .arg(&session)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid calibration"));
}

#[test]
fn measure_fails_for_unknown_unit() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let session = write_session(temp.path(), "rect.json", RECTANGLE_SESSION);

    cargo_bin_cmd!("photo-measure")
        .arg("measure")
        .arg(&session)
        .arg("--unit")
        .arg("furlong")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown unit"));
}

#[test]
fn version_prints_package_version() {
    cargo_bin_cmd!("photo-measure")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
