use std::fmt::Write as _;
use std::io::Write;

use diagnos_cli::evaluate::{
    default_config_json, load_pipeline_config, render_report, resolve_config, run_evaluation,
    EvaluateOptions,
};
use tempfile::NamedTempFile;

/// Deterministic two-cluster table in the WDBC layout, trailing comma
/// included.
fn write_dataset() -> NamedTempFile {
    let mut csv = String::from("id,diagnosis,f1,f2,f3,f4,f5,f6,\n");
    for i in 0..120usize {
        let malignant = i % 3 == 0;
        let label = if malignant { "M" } else { "B" };
        let shift = if malignant { 3.0 } else { 0.0 };
        let _ = write!(csv, "{},{}", 1000 + i, label);
        for j in 0..6usize {
            // cheap deterministic jitter in [-1, 1)
            let noise = (((i * 37 + j * 101) % 200) as f64) / 100.0 - 1.0;
            let value = if j < 3 { shift + noise } else { noise * (j as f64) };
            let _ = write!(csv, ",{:.4}", value);
        }
        csv.push_str(",\n");
    }
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(csv.as_bytes()).unwrap();
    file
}

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn partial_config_keeps_defaults() {
    let file = write_config(r#"{ "preprocessing": { "n_components": 3 } }"#);
    let config = load_pipeline_config(file.path()).unwrap();
    assert_eq!(config.preprocessing.n_components, 3);
    assert_eq!(config.preprocessing.n_bins, 10);
    assert_eq!(config.models.len(), 6);
}

#[test]
fn malformed_config_names_the_file() {
    let file = write_config("{ not json");
    let err = load_pipeline_config(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config"));
}

#[test]
fn overrides_apply_on_top_of_config() {
    let file = write_config(r#"{ "split": { "seed": 1 } }"#);
    let options = EvaluateOptions {
        config: Some(file.path().to_path_buf()),
        seed: Some(9),
        threads: Some(1),
        ..Default::default()
    };
    let config = resolve_config(&options).unwrap();
    assert_eq!(config.split.seed, 9);
    assert_eq!(config.preprocessing.seed, 9);
    assert_eq!(config.harness.n_threads, Some(1));
}

#[test]
fn invalid_override_is_rejected() {
    let options = EvaluateOptions {
        threads: Some(0),
        ..Default::default()
    };
    assert!(resolve_config(&options).is_err());
}

#[test]
fn default_config_round_trips() {
    let json = default_config_json().unwrap();
    let file = write_config(&json);
    let config = load_pipeline_config(file.path()).unwrap();
    assert_eq!(config.models.names()[0], "Logistic Regression");
    assert_eq!(config.split.test_fraction, 0.15);
}

#[test]
fn evaluation_writes_json_and_renders_report() {
    let data = write_dataset();
    let config = write_config(r#"{ "preprocessing": { "n_components": 4 } }"#);
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("results.json");

    let options = EvaluateOptions {
        data: data.path().to_path_buf(),
        config: Some(config.path().to_path_buf()),
        seed: Some(42),
        threads: Some(2),
        output: Some(output.clone()),
    };
    let summary = run_evaluation(&options).unwrap();
    assert_eq!(summary.n_records, 120);
    assert_eq!(summary.n_features, 6);
    assert_eq!(summary.validation.len(), 6);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["seed"], 42);
    assert_eq!(written["test"].as_array().unwrap().len(), 6);

    let text = render_report(&summary);
    assert!(text.contains("Results on test partition"));
}

#[test]
fn missing_dataset_is_reported() {
    let options = EvaluateOptions {
        data: "/nonexistent/diagnos/data.csv".into(),
        ..Default::default()
    };
    let err = run_evaluation(&options).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to load dataset"));
}
