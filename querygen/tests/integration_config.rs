//! Integration tests for loading run configuration and building a generator from it.

use std::io::Write;

use querygen::error::{ConfigError, QueryGenError};
use querygen::{DevopsGenerator, DialectKind, FreeListPool, GeneratorConfig, Shape};
use tempfile::NamedTempFile;

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_file_drives_generator() {
    let file = write_config(
        r#"{
            "start": "2016-01-01T00:00:00Z",
            "end": "2016-01-04T00:00:00Z",
            "scale_var": 100,
            "seed": 123,
            "dialect": "timescaledb",
            "shape": "groupby-orderby-limit",
            "count": 3
        }"#,
    );

    let config = GeneratorConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.dialect, DialectKind::TimescaleDb);
    assert_eq!(config.shape().unwrap(), Shape::GroupByOrderByLimit);

    let horizon = config.horizon().unwrap();
    let mut generator =
        DevopsGenerator::from_horizon(horizon, config.dialect, config.rng(), FreeListPool::default());

    let shape = config.shape().unwrap();
    for _ in 0..config.count {
        let q = generator.dispatch(&shape, config.scale_var).unwrap();
        assert_eq!(q.order_by.as_deref(), Some("time DESC"));
        assert_eq!(q.time_end, horizon.end());
        assert!(q.human_description.ends_with("2016-01-03T23:00:00Z"));
    }
}

#[test]
fn test_seeded_configs_reproduce() {
    let json = r#"{
        "start": "2016-01-01T00:00:00Z",
        "end": "2016-01-02T00:00:00Z",
        "scale_var": 50,
        "seed": 7,
        "shape": "single-groupby-5-8-1"
    }"#;
    let config = GeneratorConfig::from_json_file(write_config(json).path()).unwrap();
    let shape = config.shape().unwrap();

    let run = || {
        let mut g = DevopsGenerator::from_horizon(
            config.horizon().unwrap(),
            config.dialect,
            config.rng(),
            FreeListPool::default(),
        );
        (0..10)
            .map(|_| g.dispatch(&shape, config.scale_var).unwrap())
            .collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_missing_file() {
    let err = GeneratorConfig::from_json_file("/nonexistent/querygen.json").unwrap_err();
    assert!(matches!(err, QueryGenError::Config(ConfigError::Read { .. })));
}

#[test]
fn test_malformed_file() {
    let file = write_config("{ not json");
    let err = GeneratorConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, QueryGenError::Config(ConfigError::Parse { .. })));
}

#[test]
fn test_inverted_horizon_in_file() {
    let file = write_config(
        r#"{"start": "2016-01-02T00:00:00Z", "end": "2016-01-01T00:00:00Z", "shape": "lastpoint"}"#,
    );
    let err = GeneratorConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, QueryGenError::Interval(_)));
}

#[test]
fn test_unknown_dialect_in_file() {
    let file = write_config(
        r#"{"start": "2016-01-01T00:00:00Z", "end": "2016-01-02T00:00:00Z", "shape": "lastpoint", "dialect": "mongo"}"#,
    );
    let err = GeneratorConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, QueryGenError::Config(ConfigError::Parse { .. })));
}

#[test]
fn test_partial_file_completed_by_caller() {
    let file = write_config(
        r#"{"start": "2016-01-01T00:00:00Z", "end": "2016-01-02T00:00:00Z", "scale_var": 2}"#,
    );

    let err = GeneratorConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(
        err,
        QueryGenError::Config(ConfigError::InvalidValue { field: "shape", .. })
    ));

    // Overrides land before the single validation pass.
    let mut config = GeneratorConfig::read_json_file(file.path()).unwrap();
    assert!(config.shape.is_empty());
    config.shape = "single-groupby-1-8-1".to_string();
    assert!(config.validate().is_err());
    config.scale_var = 8;
    assert!(config.validate().is_ok());
}

#[test]
fn test_read_still_rejects_unloadable_files() {
    let err = GeneratorConfig::read_json_file("/nonexistent/querygen.json").unwrap_err();
    assert!(matches!(err, QueryGenError::Config(ConfigError::Read { .. })));

    let file = write_config("{ not json");
    let err = GeneratorConfig::read_json_file(file.path()).unwrap_err();
    assert!(matches!(err, QueryGenError::Config(ConfigError::Parse { .. })));
}
