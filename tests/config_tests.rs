// tests/config_tests.rs

use std::fs;

use astrewrite::config::{ConfigError, PassConfig, PipelineConfig};
use astrewrite::runtime::{ConfigValue, Value};

#[test]
fn test_yaml_config() {
    let config = PipelineConfig::from_yaml_str(
        "\
passes:
  - pass: unroll
  - pass: unroll_by_factor
    factor: 2
env:
  N: 8
  scale: 0.5
  lanes: [0, 1, 2, 3]
",
    )
    .unwrap();
    assert_eq!(
        config.passes,
        vec![PassConfig::Unroll, PassConfig::UnrollByFactor { factor: 2 }]
    );
    assert_eq!(config.env["N"], ConfigValue::Int(8));
    assert_eq!(config.env["scale"], ConfigValue::Float(0.5));

    let env = config.environment();
    assert_eq!(env.get("N"), Some(&Value::Int(8)));
    assert!(env.contains("unroll"));
    assert_eq!(
        config.pipeline().pass_names().collect::<Vec<_>>(),
        vec!["unroll", "unroll_by_factor"]
    );
}

#[test]
fn test_json_config() {
    let config =
        PipelineConfig::from_json_str(r#"{"passes": [{"pass": "unroll_by_factor", "factor": 4}]}"#)
            .unwrap();
    assert_eq!(config.passes, vec![PassConfig::UnrollByFactor { factor: 4 }]);
    assert!(config.env.is_empty());
}

#[test]
fn test_empty_yaml_is_default() {
    assert_eq!(PipelineConfig::from_yaml_str("").unwrap(), PipelineConfig::default());
}

#[test]
fn test_unknown_keys_and_passes_are_rejected() {
    assert!(matches!(
        PipelineConfig::from_yaml_str("passes: []\nextra: 1\n"),
        Err(ConfigError::Yaml(_))
    ));
    assert!(matches!(
        PipelineConfig::from_yaml_str("passes:\n  - pass: vectorize\n"),
        Err(ConfigError::Yaml(_))
    ));
}

#[test]
fn test_load_picks_format_from_extension() {
    let dir = tempfile::tempdir().unwrap();

    let yaml = dir.path().join("pipeline.yml");
    fs::write(&yaml, "passes:\n  - pass: unroll\n").unwrap();
    assert_eq!(PipelineConfig::load(&yaml).unwrap().passes, vec![PassConfig::Unroll]);

    let toml = dir.path().join("pipeline.toml");
    fs::write(&toml, "").unwrap();
    assert!(matches!(
        PipelineConfig::load(&toml),
        Err(ConfigError::UnknownFormat { .. })
    ));

    assert!(matches!(
        PipelineConfig::load(&dir.path().join("missing.yaml")),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn test_command_line_entries_append() {
    let mut config = PipelineConfig::from_yaml_str("passes:\n  - pass: unroll\nenv:\n  N: 2\n").unwrap();
    config.add_pass("unroll_by_factor=2").unwrap();
    config.define("N=4").unwrap();
    config.define("name=kernel").unwrap();
    assert_eq!(config.passes.len(), 2);
    assert_eq!(config.env["N"], ConfigValue::Int(4));
    assert_eq!(config.env["name"], ConfigValue::Str("kernel".into()));
}
