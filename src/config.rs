//! Pipeline configuration.
//!
//! A config file lists the passes to run and the compile-time bindings to
//! seed the environment with:
//!
//! ```yaml
//! passes:
//!   - pass: unroll
//!   - pass: unroll_by_factor
//!     factor: 2
//! env:
//!   N: 8
//! ```
//!
//! `--pass` and `--define` command-line entries are appended on top.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::passes::{LoopUnroll, LoopUnrollByFactor, Pass, Pipeline};
use crate::runtime::{ConfigValue, Environment, Value};

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    #[diagnostic(code(astrewrite::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML config")]
    #[diagnostic(code(astrewrite::config::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON config")]
    #[diagnostic(code(astrewrite::config::json))]
    Json(#[from] serde_json::Error),

    #[error("unsupported config format for {}", .path.display())]
    #[diagnostic(
        code(astrewrite::config::format),
        help("use a .yaml, .yml or .json file")
    )]
    UnknownFormat { path: PathBuf },

    #[error("invalid pass `{spec}`: {reason}")]
    #[diagnostic(
        code(astrewrite::config::pass),
        help("expected `unroll` or `unroll_by_factor=N`")
    )]
    BadPass { spec: String, reason: String },

    #[error("invalid definition `{spec}`: {reason}")]
    #[diagnostic(
        code(astrewrite::config::define),
        help("expected NAME=VALUE, eg `N=4` or `lanes=[0, 1, 2]`")
    )]
    BadDefine { spec: String, reason: String },
}

/// One configured pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pass", rename_all = "snake_case")]
pub enum PassConfig {
    Unroll,
    UnrollByFactor { factor: i64 },
}

impl PassConfig {
    pub fn build(self) -> Box<dyn Pass> {
        match self {
            PassConfig::Unroll => Box::new(LoopUnroll),
            PassConfig::UnrollByFactor { factor } => Box::new(LoopUnrollByFactor::new(factor)),
        }
    }
}

impl FromStr for PassConfig {
    type Err = ConfigError;

    /// Parses `unroll` or `unroll_by_factor=N`.
    fn from_str(spec: &str) -> Result<Self, ConfigError> {
        let bad = |reason: &str| ConfigError::BadPass {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };
        let (name, arg) = match spec.split_once('=') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (spec.trim(), None),
        };
        match (name, arg) {
            ("unroll", None) => Ok(PassConfig::Unroll),
            ("unroll", Some(_)) => Err(bad("`unroll` takes no argument")),
            ("unroll_by_factor", Some(arg)) => arg
                .parse::<i64>()
                .map(|factor| PassConfig::UnrollByFactor { factor })
                .map_err(|_| bad("the factor must be an integer")),
            ("unroll_by_factor", None) => Err(bad("missing factor")),
            _ => Err(bad("unknown pass")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub passes: Vec<PassConfig>,
    #[serde(default)]
    pub env: BTreeMap<String, ConfigValue>,
}

impl PipelineConfig {
    /// Loads a config, picking the format from the file extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&text),
            Some("json") => Self::from_json_str(&text),
            _ => Err(ConfigError::UnknownFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        // An empty YAML document means "no settings", not an error.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Appends a pass given as `unroll` or `unroll_by_factor=N`.
    pub fn add_pass(&mut self, spec: &str) -> Result<(), ConfigError> {
        self.passes.push(spec.parse()?);
        Ok(())
    }

    /// Adds a `NAME=VALUE` binding; `VALUE` is read as a YAML scalar or list.
    pub fn define(&mut self, spec: &str) -> Result<(), ConfigError> {
        let bad = |reason: String| ConfigError::BadDefine {
            spec: spec.to_string(),
            reason,
        };
        let (name, value) = spec
            .split_once('=')
            .ok_or_else(|| bad("missing `=`".to_string()))?;
        let name = name.trim();
        if !is_identifier(name) {
            return Err(bad(format!("`{name}` is not a valid name")));
        }
        let value: ConfigValue =
            serde_yaml::from_str(value.trim()).map_err(|e| bad(e.to_string()))?;
        self.env.insert(name.to_string(), value);
        Ok(())
    }

    pub fn pipeline(&self) -> Pipeline {
        let mut pipeline = Pipeline::new();
        for pass in &self.passes {
            pipeline.push(pass.build());
        }
        pipeline
    }

    /// Binds every configured value as a global, overriding existing ones.
    pub fn bind(&self, env: &mut Environment) {
        for (name, value) in &self.env {
            env.insert_global(name.clone(), Value::from(value.clone()));
        }
    }

    /// A prelude environment with the configured bindings applied.
    pub fn environment(&self) -> Environment {
        let mut env = Environment::with_prelude();
        self.bind(&mut env);
        env
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_specs() {
        assert_eq!("unroll".parse::<PassConfig>().unwrap(), PassConfig::Unroll);
        assert_eq!(
            "unroll_by_factor=4".parse::<PassConfig>().unwrap(),
            PassConfig::UnrollByFactor { factor: 4 }
        );
        assert!(matches!(
            "unroll_by_factor".parse::<PassConfig>(),
            Err(ConfigError::BadPass { .. })
        ));
        assert!(matches!(
            "vectorize".parse::<PassConfig>(),
            Err(ConfigError::BadPass { .. })
        ));
    }

    #[test]
    fn defines_are_typed() {
        let mut config = PipelineConfig::default();
        config.define("N=4").unwrap();
        config.define("lanes=[0, 1]").unwrap();
        assert_eq!(config.env["N"], ConfigValue::Int(4));
        assert_eq!(
            config.env["lanes"],
            ConfigValue::List(vec![ConfigValue::Int(0), ConfigValue::Int(1)])
        );
        assert!(config.define("4x=1").is_err());
        assert!(config.define("N").is_err());
    }
}
