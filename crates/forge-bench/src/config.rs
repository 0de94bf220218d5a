//! Harness configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with `FORGE_` prefix)
//!
//! Environment variables take precedence over the file, which takes
//! precedence over defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};
use crate::metrics::Metric;
use crate::transpiler::TranspileOptions;

/// Complete harness configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Timeout applied to backends that do not set their own.
    #[serde(default)]
    pub default_timeout_seconds: Option<u64>,

    /// Metrics to report; `Harness::compare_config` passes them to `compare`.
    #[serde(default = "default_metrics")]
    pub metrics: Vec<Metric>,

    /// Backends to compare.
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "console" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// One backend entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend id used as the report key.
    pub id: String,

    /// Emitter target id (`qasm3`, `qiskit`, `cirq`).
    pub emitter: String,

    /// Transpiler to run on the emitted artifact.
    #[serde(default)]
    pub transpiler: TranspilerConfig,

    /// Timeout for this backend.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Options passed to the transpiler untouched.
    #[serde(default)]
    pub options: TranspileOptions,
}

/// Transpiler selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranspilerConfig {
    /// Measure the emitted artifact unchanged.
    #[default]
    Reference,
    /// Run an external program.
    Command {
        /// Program to run.
        program: String,
        /// Program arguments.
        #[serde(default)]
        args: Vec<String>,
    },
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

fn default_metrics() -> Vec<Metric> {
    vec![Metric::GateCount, Metric::Depth, Metric::TranspileSeconds]
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["console", "json"];

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            logging: LoggingConfig::default(),
            default_timeout_seconds: None,
            metrics: default_metrics(),
            backends: Vec::new(),
        }
    }
}

impl HarnessConfig {
    /// Parse and validate YAML.
    pub fn from_yaml_str(yaml: &str) -> BenchResult<Self> {
        let config: HarnessConfig =
            serde_yaml_ng::from_str(yaml).map_err(|e| BenchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> BenchResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BenchError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml_str(&contents)
    }

    /// Load configuration with the following precedence:
    /// 1. Environment variable overrides
    /// 2. The file, if provided
    /// 3. Defaults
    pub fn load(config_file: Option<&Path>) -> BenchResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => HarnessConfig::default(),
        };
        let config = config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `FORGE_LOG_LEVEL`, `FORGE_LOG_FORMAT` and `FORGE_TIMEOUT_SECONDS`
    /// from the process environment.
    pub fn merge_env(self) -> BenchResult<Self> {
        self.merge_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    ///
    /// Only variables that are present override the current values.
    pub fn merge_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> BenchResult<Self> {
        if let Some(v) = lookup("FORGE_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("FORGE_LOG_FORMAT") {
            self.logging.format = v;
        }
        if let Some(v) = lookup("FORGE_TIMEOUT_SECONDS") {
            let seconds = v.trim().parse().map_err(|_| {
                BenchError::Config(format!("FORGE_TIMEOUT_SECONDS is not a number: '{v}'"))
            })?;
            self.default_timeout_seconds = Some(seconds);
        }
        Ok(self)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> BenchResult<()> {
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(BenchError::Config(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(BenchError::Config(format!(
                "unknown log format '{}' (expected console or json)",
                self.logging.format
            )));
        }
        if self.default_timeout_seconds == Some(0) {
            return Err(BenchError::Config("default timeout must be positive".into()));
        }
        if self.metrics.is_empty() {
            return Err(BenchError::Config("no metrics requested".into()));
        }

        for backend in &self.backends {
            if backend.id.trim().is_empty() {
                return Err(BenchError::Config("backend id must not be empty".into()));
            }
            if backend.emitter.trim().is_empty() {
                return Err(BenchError::Config(format!(
                    "backend '{}' names no emitter",
                    backend.id
                )));
            }
            if backend.timeout_seconds == Some(0) {
                return Err(BenchError::Config(format!(
                    "backend '{}' timeout must be positive",
                    backend.id
                )));
            }
            if let TranspilerConfig::Command { program, .. } = &backend.transpiler {
                if program.trim().is_empty() {
                    return Err(BenchError::Config(format!(
                        "backend '{}' command has no program",
                        backend.id
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
logging:
  level: debug
  format: json
default_timeout_seconds: 30
metrics: [gate_count, depth, two_qubit_gate_count, transpile_seconds]
backends:
  - id: qiskit-ref
    emitter: qiskit
  - id: qiskit-o3
    emitter: qiskit
    transpiler:
      type: command
      program: python3
      args: [scripts/qiskit_transpile.py]
    timeout_seconds: 120
    options:
      optimization_level: 3
"#;

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "console");
        assert!(config.backends.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let config = HarnessConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.default_timeout_seconds, Some(30));
        assert_eq!(config.metrics.len(), 4);
        assert_eq!(config.backends.len(), 2);
        assert_eq!(config.backends[0].transpiler, TranspilerConfig::Reference);
        assert_eq!(
            config.backends[1].transpiler,
            TranspilerConfig::Command {
                program: "python3".into(),
                args: vec!["scripts/qiskit_transpile.py".into()],
            }
        );
        assert_eq!(config.backends[1].options["optimization_level"], 3);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = HarnessConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_unknown_metric_rejected() {
        let result = HarnessConfig::from_yaml_str("metrics: [fidelity]");
        assert!(matches!(result, Err(BenchError::Config(_))));
    }

    #[test]
    fn test_validation() {
        let mut config = HarnessConfig::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());

        let mut config = HarnessConfig::default();
        config.metrics.clear();
        assert!(config.validate().is_err());

        let yaml = "backends:\n  - id: a\n    emitter: qasm3\n    timeout_seconds: 0\n";
        assert!(HarnessConfig::from_yaml_str(yaml).is_err());

        let yaml = "backends:\n  - id: a\n    emitter: qasm3\n    transpiler: {type: command, program: ''}\n";
        assert!(HarnessConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = HarnessConfig::from_yaml_str(SAMPLE)
            .unwrap()
            .merge_overrides(|key| match key {
                "FORGE_LOG_LEVEL" => Some("warn".into()),
                "FORGE_TIMEOUT_SECONDS" => Some("5".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.default_timeout_seconds, Some(5));

        let result = HarnessConfig::default().merge_overrides(|key| {
            (key == "FORGE_TIMEOUT_SECONDS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.yaml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = HarnessConfig::from_file(&path).unwrap();
        assert_eq!(config.backends[1].timeout_seconds, Some(120));

        let missing = HarnessConfig::from_file(dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(BenchError::Config(_))));
    }
}
