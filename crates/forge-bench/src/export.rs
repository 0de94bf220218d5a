//! JSON export of comparison reports.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::BenchResult;
use crate::report::ComparisonReport;

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Whether to pretty-print JSON output.
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Export a report to a JSON string.
pub fn to_json(report: &ComparisonReport, config: &ExportConfig) -> BenchResult<String> {
    let json = if config.pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    Ok(json)
}

/// Export a report to a JSON file, creating parent directories.
pub fn to_file(report: &ComparisonReport, path: &Path, config: &ExportConfig) -> BenchResult<()> {
    let json = to_json(report, config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    Ok(())
}

/// Read a report back from a JSON file.
pub fn from_file(path: &Path) -> BenchResult<ComparisonReport> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metric;
    use forge_ir::library;

    #[test]
    fn test_export_config_default() {
        let config = ExportConfig::default();
        assert!(config.pretty);
    }

    #[test]
    fn test_file_roundtrip() {
        let frozen = library::ghz(3).unwrap().freeze().unwrap();
        let report = ComparisonReport::new(&frozen, &[Metric::Depth]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("ghz.json");
        to_file(&report, &path, &ExportConfig { pretty: false }).unwrap();

        let back = from_file(&path).unwrap();
        assert_eq!(back.circuit, report.circuit);
        assert_eq!(back.metrics, report.metrics);
        assert_eq!(back.timestamp, report.timestamp);
    }
}
