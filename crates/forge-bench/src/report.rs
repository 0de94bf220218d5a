//! Comparison report structure.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use forge_ir::FrozenCircuit;
use serde::{Deserialize, Serialize};

use crate::metrics::{Metric, MetricValues};

/// Current report schema version.
pub const SCHEMA_VERSION: &str = "1.0";

/// Outcome of one backend in a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendStatus {
    /// Transpiled and measured.
    Ok,
    /// The emitter cannot express the circuit.
    Unsupported,
    /// Emission or transpilation failed.
    Failed,
    /// The transpiler exceeded its timeout.
    TimedOut,
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BackendStatus::Ok => "ok",
            BackendStatus::Unsupported => "unsupported",
            BackendStatus::Failed => "failed",
            BackendStatus::TimedOut => "timed-out",
        };
        write!(f, "{s}")
    }
}

/// Result for one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendReport {
    /// Outcome.
    pub status: BackendStatus,
    /// Requested metrics that were measured.
    #[serde(default)]
    pub metrics: MetricValues,
    /// Error message for non-`ok` outcomes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Emitter target.
    pub target: String,
    /// Transpiler name.
    pub transpiler: String,
}

impl BackendReport {
    /// A report with the given status and no metrics.
    pub fn new(status: BackendStatus, target: impl Into<String>, transpiler: impl Into<String>) -> Self {
        Self {
            status,
            metrics: MetricValues::new(),
            error: None,
            target: target.into(),
            transpiler: transpiler.into(),
        }
    }

    /// Attach an error message.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attach metrics.
    pub fn with_metrics(mut self, metrics: MetricValues) -> Self {
        self.metrics = metrics;
        self
    }
}

/// Summary of the compared circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitSummary {
    /// Circuit name.
    pub name: String,
    /// Number of qubits.
    pub num_qubits: usize,
    /// Number of classical bits.
    pub num_clbits: usize,
    /// Number of operations.
    pub num_operations: usize,
    /// Depth before transpilation.
    pub depth: usize,
    /// Operation counts by canonical id.
    pub count_ops: BTreeMap<String, usize>,
}

impl CircuitSummary {
    /// Summarize a frozen circuit.
    pub fn from_circuit(circuit: &FrozenCircuit) -> Self {
        Self {
            name: circuit.name().to_string(),
            num_qubits: circuit.num_qubits(),
            num_clbits: circuit.num_clbits(),
            num_operations: circuit.operations().len(),
            depth: circuit.depth(),
            count_ops: circuit.count_ops(),
        }
    }
}

/// Complete comparison report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Schema version for forward compatibility.
    pub schema_version: String,
    /// When the comparison ran.
    pub timestamp: DateTime<Utc>,
    /// The compared circuit.
    pub circuit: CircuitSummary,
    /// Requested metrics, in column order.
    pub metrics: Vec<Metric>,
    /// Per-backend results keyed by backend id.
    pub backends: BTreeMap<String, BackendReport>,
}

impl ComparisonReport {
    /// Empty report for a circuit.
    pub fn new(circuit: &FrozenCircuit, metrics: &[Metric]) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            timestamp: Utc::now(),
            circuit: CircuitSummary::from_circuit(circuit),
            metrics: metrics.to_vec(),
            backends: BTreeMap::new(),
        }
    }

    /// Result for one backend.
    pub fn backend(&self, id: &str) -> Option<&BackendReport> {
        self.backends.get(id)
    }

    /// Number of backends with the given status.
    pub fn count(&self, status: BackendStatus) -> usize {
        self.backends.values().filter(|b| b.status == status).count()
    }

    /// Side-by-side text table: one row per backend, one column per metric.
    pub fn to_table(&self) -> String {
        let mut header = vec!["backend".to_string(), "status".to_string()];
        header.extend(self.metrics.iter().map(|m| m.id().to_string()));

        let rows: Vec<Vec<String>> = self
            .backends
            .iter()
            .map(|(id, report)| {
                let mut row = vec![id.clone(), report.status.to_string()];
                row.extend(self.metrics.iter().map(|m| {
                    report
                        .metrics
                        .get(m.id())
                        .map_or_else(|| "-".to_string(), |v| format_value(*v))
                }));
                row
            })
            .collect();

        let widths: Vec<usize> = (0..header.len())
            .map(|i| {
                rows.iter()
                    .map(|r| r[i].len())
                    .chain(std::iter::once(header[i].len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let render = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{cell:<w$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut lines = vec![render(&header)];
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("  "),
        );
        lines.extend(rows.iter().map(|r| render(r)));
        lines.join("\n") + "\n"
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}
