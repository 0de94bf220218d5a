//! Comparison metrics.
//!
//! Structural metrics follow the convention common to transpiler toolchains:
//! barriers are directives, so they count neither as gates nor as depth.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use forge_ir::{CanonicalGate, FrozenCircuit};
use serde::{Deserialize, Serialize};

use crate::error::BenchError;

/// Metric values keyed by metric id.
pub type MetricValues = BTreeMap<String, f64>;

/// A metric the harness can report per backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Operations other than barriers.
    GateCount,
    /// Longest path through the circuit, barriers excluded.
    Depth,
    /// Operations acting on exactly two qubits, barriers excluded.
    TwoQubitGateCount,
    /// Wall-clock time spent in the transpiler.
    TranspileSeconds,
}

impl Metric {
    /// Every metric, in report column order.
    pub fn all() -> [Metric; 4] {
        [
            Metric::GateCount,
            Metric::Depth,
            Metric::TwoQubitGateCount,
            Metric::TranspileSeconds,
        ]
    }

    /// Metric id as it appears in reports and transpiler output.
    pub fn id(&self) -> &'static str {
        match self {
            Metric::GateCount => "gate_count",
            Metric::Depth => "depth",
            Metric::TwoQubitGateCount => "two_qubit_gate_count",
            Metric::TranspileSeconds => "transpile_seconds",
        }
    }

    /// Whether the metric is computed from a circuit's structure.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Metric::TranspileSeconds)
    }

    /// Compute a structural metric; `None` for timing metrics.
    #[allow(clippy::cast_precision_loss)]
    pub fn measure(&self, circuit: &FrozenCircuit) -> Option<f64> {
        let value = match self {
            Metric::GateCount => gate_count(circuit),
            Metric::Depth => circuit.depth(),
            Metric::TwoQubitGateCount => two_qubit_gate_count(circuit),
            Metric::TranspileSeconds => return None,
        };
        Some(value as f64)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Metric {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::all()
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| BenchError::Config(format!("unknown metric '{s}'")))
    }
}

/// Every structural metric of a circuit.
pub fn structural_metrics(circuit: &FrozenCircuit) -> MetricValues {
    Metric::all()
        .iter()
        .filter_map(|m| m.measure(circuit).map(|v| (m.id().to_string(), v)))
        .collect()
}

fn gate_count(circuit: &FrozenCircuit) -> usize {
    circuit
        .canonical_ops()
        .iter()
        .filter(|g| **g != CanonicalGate::Barrier)
        .count()
}

fn two_qubit_gate_count(circuit: &FrozenCircuit) -> usize {
    circuit
        .operations()
        .iter()
        .filter(|op| op.qubits.len() == 2 && circuit.canonical(op) != CanonicalGate::Barrier)
        .count()
}
