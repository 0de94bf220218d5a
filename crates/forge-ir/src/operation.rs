//! Operations appended to a circuit.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::register::BitRef;

/// One gate application: an IR gate name plus its operands.
///
/// The gate name is resolved through the circuit's catalog; emitters never
/// look at it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Catalog name of the gate.
    pub gate: String,
    /// Qubit operands, in order.
    pub qubits: Vec<BitRef>,
    /// Classical-bit operands, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clbits: Vec<BitRef>,
    /// Numeric parameters, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<f64>,
}

impl Operation {
    /// Create an operation.
    pub fn new(
        gate: impl Into<String>,
        qubits: Vec<BitRef>,
        clbits: Vec<BitRef>,
        params: Vec<f64>,
    ) -> Self {
        Self {
            gate: gate.into(),
            qubits,
            clbits,
            params,
        }
    }

    /// Every operand (qubits then classical bits).
    pub fn operands(&self) -> impl Iterator<Item = &BitRef> {
        self.qubits.iter().chain(self.clbits.iter())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gate)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
            write!(f, "({})", params.join(", "))?;
        }
        let operands: Vec<String> = self
            .operands()
            .map(|b| format!("{}[{}]", b.register, b.index))
            .collect();
        write!(f, " {}", operands.join(", "))
    }
}

/// Position of an operation within its circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationHandle(pub(crate) usize);

impl OperationHandle {
    /// Zero-based position in the operation sequence.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::RegisterId;

    #[test]
    fn test_operation_display() {
        let q = RegisterId(0);
        let op = Operation::new("rx", vec![BitRef::new(q, 1)], vec![], vec![0.5]);
        assert_eq!(op.to_string(), "rx(0.5) #0[1]");
    }

    #[test]
    fn test_operands_order() {
        let q = RegisterId(0);
        let c = RegisterId(1);
        let op = Operation::new(
            "measure",
            vec![BitRef::new(q, 2)],
            vec![BitRef::new(c, 0)],
            Vec::new(),
        );
        let operands: Vec<_> = op.operands().copied().collect();
        assert_eq!(operands, vec![BitRef::new(q, 2), BitRef::new(c, 0)]);
    }
}
