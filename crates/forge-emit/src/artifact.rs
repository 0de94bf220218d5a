//! Emission artifacts.

use std::fmt;

use forge_ir::Register;
use serde::{Deserialize, Serialize};

use crate::cirq::CirqCircuit;
use crate::qasm3::Qasm3Program;
use crate::qiskit::QiskitCircuit;

/// A named bit of a named register, as the targets address them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitLabel {
    /// Register name.
    pub register: String,
    /// Index within the register.
    pub index: u32,
}

impl BitLabel {
    /// Create a label.
    pub fn new(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index,
        }
    }
}

impl fmt::Display for BitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register, self.index)
    }
}

/// Backend-specific output of one emission.
///
/// Artifacts are plain owned values with no link back to the circuit they
/// came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum Artifact {
    /// OpenQASM 3 program.
    Qasm3(Qasm3Program),
    /// Qiskit object graph.
    Qiskit(QiskitCircuit),
    /// Cirq object graph.
    Cirq(CirqCircuit),
}

impl Artifact {
    /// Target id of the emitter that produced this artifact.
    pub fn target(&self) -> &'static str {
        match self {
            Artifact::Qasm3(_) => crate::qasm3::TARGET,
            Artifact::Qiskit(_) => crate::qiskit::TARGET,
            Artifact::Cirq(_) => crate::cirq::TARGET,
        }
    }

    /// Circuit name carried by the artifact.
    pub fn name(&self) -> &str {
        match self {
            Artifact::Qasm3(p) => &p.name,
            Artifact::Qiskit(c) => &c.name,
            Artifact::Cirq(c) => &c.name,
        }
    }

    /// The textual payload an external toolchain consumes: QASM source or
    /// Python construction source.
    pub fn render(&self) -> String {
        match self {
            Artifact::Qasm3(p) => p.source.clone(),
            Artifact::Qiskit(c) => c.to_python(),
            Artifact::Cirq(c) => c.to_python(),
        }
    }

    /// Registers declared by the artifact, in declaration order.
    pub fn register_declarations(&self) -> Vec<Register> {
        match self {
            Artifact::Qasm3(p) => p.registers.clone(),
            Artifact::Qiskit(c) => c.register_declarations(),
            Artifact::Cirq(c) => c.register_declarations(),
        }
    }
}
