//! Qiskit object-graph emitter.
//!
//! Mirrors the shape of a Qiskit `QuantumCircuit`: registers plus a `data`
//! list of `CircuitInstruction`s, each carrying the gate class, its
//! parameters and its qubit/clbit arguments.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::Arc;

use forge_ir::{CanonicalGate, Circuit, FrozenCircuit, GateCatalog, Register, RegisterKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::artifact::{Artifact, BitLabel};
use crate::emitter::{Emitter, Lifter, labels, mismatch};
use crate::error::{EmitError, EmitResult};
use crate::python::{float_literal, string_literal};

/// Target id.
pub const TARGET: &str = "qiskit";

/// A `QuantumRegister` or `ClassicalRegister`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QiskitRegister {
    /// Register name.
    pub name: String,
    /// Quantum or classical.
    pub kind: RegisterKind,
    /// Number of bits.
    pub size: u32,
}

impl QiskitRegister {
    /// Qiskit class of the register.
    pub fn class_name(&self) -> &'static str {
        match self.kind {
            RegisterKind::Quantum => "QuantumRegister",
            RegisterKind::Classical => "ClassicalRegister",
        }
    }

    fn variable(&self) -> String {
        match self.kind {
            RegisterKind::Quantum => format!("qreg_{}", self.name),
            RegisterKind::Classical => format!("creg_{}", self.name),
        }
    }
}

/// The operation half of a `CircuitInstruction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QiskitOperation {
    /// Python class, e.g. `CXGate`.
    pub class_name: String,
    /// Qiskit instruction name, e.g. `cx`.
    pub name: String,
    /// Number of qubit arguments.
    pub num_qubits: u32,
    /// Number of clbit arguments.
    pub num_clbits: u32,
    /// Gate parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<f64>,
}

/// One entry of `QuantumCircuit.data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitInstruction {
    /// The instruction.
    pub operation: QiskitOperation,
    /// Qubit arguments.
    pub qubits: Vec<BitLabel>,
    /// Clbit arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clbits: Vec<BitLabel>,
}

/// A Qiskit `QuantumCircuit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QiskitCircuit {
    /// Circuit name.
    pub name: String,
    /// Registers in declaration order, quantum and classical interleaved as
    /// they were declared.
    pub registers: Vec<QiskitRegister>,
    /// Instructions in program order.
    pub data: Vec<CircuitInstruction>,
}

impl QiskitCircuit {
    /// Quantum registers.
    pub fn qregs(&self) -> impl Iterator<Item = &QiskitRegister> {
        self.registers
            .iter()
            .filter(|r| r.kind == RegisterKind::Quantum)
    }

    /// Classical registers.
    pub fn cregs(&self) -> impl Iterator<Item = &QiskitRegister> {
        self.registers
            .iter()
            .filter(|r| r.kind == RegisterKind::Classical)
    }

    /// Registers as IR register descriptions.
    pub fn register_declarations(&self) -> Vec<Register> {
        self.registers
            .iter()
            .map(|r| Register::new(r.name.clone(), r.kind, r.size))
            .collect()
    }

    /// Python source that rebuilds this circuit with Qiskit.
    pub fn to_python(&self) -> String {
        let mut out = String::new();
        let classes: BTreeSet<&str> = self
            .data
            .iter()
            .map(|inst| inst.operation.class_name.as_str())
            .filter(|class| !is_core_instruction(class))
            .collect();

        let _ = writeln!(
            out,
            "from qiskit.circuit import Barrier, ClassicalRegister, Measure, QuantumCircuit, QuantumRegister, Reset"
        );
        if !classes.is_empty() {
            let list: Vec<&str> = classes.into_iter().collect();
            let _ = writeln!(out, "from qiskit.circuit.library import {}", list.join(", "));
        }
        out.push('\n');

        for register in &self.registers {
            let _ = writeln!(
                out,
                "{} = {}({}, {})",
                register.variable(),
                register.class_name(),
                register.size,
                string_literal(&register.name)
            );
        }
        let variables: Vec<String> = self.registers.iter().map(QiskitRegister::variable).collect();
        let mut args = variables.join(", ");
        if !args.is_empty() {
            args.push_str(", ");
        }
        let _ = writeln!(
            out,
            "qc = QuantumCircuit({args}name={})",
            string_literal(&self.name)
        );

        for inst in &self.data {
            let _ = writeln!(
                out,
                "qc.append({}, [{}], [{}])",
                self.instruction_python(&inst.operation),
                self.arguments(&inst.qubits, RegisterKind::Quantum),
                self.arguments(&inst.clbits, RegisterKind::Classical),
            );
        }
        out
    }

    fn instruction_python(&self, operation: &QiskitOperation) -> String {
        if operation.class_name == "Barrier" {
            return format!("Barrier({})", operation.num_qubits);
        }
        let params: Vec<String> = operation.params.iter().map(|p| float_literal(*p)).collect();
        format!("{}({})", operation.class_name, params.join(", "))
    }

    fn arguments(&self, bits: &[BitLabel], kind: RegisterKind) -> String {
        bits.iter()
            .map(|bit| {
                let prefix = match kind {
                    RegisterKind::Quantum => "qreg",
                    RegisterKind::Classical => "creg",
                };
                format!("{prefix}_{}[{}]", bit.register, bit.index)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Instructions imported from `qiskit.circuit` rather than the gate library.
fn is_core_instruction(class: &str) -> bool {
    matches!(class, "Barrier" | "Measure" | "Reset")
}

/// Qiskit class and instruction name for a canonical gate.
pub fn qiskit_gate(gate: &CanonicalGate) -> Option<(&'static str, &'static str)> {
    let entry = match gate {
        CanonicalGate::I => ("IGate", "id"),
        CanonicalGate::X => ("XGate", "x"),
        CanonicalGate::Y => ("YGate", "y"),
        CanonicalGate::Z => ("ZGate", "z"),
        CanonicalGate::H => ("HGate", "h"),
        CanonicalGate::S => ("SGate", "s"),
        CanonicalGate::Sdg => ("SdgGate", "sdg"),
        CanonicalGate::T => ("TGate", "t"),
        CanonicalGate::Tdg => ("TdgGate", "tdg"),
        CanonicalGate::SX => ("SXGate", "sx"),
        CanonicalGate::SXdg => ("SXdgGate", "sxdg"),
        CanonicalGate::Rx => ("RXGate", "rx"),
        CanonicalGate::Ry => ("RYGate", "ry"),
        CanonicalGate::Rz => ("RZGate", "rz"),
        CanonicalGate::P => ("PhaseGate", "p"),
        CanonicalGate::U => ("UGate", "u"),
        CanonicalGate::PRX => ("RGate", "r"),
        CanonicalGate::CX => ("CXGate", "cx"),
        CanonicalGate::CY => ("CYGate", "cy"),
        CanonicalGate::CZ => ("CZGate", "cz"),
        CanonicalGate::CH => ("CHGate", "ch"),
        CanonicalGate::Swap => ("SwapGate", "swap"),
        CanonicalGate::ISwap => ("iSwapGate", "iswap"),
        CanonicalGate::CRx => ("CRXGate", "crx"),
        CanonicalGate::CRy => ("CRYGate", "cry"),
        CanonicalGate::CRz => ("CRZGate", "crz"),
        CanonicalGate::CP => ("CPhaseGate", "cp"),
        CanonicalGate::RXX => ("RXXGate", "rxx"),
        CanonicalGate::RYY => ("RYYGate", "ryy"),
        CanonicalGate::RZZ => ("RZZGate", "rzz"),
        CanonicalGate::CCX => ("CCXGate", "ccx"),
        CanonicalGate::CSwap => ("CSwapGate", "cswap"),
        CanonicalGate::Measure => ("Measure", "measure"),
        CanonicalGate::Reset => ("Reset", "reset"),
        CanonicalGate::Barrier => ("Barrier", "barrier"),
        CanonicalGate::Opaque(_) => return None,
    };
    Some(entry)
}

/// Canonical gate for a Qiskit class; inverse of [`qiskit_gate`].
pub fn canonical_for_class(class_name: &str) -> Option<CanonicalGate> {
    CanonicalGate::standard_set()
        .into_iter()
        .find(|gate| qiskit_gate(gate).is_some_and(|(class, _)| class == class_name))
}

/// Qiskit emitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct QiskitEmitter;

impl QiskitEmitter {
    /// Create an emitter.
    pub fn new() -> Self {
        Self
    }

    /// Emit directly into a [`QiskitCircuit`].
    pub fn emit_circuit(&self, circuit: &FrozenCircuit) -> EmitResult<QiskitCircuit> {
        self.ensure_supported(circuit)?;
        debug!("Emitting circuit '{}' as {}", circuit.name(), TARGET);

        let registers = circuit
            .registers()
            .iter()
            .map(|r| QiskitRegister {
                name: r.name.clone(),
                kind: r.kind,
                size: r.size,
            })
            .collect();

        let mut data = Vec::with_capacity(circuit.operations().len());
        for op in circuit.operations() {
            let canonical = circuit.canonical(op);
            let (class_name, name) = qiskit_gate(&canonical).ok_or_else(|| EmitError::Unsupported {
                target: TARGET.to_string(),
                gate: op.gate.clone(),
                canonical: canonical.clone(),
            })?;
            data.push(CircuitInstruction {
                operation: QiskitOperation {
                    class_name: class_name.to_string(),
                    name: name.to_string(),
                    num_qubits: u32::try_from(op.qubits.len()).unwrap_or(u32::MAX),
                    num_clbits: u32::try_from(op.clbits.len()).unwrap_or(u32::MAX),
                    params: op.params.clone(),
                },
                qubits: labels(circuit, &op.qubits)?,
                clbits: labels(circuit, &op.clbits)?,
            });
        }

        Ok(QiskitCircuit {
            name: circuit.name().to_string(),
            registers,
            data,
        })
    }

    /// Reflect a [`QiskitCircuit`] back into IR.
    pub fn lift_circuit(
        &self,
        qc: &QiskitCircuit,
        catalog: Arc<GateCatalog>,
    ) -> EmitResult<Circuit> {
        let mut lifter = Lifter::new(TARGET, &qc.name, catalog);
        for register in &qc.registers {
            lifter.declare(&register.name, register.kind, register.size)?;
        }
        for (position, inst) in qc.data.iter().enumerate() {
            let class = &inst.operation.class_name;
            let canonical = canonical_for_class(class).ok_or_else(|| {
                EmitError::malformed(TARGET, format!("instruction {position}: unknown class '{class}'"))
            })?;
            let qubits = lifter.bits(&inst.qubits)?;
            let clbits = lifter.bits(&inst.clbits)?;
            lifter.push(&canonical, &qubits, &clbits, &inst.operation.params)?;
        }
        Ok(lifter.finish())
    }
}

impl Emitter for QiskitEmitter {
    fn target(&self) -> &'static str {
        TARGET
    }

    fn supports(&self, gate: &CanonicalGate) -> bool {
        qiskit_gate(gate).is_some()
    }

    fn emit(&self, circuit: &FrozenCircuit) -> EmitResult<Artifact> {
        self.emit_circuit(circuit).map(Artifact::Qiskit)
    }

    fn lift(&self, artifact: &Artifact, catalog: Arc<GateCatalog>) -> EmitResult<Circuit> {
        match artifact {
            Artifact::Qiskit(qc) => self.lift_circuit(qc, catalog),
            other => Err(mismatch(TARGET, other)),
        }
    }
}
