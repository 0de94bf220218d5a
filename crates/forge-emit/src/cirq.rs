//! Cirq object-graph emitter.
//!
//! Cirq has no registers: qubits become `NamedQubit("q[0]")` and
//! measurements carry a key naming the classical bit (`"c[0]"`). The
//! register layout is kept alongside so it survives a round trip.
//!
//! Cirq exponents are in half-turns, so angle parameters are divided by π
//! on emission and multiplied back on lift.

use std::f64::consts::PI;
use std::fmt::Write as _;
use std::sync::Arc;

use forge_ir::{CanonicalGate, Circuit, FrozenCircuit, GateCatalog, Register};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::artifact::{Artifact, BitLabel};
use crate::emitter::{Emitter, Lifter, label, labels, mismatch};
use crate::error::{EmitError, EmitResult};
use crate::python::{float_literal, string_literal};

/// Target id.
pub const TARGET: &str = "cirq";

/// Global shift that turns a Cirq pow-gate into the matching rotation.
const ROTATION_SHIFT: f64 = -0.5;

/// A Cirq gate expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CirqGate {
    /// Module-level constant such as `cirq.H` or `cirq.CNOT`.
    Named {
        /// Constant name.
        name: String,
    },
    /// `gate**-1`.
    Inverse {
        /// Inverted gate.
        gate: Box<CirqGate>,
    },
    /// `cirq.rx(angle)` and friends.
    Rotation {
        /// `rx`, `ry` or `rz`.
        axis: String,
        /// Angle in radians.
        angle: f64,
    },
    /// `cirq.XPowGate(exponent=..., global_shift=...)` and friends.
    Pow {
        /// Gate class, e.g. `ZPowGate`.
        class: String,
        /// Exponent in half-turns.
        exponent: f64,
        /// Global phase shift.
        global_shift: f64,
    },
    /// `cirq.PhasedXPowGate`.
    PhasedXPow {
        /// Phase exponent in half-turns.
        phase_exponent: f64,
        /// Exponent in half-turns.
        exponent: f64,
    },
    /// `cirq.ControlledGate(sub_gate, num_controls=n)`.
    Controlled {
        /// Controlled gate.
        gate: Box<CirqGate>,
        /// Number of control qubits.
        num_controls: u32,
    },
    /// `cirq.measure(q, key=...)`.
    Measure {
        /// Classical bit the result is stored under.
        key: BitLabel,
    },
    /// `cirq.ResetChannel()`.
    Reset,
}

impl CirqGate {
    fn named(name: &str) -> Self {
        CirqGate::Named {
            name: name.to_string(),
        }
    }

    fn rotation(axis: &str, angle: f64) -> Self {
        CirqGate::Rotation {
            axis: axis.to_string(),
            angle,
        }
    }

    fn pow(class: &str, exponent: f64, global_shift: f64) -> Self {
        CirqGate::Pow {
            class: class.to_string(),
            exponent,
            global_shift,
        }
    }

    fn controlled(gate: CirqGate) -> Self {
        CirqGate::Controlled {
            gate: Box::new(gate),
            num_controls: 1,
        }
    }

    /// Python expression for the gate (measurement renders as a gate
    /// object; use [`CirqOperation::to_python`] for the operation form).
    pub fn to_python(&self) -> String {
        match self {
            CirqGate::Named { name } => format!("cirq.{name}"),
            CirqGate::Inverse { gate } => format!("({}**-1)", gate.to_python()),
            CirqGate::Rotation { axis, angle } => format!("cirq.{axis}({})", float_literal(*angle)),
            CirqGate::Pow {
                class,
                exponent,
                global_shift,
            } => format!(
                "cirq.{class}(exponent={}, global_shift={})",
                float_literal(*exponent),
                float_literal(*global_shift)
            ),
            CirqGate::PhasedXPow {
                phase_exponent,
                exponent,
            } => format!(
                "cirq.PhasedXPowGate(phase_exponent={}, exponent={}, global_shift={})",
                float_literal(*phase_exponent),
                float_literal(*exponent),
                float_literal(ROTATION_SHIFT)
            ),
            CirqGate::Controlled { gate, num_controls } => format!(
                "cirq.ControlledGate({}, num_controls={num_controls})",
                gate.to_python()
            ),
            CirqGate::Measure { key } => {
                format!("cirq.MeasurementGate(1, key={})", string_literal(&key.to_string()))
            }
            CirqGate::Reset => "cirq.ResetChannel()".to_string(),
        }
    }
}

/// A gate applied to qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CirqOperation {
    /// Gate expression.
    pub gate: CirqGate,
    /// Target qubits, controls first.
    pub qubits: Vec<BitLabel>,
}

impl CirqOperation {
    /// Python expression for the operation.
    pub fn to_python(&self) -> String {
        let qubits = self
            .qubits
            .iter()
            .map(qubit_expression)
            .collect::<Vec<_>>()
            .join(", ");
        match &self.gate {
            CirqGate::Measure { key } => format!(
                "cirq.measure({qubits}, key={})",
                string_literal(&key.to_string())
            ),
            gate => format!("{}.on({qubits})", gate.to_python()),
        }
    }
}

/// A Cirq `Circuit` with its register layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CirqCircuit {
    /// Circuit name.
    pub name: String,
    /// Registers in declaration order; quantum registers group the named
    /// qubits, classical registers group the measurement keys.
    pub registers: Vec<Register>,
    /// Operations in program order.
    pub operations: Vec<CirqOperation>,
}

impl CirqCircuit {
    /// Registers as IR register descriptions.
    pub fn register_declarations(&self) -> Vec<Register> {
        self.registers.clone()
    }

    /// Every qubit in register order.
    pub fn all_qubits(&self) -> Vec<BitLabel> {
        self.registers
            .iter()
            .filter(|r| r.is_quantum())
            .flat_map(|r| (0..r.size).map(move |i| BitLabel::new(r.name.clone(), i)))
            .collect()
    }

    /// Python source that rebuilds this circuit with Cirq.
    pub fn to_python(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "import cirq");
        out.push('\n');
        let _ = writeln!(out, "# {}", self.name);
        for register in self.registers.iter().filter(|r| r.is_quantum()) {
            let qubits: Vec<String> = (0..register.size)
                .map(|i| {
                    format!(
                        "cirq.NamedQubit({})",
                        string_literal(&BitLabel::new(register.name.clone(), i).to_string())
                    )
                })
                .collect();
            let _ = writeln!(out, "qreg_{} = [{}]", register.name, qubits.join(", "));
        }
        let _ = writeln!(out, "circuit = cirq.Circuit()");
        for op in &self.operations {
            let _ = writeln!(out, "circuit.append({})", op.to_python());
        }
        out
    }
}

fn qubit_expression(label: &BitLabel) -> String {
    format!("qreg_{}[{}]", label.register, label.index)
}

/// Cirq gate for a canonical gate with the given parameters.
///
/// Measurement needs its key and is built by the emitter directly.
/// `None` when the gate has no Cirq construct or a parameter is missing.
fn cirq_gate(gate: &CanonicalGate, params: &[f64]) -> Option<CirqGate> {
    let param = |i: usize| params.get(i).copied();
    let gate = match gate {
        CanonicalGate::I => CirqGate::named("I"),
        CanonicalGate::X => CirqGate::named("X"),
        CanonicalGate::Y => CirqGate::named("Y"),
        CanonicalGate::Z => CirqGate::named("Z"),
        CanonicalGate::H => CirqGate::named("H"),
        CanonicalGate::S => CirqGate::named("S"),
        CanonicalGate::T => CirqGate::named("T"),
        CanonicalGate::Sdg => CirqGate::Inverse {
            gate: Box::new(CirqGate::named("S")),
        },
        CanonicalGate::Tdg => CirqGate::Inverse {
            gate: Box::new(CirqGate::named("T")),
        },
        CanonicalGate::SX => CirqGate::pow("XPowGate", 0.5, 0.0),
        CanonicalGate::SXdg => CirqGate::pow("XPowGate", -0.5, 0.0),
        CanonicalGate::Rx => CirqGate::rotation("rx", param(0)?),
        CanonicalGate::Ry => CirqGate::rotation("ry", param(0)?),
        CanonicalGate::Rz => CirqGate::rotation("rz", param(0)?),
        CanonicalGate::P => CirqGate::pow("ZPowGate", param(0)? / PI, 0.0),
        CanonicalGate::PRX => CirqGate::PhasedXPow {
            phase_exponent: param(1)? / PI,
            exponent: param(0)? / PI,
        },
        CanonicalGate::CX => CirqGate::named("CNOT"),
        CanonicalGate::CZ => CirqGate::named("CZ"),
        CanonicalGate::Swap => CirqGate::named("SWAP"),
        CanonicalGate::ISwap => CirqGate::named("ISWAP"),
        CanonicalGate::CCX => CirqGate::named("CCX"),
        CanonicalGate::CSwap => CirqGate::named("CSWAP"),
        CanonicalGate::CY => CirqGate::controlled(CirqGate::named("Y")),
        CanonicalGate::CH => CirqGate::controlled(CirqGate::named("H")),
        CanonicalGate::CRx => CirqGate::controlled(CirqGate::rotation("rx", param(0)?)),
        CanonicalGate::CRy => CirqGate::controlled(CirqGate::rotation("ry", param(0)?)),
        CanonicalGate::CRz => CirqGate::controlled(CirqGate::rotation("rz", param(0)?)),
        CanonicalGate::CP => CirqGate::pow("CZPowGate", param(0)? / PI, 0.0),
        CanonicalGate::RXX => CirqGate::pow("XXPowGate", param(0)? / PI, ROTATION_SHIFT),
        CanonicalGate::RYY => CirqGate::pow("YYPowGate", param(0)? / PI, ROTATION_SHIFT),
        CanonicalGate::RZZ => CirqGate::pow("ZZPowGate", param(0)? / PI, ROTATION_SHIFT),
        CanonicalGate::Reset => CirqGate::Reset,
        CanonicalGate::U
        | CanonicalGate::Barrier
        | CanonicalGate::Measure
        | CanonicalGate::Opaque(_) => return None,
    };
    Some(gate)
}

/// Whether the target has a construct for the gate.
fn cirq_supports(gate: &CanonicalGate) -> bool {
    let params = vec![0.0; gate.num_params() as usize];
    matches!(gate, CanonicalGate::Measure) || cirq_gate(gate, &params).is_some()
}

/// Canonical gate and IR parameters for a Cirq gate; inverse of the
/// emission table. `None` for forms the emitter never produces.
pub fn decode_gate(gate: &CirqGate) -> Option<(CanonicalGate, Vec<f64>)> {
    let decoded = match gate {
        CirqGate::Named { name } => {
            let canonical = match name.as_str() {
                "I" => CanonicalGate::I,
                "X" => CanonicalGate::X,
                "Y" => CanonicalGate::Y,
                "Z" => CanonicalGate::Z,
                "H" => CanonicalGate::H,
                "S" => CanonicalGate::S,
                "T" => CanonicalGate::T,
                "CNOT" => CanonicalGate::CX,
                "CZ" => CanonicalGate::CZ,
                "SWAP" => CanonicalGate::Swap,
                "ISWAP" => CanonicalGate::ISwap,
                "CCX" => CanonicalGate::CCX,
                "CSWAP" => CanonicalGate::CSwap,
                _ => return None,
            };
            (canonical, vec![])
        }
        CirqGate::Inverse { gate } => match gate.as_ref() {
            CirqGate::Named { name } if name == "S" => (CanonicalGate::Sdg, vec![]),
            CirqGate::Named { name } if name == "T" => (CanonicalGate::Tdg, vec![]),
            _ => return None,
        },
        CirqGate::Rotation { axis, angle } => (rotation_axis(axis, false)?, vec![*angle]),
        CirqGate::Pow {
            class,
            exponent,
            global_shift,
        } => {
            let plain = *global_shift == 0.0;
            let rotation = *global_shift == ROTATION_SHIFT;
            let angle = vec![exponent * PI];
            match class.as_str() {
                "XPowGate" if plain && *exponent == 0.5 => (CanonicalGate::SX, vec![]),
                "XPowGate" if plain && *exponent == -0.5 => (CanonicalGate::SXdg, vec![]),
                "ZPowGate" if plain => (CanonicalGate::P, angle),
                "CZPowGate" if plain => (CanonicalGate::CP, angle),
                "XXPowGate" if rotation => (CanonicalGate::RXX, angle),
                "YYPowGate" if rotation => (CanonicalGate::RYY, angle),
                "ZZPowGate" if rotation => (CanonicalGate::RZZ, angle),
                _ => return None,
            }
        }
        CirqGate::PhasedXPow {
            phase_exponent,
            exponent,
        } => (CanonicalGate::PRX, vec![exponent * PI, phase_exponent * PI]),
        CirqGate::Controlled {
            gate,
            num_controls: 1,
        } => match gate.as_ref() {
            CirqGate::Named { name } if name == "Y" => (CanonicalGate::CY, vec![]),
            CirqGate::Named { name } if name == "H" => (CanonicalGate::CH, vec![]),
            CirqGate::Rotation { axis, angle } => (rotation_axis(axis, true)?, vec![*angle]),
            _ => return None,
        },
        CirqGate::Controlled { .. } => return None,
        CirqGate::Measure { .. } => (CanonicalGate::Measure, vec![]),
        CirqGate::Reset => (CanonicalGate::Reset, vec![]),
    };
    Some(decoded)
}

fn rotation_axis(axis: &str, controlled: bool) -> Option<CanonicalGate> {
    let gate = match (axis, controlled) {
        ("rx", false) => CanonicalGate::Rx,
        ("ry", false) => CanonicalGate::Ry,
        ("rz", false) => CanonicalGate::Rz,
        ("rx", true) => CanonicalGate::CRx,
        ("ry", true) => CanonicalGate::CRy,
        ("rz", true) => CanonicalGate::CRz,
        _ => return None,
    };
    Some(gate)
}

/// Cirq emitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct CirqEmitter;

impl CirqEmitter {
    /// Create an emitter.
    pub fn new() -> Self {
        Self
    }

    /// Emit directly into a [`CirqCircuit`].
    pub fn emit_circuit(&self, circuit: &FrozenCircuit) -> EmitResult<CirqCircuit> {
        self.ensure_supported(circuit)?;
        debug!("Emitting circuit '{}' as {}", circuit.name(), TARGET);

        let mut operations = Vec::with_capacity(circuit.operations().len());
        for op in circuit.operations() {
            let canonical = circuit.canonical(op);
            let gate = match &canonical {
                CanonicalGate::Measure => {
                    let clbit = op.clbits.first().ok_or_else(|| {
                        EmitError::malformed(TARGET, format!("measurement without a clbit: {op}"))
                    })?;
                    CirqGate::Measure {
                        key: label(circuit, clbit)?,
                    }
                }
                other => {
                    if op.params.len() != other.num_params() as usize {
                        return Err(EmitError::malformed(
                            TARGET,
                            format!(
                                "{op}: {other} takes {} parameter(s), got {}",
                                other.num_params(),
                                op.params.len()
                            ),
                        ));
                    }
                    cirq_gate(other, &op.params).ok_or_else(|| EmitError::Unsupported {
                        target: TARGET.to_string(),
                        gate: op.gate.clone(),
                        canonical: canonical.clone(),
                    })?
                }
            };
            operations.push(CirqOperation {
                gate,
                qubits: labels(circuit, &op.qubits)?,
            });
        }

        Ok(CirqCircuit {
            name: circuit.name().to_string(),
            registers: circuit.registers().to_vec(),
            operations,
        })
    }

    /// Reflect a [`CirqCircuit`] back into IR.
    pub fn lift_circuit(
        &self,
        cirq: &CirqCircuit,
        catalog: Arc<GateCatalog>,
    ) -> EmitResult<Circuit> {
        let mut lifter = Lifter::new(TARGET, &cirq.name, catalog);
        for register in &cirq.registers {
            lifter.declare(&register.name, register.kind, register.size)?;
        }
        for (position, op) in cirq.operations.iter().enumerate() {
            let (canonical, params) = decode_gate(&op.gate).ok_or_else(|| {
                EmitError::malformed(
                    TARGET,
                    format!("operation {position}: unrecognized gate {}", op.gate.to_python()),
                )
            })?;
            let qubits = lifter.bits(&op.qubits)?;
            let clbits = match &op.gate {
                CirqGate::Measure { key } => vec![lifter.bit(key)?],
                _ => Vec::new(),
            };
            lifter.push(&canonical, &qubits, &clbits, &params)?;
        }
        Ok(lifter.finish())
    }
}

impl Emitter for CirqEmitter {
    fn target(&self) -> &'static str {
        TARGET
    }

    fn supports(&self, gate: &CanonicalGate) -> bool {
        cirq_supports(gate)
    }

    fn emit(&self, circuit: &FrozenCircuit) -> EmitResult<Artifact> {
        self.emit_circuit(circuit).map(Artifact::Cirq)
    }

    fn lift(&self, artifact: &Artifact, catalog: Arc<GateCatalog>) -> EmitResult<Circuit> {
        match artifact {
            Artifact::Cirq(cirq) => self.lift_circuit(cirq, catalog),
            other => Err(mismatch(TARGET, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_ir::library;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn test_emit_bell() {
        let frozen = library::bell().unwrap().freeze().unwrap();
        let cirq = CirqEmitter::new().emit_circuit(&frozen).unwrap();

        assert_eq!(cirq.operations.len(), 4);
        assert_eq!(cirq.operations[0].gate, CirqGate::named("H"));
        assert_eq!(cirq.operations[1].gate, CirqGate::named("CNOT"));
        assert_eq!(
            cirq.operations[2].gate,
            CirqGate::Measure {
                key: BitLabel::new("c", 0)
            }
        );
        assert_eq!(cirq.all_qubits().len(), 2);
    }

    #[test]
    fn test_to_python() {
        let frozen = library::bell().unwrap().freeze().unwrap();
        let source = CirqEmitter::new().emit_circuit(&frozen).unwrap().to_python();

        assert!(source.starts_with("import cirq\n"));
        assert!(source.contains(
            "qreg_q = [cirq.NamedQubit(\"q[0]\"), cirq.NamedQubit(\"q[1]\")]\n"
        ));
        assert!(source.contains("circuit.append(cirq.H.on(qreg_q[0]))\n"));
        assert!(source.contains("circuit.append(cirq.CNOT.on(qreg_q[0], qreg_q[1]))\n"));
        assert!(source.contains("circuit.append(cirq.measure(qreg_q[1], key=\"c[1]\"))\n"));
    }

    #[test]
    fn test_u_and_barrier_are_unsupported() {
        let emitter = CirqEmitter::new();
        assert!(!emitter.supports(&CanonicalGate::U));
        assert!(!emitter.supports(&CanonicalGate::Barrier));

        let mut circuit = library::adder(&library::AdderSpec::new(4)).unwrap();
        let result = emitter.emit(&circuit.freeze().unwrap());
        assert!(matches!(
            result,
            Err(EmitError::Unsupported {
                canonical: CanonicalGate::Barrier,
                ..
            })
        ));
    }

    #[test]
    fn test_parameterized_gates() {
        let gate = cirq_gate(&CanonicalGate::P, &[PI / 2.0]).unwrap();
        assert_eq!(gate, CirqGate::pow("ZPowGate", 0.5, 0.0));

        let gate = cirq_gate(&CanonicalGate::PRX, &[PI, PI / 2.0]).unwrap();
        assert_eq!(
            gate,
            CirqGate::PhasedXPow {
                phase_exponent: 0.5,
                exponent: 1.0
            }
        );
        assert_eq!(
            cirq_gate(&CanonicalGate::CRz, &[0.25]).unwrap().to_python(),
            "cirq.ControlledGate(cirq.rz(0.25), num_controls=1)"
        );
    }

    #[test]
    fn test_lift_roundtrip_with_tolerance() {
        let mut circuit = Circuit::standard("angles");
        let q = circuit.add_qreg("q", 2).unwrap();
        let c = circuit.add_creg("c", 2).unwrap();
        circuit
            .p(0.3, q.bit(0))
            .unwrap()
            .rzz(1.1, q.bit(0), q.bit(1))
            .unwrap()
            .prx(0.4, -0.9, q.bit(1))
            .unwrap()
            .sdg(q.bit(0))
            .unwrap()
            .measure(q.bit(1), c.bit(1))
            .unwrap();
        let frozen = circuit.freeze().unwrap();

        let emitter = CirqEmitter::new();
        let artifact = emitter.emit(&frozen).unwrap();
        let mut lifted = emitter.lift(&artifact, GateCatalog::standard()).unwrap();
        let lifted = lifted.freeze().unwrap();

        assert_eq!(lifted.canonical_ops(), frozen.canonical_ops());
        assert_eq!(lifted.registers(), frozen.registers());
        for (a, b) in lifted.operations().iter().zip(frozen.operations()) {
            assert_eq!(a.qubits, b.qubits);
            assert_eq!(a.clbits, b.clbits);
            for (x, y) in a.params.iter().zip(&b.params) {
                assert!((x - y).abs() < TOLERANCE, "{x} vs {y}");
            }
        }
    }

    #[test]
    fn test_decode_rejects_unknown_forms() {
        assert!(decode_gate(&CirqGate::named("FSim")).is_none());
        assert!(decode_gate(&CirqGate::pow("XPowGate", 0.3, 0.0)).is_none());
        assert!(decode_gate(&CirqGate::Controlled {
            gate: Box::new(CirqGate::named("Y")),
            num_controls: 2,
        })
        .is_none());
    }

    #[test]
    fn test_missing_parameter_is_not_defaulted() {
        assert!(cirq_gate(&CanonicalGate::Rx, &[]).is_none());
        assert!(cirq_gate(&CanonicalGate::PRX, &[0.5]).is_none());
        assert!(cirq_gate(&CanonicalGate::H, &[]).is_some());
        assert!(cirq_supports(&CanonicalGate::Rx));
        assert!(cirq_supports(&CanonicalGate::PRX));
        assert!(!cirq_supports(&CanonicalGate::U));
    }

    #[test]
    fn test_table_is_bijective() {
        let params = [0.7, 0.2, 0.1];
        for gate in CanonicalGate::standard_set() {
            if gate == CanonicalGate::Measure {
                continue;
            }
            match cirq_gate(&gate, &params) {
                Some(encoded) => {
                    let (decoded, _) = decode_gate(&encoded).unwrap();
                    assert_eq!(decoded, gate);
                }
                None => assert!(matches!(gate, CanonicalGate::U | CanonicalGate::Barrier)),
            }
        }
    }
}
