//! OpenQASM 3 emitter.
//!
//! Output layout: version line, the `stdgates.inc` include, `gate`
//! definitions for the constructs `stdgates.inc` lacks (only those the
//! circuit uses), register declarations, then one statement per line.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use forge_ir::{CanonicalGate, Circuit, FrozenCircuit, GateCatalog, Register, RegisterKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::artifact::{Artifact, BitLabel};
use crate::emitter::{Emitter, Lifter, labels, mismatch};
use crate::error::{EmitError, EmitResult};

/// Target id.
pub const TARGET: &str = "qasm3";

/// An OpenQASM 3 program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qasm3Program {
    /// Circuit name.
    pub name: String,
    /// Program text.
    pub source: String,
    /// Declared registers, in declaration order.
    pub registers: Vec<Register>,
}

/// Gate name used in QASM for a canonical gate.
pub fn qasm_name(gate: &CanonicalGate) -> Option<&'static str> {
    let name = match gate {
        CanonicalGate::I => "id",
        CanonicalGate::X => "x",
        CanonicalGate::Y => "y",
        CanonicalGate::Z => "z",
        CanonicalGate::H => "h",
        CanonicalGate::S => "s",
        CanonicalGate::Sdg => "sdg",
        CanonicalGate::T => "t",
        CanonicalGate::Tdg => "tdg",
        CanonicalGate::SX => "sx",
        CanonicalGate::SXdg => "sxdg",
        CanonicalGate::Rx => "rx",
        CanonicalGate::Ry => "ry",
        CanonicalGate::Rz => "rz",
        CanonicalGate::P => "p",
        CanonicalGate::U => "u3",
        CanonicalGate::PRX => "prx",
        CanonicalGate::CX => "cx",
        CanonicalGate::CY => "cy",
        CanonicalGate::CZ => "cz",
        CanonicalGate::CH => "ch",
        CanonicalGate::Swap => "swap",
        CanonicalGate::ISwap => "iswap",
        CanonicalGate::CRx => "crx",
        CanonicalGate::CRy => "cry",
        CanonicalGate::CRz => "crz",
        CanonicalGate::CP => "cp",
        CanonicalGate::RXX => "rxx",
        CanonicalGate::RYY => "ryy",
        CanonicalGate::RZZ => "rzz",
        CanonicalGate::CCX => "ccx",
        CanonicalGate::CSwap => "cswap",
        CanonicalGate::Measure => "measure",
        CanonicalGate::Reset => "reset",
        CanonicalGate::Barrier => "barrier",
        CanonicalGate::Opaque(_) => return None,
    };
    Some(name)
}

/// Canonical gate for a QASM gate name; inverse of [`qasm_name`].
pub fn canonical_for(name: &str) -> Option<CanonicalGate> {
    CanonicalGate::standard_set()
        .into_iter()
        .find(|gate| qasm_name(gate) == Some(name))
}

/// Inline definition for constructs missing from `stdgates.inc`.
fn inline_definition(gate: &CanonicalGate) -> Option<&'static str> {
    match gate {
        CanonicalGate::SXdg => Some("gate sxdg a { h a; sdg a; h a; }"),
        CanonicalGate::ISwap => Some("gate iswap a, b { s a; s b; h a; cx a, b; cx b, a; h b; }"),
        CanonicalGate::RXX => Some(
            "gate rxx(theta) a, b { h a; h b; cx a, b; rz(theta) b; cx a, b; h a; h b; }",
        ),
        CanonicalGate::RYY => Some(
            "gate ryy(theta) a, b { rx(pi/2) a; rx(pi/2) b; cx a, b; rz(theta) b; cx a, b; rx(-pi/2) a; rx(-pi/2) b; }",
        ),
        CanonicalGate::RZZ => Some("gate rzz(theta) a, b { cx a, b; rz(theta) b; cx a, b; }"),
        CanonicalGate::PRX => {
            Some("gate prx(theta, phi) q { rz(-phi) q; rx(theta) q; rz(phi) q; }")
        }
        _ => None,
    }
}

/// Definition order in the output.
const DEFINED_GATES: [CanonicalGate; 6] = [
    CanonicalGate::SXdg,
    CanonicalGate::ISwap,
    CanonicalGate::RXX,
    CanonicalGate::RYY,
    CanonicalGate::RZZ,
    CanonicalGate::PRX,
];

/// Format an angle: exact multiples `pi`, `pi/2`, `pi/4` (and negatives)
/// symbolically, anything else as the shortest decimal that parses back to
/// the same value.
pub fn format_angle(value: f64) -> String {
    let symbolic = [
        (PI, "pi"),
        (-PI, "-pi"),
        (FRAC_PI_2, "pi/2"),
        (-FRAC_PI_2, "-pi/2"),
        (FRAC_PI_4, "pi/4"),
        (-FRAC_PI_4, "-pi/4"),
    ];
    symbolic
        .iter()
        .find(|(v, _)| *v == value)
        .map_or_else(|| format!("{value}"), |(_, s)| (*s).to_string())
}

/// Parse an angle written by [`format_angle`] (also accepts `pi/<n>`).
pub fn parse_angle(text: &str) -> Option<f64> {
    let text = text.trim();
    let (sign, body) = match text.strip_prefix('-') {
        Some(rest) => (-1.0, rest.trim()),
        None => (1.0, text),
    };
    if body == "pi" {
        return Some(sign * PI);
    }
    if let Some(divisor) = body.strip_prefix("pi/") {
        let divisor: f64 = divisor.trim().parse().ok()?;
        return Some(sign * (PI / divisor));
    }
    text.parse().ok()
}

/// OpenQASM 3 emitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Qasm3Emitter;

impl Qasm3Emitter {
    /// Create an emitter.
    pub fn new() -> Self {
        Self
    }

    /// Emit directly into a [`Qasm3Program`].
    pub fn emit_program(&self, circuit: &FrozenCircuit) -> EmitResult<Qasm3Program> {
        self.ensure_supported(circuit)?;
        debug!("Emitting circuit '{}' as {}", circuit.name(), TARGET);

        let mut writer = Writer::default();
        writer.line("OPENQASM 3.0;");
        writer.line("include \"stdgates.inc\";");

        let used = circuit.canonical_ops();
        for gate in &DEFINED_GATES {
            if used.contains(gate) {
                if let Some(def) = inline_definition(gate) {
                    writer.line(def);
                }
            }
        }

        for register in circuit.registers() {
            let keyword = match register.kind {
                RegisterKind::Quantum => "qubit",
                RegisterKind::Classical => "bit",
            };
            writer.line(&format!("{keyword}[{}] {};", register.size, register.name));
        }

        for (op, canonical) in circuit.operations().iter().zip(&used) {
            let qubits = join(&labels(circuit, &op.qubits)?);
            match canonical {
                CanonicalGate::Measure => {
                    let clbits = join(&labels(circuit, &op.clbits)?);
                    writer.line(&format!("{clbits} = measure {qubits};"));
                }
                _ => {
                    let name = qasm_name(canonical).ok_or_else(|| EmitError::Unsupported {
                        target: TARGET.to_string(),
                        gate: op.gate.clone(),
                        canonical: canonical.clone(),
                    })?;
                    if op.params.is_empty() {
                        writer.line(&format!("{name} {qubits};"));
                    } else {
                        let params: Vec<String> =
                            op.params.iter().map(|p| format_angle(*p)).collect();
                        writer.line(&format!("{name}({}) {qubits};", params.join(", ")));
                    }
                }
            }
        }

        Ok(Qasm3Program {
            name: circuit.name().to_string(),
            source: writer.finish(),
            registers: circuit.registers().to_vec(),
        })
    }

    /// Parse program text back into IR.
    pub fn lift_program(
        &self,
        program: &Qasm3Program,
        catalog: Arc<GateCatalog>,
    ) -> EmitResult<Circuit> {
        let mut lifter = Lifter::new(TARGET, &program.name, catalog);

        for (number, raw) in program.source.lines().enumerate() {
            let line = raw.trim();
            let at = |message: String| EmitError::malformed(TARGET, format!("line {}: {message}", number + 1));

            if line.is_empty() || line.starts_with("//") || is_header_statement(line) {
                continue;
            }
            let Some(statement) = line.strip_suffix(';') else {
                return Err(at("missing ';'".into()));
            };

            if let Some((kind, rest)) = declaration(statement) {
                let (size, name) = rest.ok_or_else(|| at(format!("bad declaration '{statement}'")))?;
                lifter.declare(name, kind, size)?;
                continue;
            }

            if let Some((target, source)) = statement.split_once("= measure") {
                let clbits = parse_operands(target).ok_or_else(|| at(format!("bad operands '{target}'")))?;
                let qubits = parse_operands(source).ok_or_else(|| at(format!("bad operands '{source}'")))?;
                let clbits = lifter.bits(&clbits)?;
                let qubits = lifter.bits(&qubits)?;
                lifter.push(&CanonicalGate::Measure, &qubits, &clbits, &[])?;
                continue;
            }

            let (name, params, operands) =
                split_statement(statement).ok_or_else(|| at(format!("cannot parse '{statement}'")))?;
            let canonical =
                canonical_for(name).ok_or_else(|| at(format!("unknown gate '{name}'")))?;
            let params = params
                .iter()
                .map(|p| parse_angle(p).ok_or_else(|| at(format!("bad parameter '{p}'"))))
                .collect::<EmitResult<Vec<f64>>>()?;
            let qubits = parse_operands(operands).ok_or_else(|| at(format!("bad operands '{operands}'")))?;
            let qubits = lifter.bits(&qubits)?;
            lifter.push(&canonical, &qubits, &[], &params)?;
        }

        Ok(lifter.finish())
    }
}

impl Emitter for Qasm3Emitter {
    fn target(&self) -> &'static str {
        TARGET
    }

    fn supports(&self, gate: &CanonicalGate) -> bool {
        qasm_name(gate).is_some()
    }

    fn emit(&self, circuit: &FrozenCircuit) -> EmitResult<Artifact> {
        self.emit_program(circuit).map(Artifact::Qasm3)
    }

    fn lift(&self, artifact: &Artifact, catalog: Arc<GateCatalog>) -> EmitResult<Circuit> {
        match artifact {
            Artifact::Qasm3(program) => self.lift_program(program, catalog),
            other => Err(mismatch(TARGET, other)),
        }
    }
}

/// Write a program to `<dir>/<kind>_n<n_qubits>.qasm`, creating `dir`.
pub fn save_qasm_file(
    program: &Qasm3Program,
    dir: impl AsRef<Path>,
    kind: &str,
    n_qubits: usize,
) -> EmitResult<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{kind}_n{n_qubits}.qasm"));
    std::fs::write(&path, &program.source)?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

/// Version, include and `gate` definition lines, recognised by their
/// leading keyword as a whole token.
fn is_header_statement(line: &str) -> bool {
    matches!(
        line.split_whitespace().next(),
        Some("OPENQASM" | "include" | "gate")
    )
}

#[derive(Default)]
struct Writer {
    output: String,
}

impl Writer {
    fn line(&mut self, line: &str) {
        let _ = writeln!(self.output, "{line}");
    }

    fn finish(self) -> String {
        self.output
    }
}

fn join(labels: &[BitLabel]) -> String {
    labels
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `qubit[n] name` / `bit[n] name`. The outer option says whether the line
/// is a declaration at all, the inner whether it parsed.
#[allow(clippy::type_complexity)]
fn declaration(statement: &str) -> Option<(RegisterKind, Option<(u32, &str)>)> {
    let (kind, rest) = if let Some(rest) = statement.strip_prefix("qubit[") {
        (RegisterKind::Quantum, rest)
    } else if let Some(rest) = statement.strip_prefix("bit[") {
        (RegisterKind::Classical, rest)
    } else {
        return None;
    };
    let parsed = rest.split_once(']').and_then(|(size, name)| {
        let size = size.trim().parse().ok()?;
        let name = name.trim();
        (!name.is_empty()).then_some((size, name))
    });
    Some((kind, parsed))
}

/// Split `name(p0, p1) operands` or `name operands`.
fn split_statement(statement: &str) -> Option<(&str, Vec<&str>, &str)> {
    let statement = statement.trim();
    let name_end = statement.find(|c: char| c == '(' || c.is_whitespace())?;
    let name = &statement[..name_end];
    let rest = statement[name_end..].trim_start();
    if let Some(inner) = rest.strip_prefix('(') {
        let (params, operands) = inner.split_once(')')?;
        let params = params.split(',').map(str::trim).collect();
        Some((name, params, operands.trim()))
    } else {
        Some((name, Vec::new(), rest))
    }
}

/// Parse `q[0], q[1]`.
fn parse_operands(text: &str) -> Option<Vec<BitLabel>> {
    text.split(',')
        .map(|operand| {
            let (register, index) = operand.trim().strip_suffix(']')?.split_once('[')?;
            Some(BitLabel::new(register.trim(), index.trim().parse().ok()?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_ir::GateDefinition;

    fn bell() -> FrozenCircuit {
        forge_ir::library::bell().unwrap().freeze().unwrap()
    }

    #[test]
    fn test_emit_bell() {
        let program = Qasm3Emitter::new().emit_program(&bell()).unwrap();
        let expected = "\
OPENQASM 3.0;
include \"stdgates.inc\";
qubit[2] q;
bit[2] c;
h q[0];
cx q[0], q[1];
c[0] = measure q[0];
c[1] = measure q[1];
";
        assert_eq!(program.source, expected);
        assert_eq!(program.registers.len(), 2);
    }

    #[test]
    fn test_emit_parameters() {
        let mut circuit = Circuit::standard("params");
        let q = circuit.add_qreg("q", 1).unwrap();
        circuit
            .rx(0.5, q.bit(0))
            .unwrap()
            .rz(PI / 2.0, q.bit(0))
            .unwrap()
            .u(PI, -PI / 4.0, 0.1, q.bit(0))
            .unwrap();
        let program = Qasm3Emitter::new()
            .emit_program(&circuit.freeze().unwrap())
            .unwrap();

        assert!(program.source.contains("rx(0.5) q[0];\n"));
        assert!(program.source.contains("rz(pi/2) q[0];\n"));
        assert!(program.source.contains("u3(pi, -pi/4, 0.1) q[0];\n"));
    }

    #[test]
    fn test_inline_definitions_only_when_used() {
        let mut circuit = Circuit::standard("defs");
        let q = circuit.add_qreg("q", 2).unwrap();
        circuit
            .rzz(0.3, q.bit(0), q.bit(1))
            .unwrap()
            .prx(0.1, 0.2, q.bit(0))
            .unwrap();
        let source = Qasm3Emitter::new()
            .emit_program(&circuit.freeze().unwrap())
            .unwrap()
            .source;

        assert!(source.contains("gate rzz(theta) a, b"));
        assert!(source.contains("gate prx(theta, phi) q"));
        assert!(!source.contains("gate iswap"));
        // Definitions precede declarations.
        assert!(source.find("gate rzz").unwrap() < source.find("qubit[2] q;").unwrap());
    }

    #[test]
    fn test_barrier_and_reset() {
        let mut circuit = Circuit::standard("misc");
        let q = circuit.add_qreg("q", 2).unwrap();
        circuit
            .barrier([q.bit(0), q.bit(1)])
            .unwrap()
            .reset(q.bit(0))
            .unwrap();
        let source = Qasm3Emitter::new()
            .emit_program(&circuit.freeze().unwrap())
            .unwrap()
            .source;
        assert!(source.contains("barrier q[0], q[1];\n"));
        assert!(source.contains("reset q[0];\n"));
    }

    #[test]
    fn test_aliases_emit_canonical_name() {
        let mut circuit = Circuit::standard("alias");
        let q = circuit.add_qreg("q", 2).unwrap();
        circuit
            .add_operation("cnot", &[q.bit(0), q.bit(1)], &[], &[])
            .unwrap();
        let source = Qasm3Emitter::new()
            .emit_program(&circuit.freeze().unwrap())
            .unwrap()
            .source;
        assert!(source.contains("cx q[0], q[1];"));
        assert!(!source.contains("cnot"));
    }

    #[test]
    fn test_opaque_gate_is_unsupported() {
        let mut builder = forge_ir::GateCatalogBuilder::standard();
        builder
            .register(GateDefinition::opaque("oracle", 1, 0))
            .unwrap();
        let mut circuit = Circuit::new("opaque", builder.build());
        let q = circuit.add_qreg("q", 1).unwrap();
        circuit.gate("oracle", &[q.bit(0)], &[]).unwrap();
        let result = Qasm3Emitter::new().emit(&circuit.freeze().unwrap());
        assert!(matches!(
            result,
            Err(EmitError::Unsupported { gate, .. }) if gate == "oracle"
        ));
    }

    #[test]
    fn test_angle_format_roundtrip() {
        for value in [0.0, 0.5, -1.25, PI, -PI, FRAC_PI_2, -FRAC_PI_4, 1e-12, 2.0 * PI / 3.0] {
            let text = format_angle(value);
            assert_eq!(parse_angle(&text), Some(value), "{text}");
        }
        assert_eq!(format_angle(PI), "pi");
        assert_eq!(parse_angle("pi/8"), Some(PI / 8.0));
        assert_eq!(parse_angle("theta"), None);
    }

    #[test]
    fn test_lift_roundtrip() {
        let frozen = bell();
        let emitter = Qasm3Emitter::new();
        let artifact = emitter.emit(&frozen).unwrap();
        let mut lifted = emitter.lift(&artifact, GateCatalog::standard()).unwrap();
        let lifted = lifted.freeze().unwrap();

        assert_eq!(lifted.canonical_ops(), frozen.canonical_ops());
        assert_eq!(lifted.registers(), frozen.registers());
        assert_eq!(lifted.name(), frozen.name());
    }

    #[test]
    fn test_lift_reports_line() {
        let program = Qasm3Program {
            name: "bad".into(),
            source: "OPENQASM 3.0;\nqubit[1] q;\nfoo q[0];\n".into(),
            registers: vec![Register::quantum("q", 1)],
        };
        let err = Qasm3Emitter::new()
            .lift_program(&program, GateCatalog::standard())
            .unwrap_err();
        assert!(matches!(
            err,
            EmitError::Malformed { ref message, .. } if message.starts_with("line 3")
        ));
    }

    #[test]
    fn test_lift_keeps_keyword_prefixed_registers() {
        let mut circuit = Circuit::standard("prefixed");
        let q = circuit.add_qreg("gates", 1).unwrap();
        let c = circuit.add_creg("included", 1).unwrap();
        circuit.h(q.bit(0)).unwrap().measure(q.bit(0), c.bit(0)).unwrap();
        let frozen = circuit.freeze().unwrap();

        let emitter = Qasm3Emitter::new();
        let program = emitter.emit_program(&frozen).unwrap();
        assert!(program.source.contains("included[0] = measure gates[0];\n"));

        let lifted = emitter
            .lift_program(&program, GateCatalog::standard())
            .unwrap()
            .freeze()
            .unwrap();
        assert_eq!(lifted.operations().len(), 2);
        assert_eq!(lifted.canonical_ops(), frozen.canonical_ops());
    }

    #[test]
    fn test_lift_rejects_foreign_artifact() {
        let cirq = crate::cirq::CirqEmitter::new().emit(&bell()).unwrap();
        let result = Qasm3Emitter::new().lift(&cirq, GateCatalog::standard());
        assert!(matches!(result, Err(EmitError::TargetMismatch { .. })));
    }

    #[test]
    fn test_table_is_bijective() {
        for gate in CanonicalGate::standard_set() {
            let name = qasm_name(&gate).unwrap();
            assert_eq!(canonical_for(name), Some(gate));
        }
    }
}
