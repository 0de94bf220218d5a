//! The emitter abstraction.

use std::sync::Arc;

use forge_ir::{
    BitRef, CanonicalGate, Circuit, FrozenCircuit, GateCatalog, IrError, RegisterHandle,
    RegisterKind,
};
use rustc_hash::FxHashMap;

use crate::artifact::{Artifact, BitLabel};
use crate::error::{EmitError, EmitResult};

/// Lowers frozen circuits into one target format.
///
/// Every emitter keeps a table between canonical gate ids and target
/// constructs. Emission goes through the catalog's canonical form of each
/// operation, never its IR name, and never decomposes a gate the table
/// lacks.
pub trait Emitter: Send + Sync {
    /// Target id, e.g. `"qasm3"`.
    fn target(&self) -> &'static str;

    /// Whether the target has a construct for this canonical gate.
    fn supports(&self, gate: &CanonicalGate) -> bool;

    /// Lower a circuit. Deterministic: equal circuits give equal artifacts.
    fn emit(&self, circuit: &FrozenCircuit) -> EmitResult<Artifact>;

    /// Reflect an artifact of this target back into IR over `catalog`.
    fn lift(&self, artifact: &Artifact, catalog: Arc<GateCatalog>) -> EmitResult<Circuit>;

    /// Fail with [`EmitError::Unsupported`] on the first operation the
    /// target cannot express.
    fn ensure_supported(&self, circuit: &FrozenCircuit) -> EmitResult<()> {
        for op in circuit.operations() {
            let canonical = circuit.canonical(op);
            if !self.supports(&canonical) {
                return Err(EmitError::Unsupported {
                    target: self.target().to_string(),
                    gate: op.gate.clone(),
                    canonical,
                });
            }
        }
        Ok(())
    }
}

/// Label of a bit in a frozen circuit.
pub(crate) fn label(circuit: &FrozenCircuit, bit: &BitRef) -> EmitResult<BitLabel> {
    circuit
        .register(bit.register)
        .map(|r| BitLabel::new(r.name.clone(), bit.index))
        .ok_or_else(|| {
            EmitError::Ir(IrError::UnknownRegister {
                register: bit.register.0,
                gate_name: None,
            })
        })
}

/// Labels of a list of bits.
pub(crate) fn labels(circuit: &FrozenCircuit, bits: &[BitRef]) -> EmitResult<Vec<BitLabel>> {
    bits.iter().map(|b| label(circuit, b)).collect()
}

/// Incremental construction of a circuit from a target artifact.
pub(crate) struct Lifter {
    target: &'static str,
    circuit: Circuit,
    registers: FxHashMap<String, RegisterHandle>,
}

impl Lifter {
    pub(crate) fn new(target: &'static str, name: &str, catalog: Arc<GateCatalog>) -> Self {
        Self {
            target,
            circuit: Circuit::new(name, catalog),
            registers: FxHashMap::default(),
        }
    }

    pub(crate) fn declare(&mut self, name: &str, kind: RegisterKind, size: u32) -> EmitResult<()> {
        let handle = self.circuit.add_register(name, kind, size)?;
        self.registers.insert(name.to_string(), handle);
        Ok(())
    }

    pub(crate) fn bit(&self, label: &BitLabel) -> EmitResult<BitRef> {
        self.registers
            .get(&label.register)
            .map(|h| h.bit(label.index))
            .ok_or_else(|| {
                EmitError::malformed(
                    self.target,
                    format!("reference to undeclared register '{}'", label.register),
                )
            })
    }

    pub(crate) fn bits(&self, labels: &[BitLabel]) -> EmitResult<Vec<BitRef>> {
        labels.iter().map(|l| self.bit(l)).collect()
    }

    /// Append a canonical gate under the catalog's name for it.
    pub(crate) fn push(
        &mut self,
        canonical: &CanonicalGate,
        qubits: &[BitRef],
        clbits: &[BitRef],
        params: &[f64],
    ) -> EmitResult<()> {
        let name = self
            .circuit
            .catalog()
            .primary_name(canonical)
            .ok_or_else(|| IrError::UnknownGate(canonical.id().to_string()))?
            .to_string();
        self.circuit.add_operation(&name, qubits, clbits, params)?;
        Ok(())
    }

    pub(crate) fn finish(self) -> Circuit {
        self.circuit
    }
}

/// Error for an artifact produced by another target.
pub(crate) fn mismatch(target: &str, artifact: &Artifact) -> EmitError {
    EmitError::TargetMismatch {
        expected: target.to_string(),
        found: artifact.target().to_string(),
    }
}
