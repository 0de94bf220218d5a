//! Circuit construction and the Mutable → Frozen lifecycle.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{CanonicalGate, GateCatalog, GateDefinition};
use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult, ValidationError};
use crate::operation::{Operation, OperationHandle};
use crate::register::{BitRef, Register, RegisterHandle, RegisterId, RegisterKind};
use crate::validate;

/// Plain circuit content: registers and operations.
///
/// This is the serializable form of a circuit. Data imported this way is
/// unchecked until the circuit is frozen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircuitData {
    /// Circuit name.
    pub name: String,
    /// Declared registers; a register's id is its position here.
    pub registers: Vec<Register>,
    /// Operations in program order.
    pub operations: Vec<Operation>,
}

impl CircuitData {
    /// Total number of qubits across quantum registers.
    pub fn num_qubits(&self) -> usize {
        self.registers
            .iter()
            .filter(|r| r.is_quantum())
            .map(|r| r.size as usize)
            .sum()
    }

    /// Total number of classical bits across classical registers.
    pub fn num_clbits(&self) -> usize {
        self.registers
            .iter()
            .filter(|r| !r.is_quantum())
            .map(|r| r.size as usize)
            .sum()
    }

    /// Register referenced by `id`.
    pub fn register(&self, id: RegisterId) -> Option<&Register> {
        self.registers.get(id.0 as usize)
    }
}

enum CircuitState {
    Mutable(CircuitData),
    Frozen(FrozenCircuit),
}

/// A quantum circuit under construction.
///
/// Construction is single-writer: every mutator takes `&mut self`. Once
/// [`freeze`](Self::freeze) succeeds, mutators fail with
/// [`IrError::CircuitFrozen`] and the content is shared through the
/// returned [`FrozenCircuit`].
pub struct Circuit {
    catalog: Arc<GateCatalog>,
    state: CircuitState,
}

impl Circuit {
    /// Create an empty circuit resolving gates through `catalog`.
    pub fn new(name: impl Into<String>, catalog: Arc<GateCatalog>) -> Self {
        Self::from_data(
            catalog,
            CircuitData {
                name: name.into(),
                ..CircuitData::default()
            },
        )
    }

    /// Create an empty circuit over the standard catalog.
    pub fn standard(name: impl Into<String>) -> Self {
        Self::new(name, GateCatalog::standard())
    }

    /// Create a circuit with a quantum register `q` and, if `num_clbits` is
    /// non-zero, a classical register `c`.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> IrResult<Self> {
        let mut circuit = Self::standard(name);
        if num_qubits > 0 {
            circuit.add_qreg("q", num_qubits)?;
        }
        if num_clbits > 0 {
            circuit.add_creg("c", num_clbits)?;
        }
        Ok(circuit)
    }

    /// Import circuit data without checking it.
    ///
    /// Violations are reported by [`freeze`](Self::freeze).
    pub fn from_data(catalog: Arc<GateCatalog>, data: CircuitData) -> Self {
        Self {
            catalog,
            state: CircuitState::Mutable(data),
        }
    }

    /// A mutable deep copy of this circuit.
    pub fn copy(&self) -> Self {
        Self::from_data(Arc::clone(&self.catalog), self.data().clone())
    }

    // =========================================================================
    // Registers
    // =========================================================================

    /// Declare a register.
    pub fn add_register(
        &mut self,
        name: impl Into<String>,
        kind: RegisterKind,
        size: u32,
    ) -> IrResult<RegisterHandle> {
        let register = Register::new(name, kind, size);
        let data = self.data_mut()?;
        if let Some(issue) = validate::register_issue(&data.registers, &register) {
            return Err(issue.into());
        }
        let id = RegisterId::from(data.registers.len());
        debug!("Declared {} as {}", register, id);
        data.registers.push(register);
        Ok(RegisterHandle::new(id, kind, size))
    }

    /// Declare a quantum register.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<RegisterHandle> {
        self.add_register(name, RegisterKind::Quantum, size)
    }

    /// Declare a classical register.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<RegisterHandle> {
        self.add_register(name, RegisterKind::Classical, size)
    }

    /// Handle for the register named `name`.
    pub fn register_by_name(&self, name: &str) -> Option<RegisterHandle> {
        self.data()
            .registers
            .iter()
            .enumerate()
            .find(|(_, r)| r.name == name)
            .map(|(i, r)| RegisterHandle::new(RegisterId::from(i), r.kind, r.size))
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Append an operation.
    ///
    /// The gate must resolve in the catalog, every reference must point at a
    /// declared register of the right kind and be in bounds, and operand and
    /// parameter counts must match the definition.
    pub fn add_operation(
        &mut self,
        gate: &str,
        qubits: &[BitRef],
        clbits: &[BitRef],
        params: &[f64],
    ) -> IrResult<OperationHandle> {
        let catalog = Arc::clone(&self.catalog);
        let data = self.data_mut()?;
        let op = Operation::new(gate, qubits.to_vec(), clbits.to_vec(), params.to_vec());
        let index = data.operations.len();
        if let Some(issue) = validate::operation_issues(index, &op, &data.registers, &catalog)
            .into_iter()
            .next()
        {
            return Err(issue.into());
        }
        data.operations.push(op);
        Ok(OperationHandle(index))
    }

    /// Append a gate by name with no classical operands.
    pub fn gate(&mut self, name: &str, qubits: &[BitRef], params: &[f64]) -> IrResult<&mut Self> {
        self.add_operation(name, qubits, &[], params)?;
        Ok(self)
    }

    /// Append a standard gate under whatever name the catalog registers it.
    fn apply(
        &mut self,
        canonical: CanonicalGate,
        qubits: &[BitRef],
        clbits: &[BitRef],
        params: &[f64],
    ) -> IrResult<&mut Self> {
        let name = self
            .catalog
            .primary_name(&canonical)
            .unwrap_or(canonical.id())
            .to_string();
        self.add_operation(&name, qubits, clbits, params)?;
        Ok(self)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply identity gate.
    pub fn id(&mut self, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::I, &[qubit], &[], &[])
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::H, &[qubit], &[], &[])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::X, &[qubit], &[], &[])
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::Y, &[qubit], &[], &[])
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::Z, &[qubit], &[], &[])
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::S, &[qubit], &[], &[])
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::Sdg, &[qubit], &[], &[])
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::T, &[qubit], &[], &[])
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::Tdg, &[qubit], &[], &[])
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::SX, &[qubit], &[], &[])
    }

    /// Apply sqrt(X)-dagger gate.
    pub fn sxdg(&mut self, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::SXdg, &[qubit], &[], &[])
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::Rx, &[qubit], &[], &[theta])
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::Ry, &[qubit], &[], &[theta])
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::Rz, &[qubit], &[], &[theta])
    }

    /// Apply phase gate.
    pub fn p(&mut self, theta: f64, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::P, &[qubit], &[], &[theta])
    }

    /// Apply U gate.
    pub fn u(&mut self, theta: f64, phi: f64, lambda: f64, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::U, &[qubit], &[], &[theta, phi, lambda])
    }

    /// Apply phased RX gate.
    pub fn prx(&mut self, theta: f64, phi: f64, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::PRX, &[qubit], &[], &[theta, phi])
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: BitRef, target: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::CX, &[control, target], &[], &[])
    }

    /// Apply CY gate.
    pub fn cy(&mut self, control: BitRef, target: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::CY, &[control, target], &[], &[])
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: BitRef, target: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::CZ, &[control, target], &[], &[])
    }

    /// Apply controlled-Hadamard gate.
    pub fn ch(&mut self, control: BitRef, target: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::CH, &[control, target], &[], &[])
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: BitRef, q2: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::Swap, &[q1, q2], &[], &[])
    }

    /// Apply iSWAP gate.
    pub fn iswap(&mut self, q1: BitRef, q2: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::ISwap, &[q1, q2], &[], &[])
    }

    /// Apply controlled Rx gate.
    pub fn crx(&mut self, theta: f64, control: BitRef, target: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::CRx, &[control, target], &[], &[theta])
    }

    /// Apply controlled Ry gate.
    pub fn cry(&mut self, theta: f64, control: BitRef, target: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::CRy, &[control, target], &[], &[theta])
    }

    /// Apply controlled Rz gate.
    pub fn crz(&mut self, theta: f64, control: BitRef, target: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::CRz, &[control, target], &[], &[theta])
    }

    /// Apply controlled phase gate.
    pub fn cp(&mut self, theta: f64, control: BitRef, target: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::CP, &[control, target], &[], &[theta])
    }

    /// Apply XX rotation gate.
    pub fn rxx(&mut self, theta: f64, q1: BitRef, q2: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::RXX, &[q1, q2], &[], &[theta])
    }

    /// Apply YY rotation gate.
    pub fn ryy(&mut self, theta: f64, q1: BitRef, q2: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::RYY, &[q1, q2], &[], &[theta])
    }

    /// Apply ZZ rotation gate.
    pub fn rzz(&mut self, theta: f64, q1: BitRef, q2: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::RZZ, &[q1, q2], &[], &[theta])
    }

    // =========================================================================
    // Three-qubit gates
    // =========================================================================

    /// Apply Toffoli (CCX) gate.
    pub fn ccx(&mut self, c1: BitRef, c2: BitRef, target: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::CCX, &[c1, c2, target], &[], &[])
    }

    /// Apply Fredkin (CSWAP) gate.
    pub fn cswap(&mut self, control: BitRef, t1: BitRef, t2: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::CSwap, &[control, t1, t2], &[], &[])
    }

    // =========================================================================
    // Non-unitary operations
    // =========================================================================

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: BitRef, clbit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::Measure, &[qubit], &[clbit], &[])
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: BitRef) -> IrResult<&mut Self> {
        self.apply(CanonicalGate::Reset, &[qubit], &[], &[])
    }

    /// Apply a barrier to the given qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = BitRef>) -> IrResult<&mut Self> {
        let qubits: Vec<BitRef> = qubits.into_iter().collect();
        self.apply(CanonicalGate::Barrier, &qubits, &[], &[])
    }

    /// Apply a barrier to every qubit.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits = self.all_qubits();
        self.barrier(qubits)
    }

    /// Declare a classical register `meas` sized to the qubit count, place a
    /// barrier over every qubit, then measure qubit `i` into `meas[i]`.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        let qubits = self.all_qubits();
        let size = u32::try_from(qubits.len()).unwrap_or(u32::MAX);
        let meas = self.add_creg("meas", size)?;
        self.barrier(qubits.iter().copied())?;
        for (i, qubit) in (0u32..).zip(qubits) {
            self.measure(qubit, meas.bit(i))?;
        }
        Ok(self)
    }

    /// Every qubit in register declaration order.
    fn all_qubits(&self) -> Vec<BitRef> {
        self.data()
            .registers
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_quantum())
            .flat_map(|(id, r)| (0..r.size).map(move |i| BitRef::new(RegisterId::from(id), i)))
            .collect()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Validate and freeze the circuit.
    ///
    /// On failure the circuit stays mutable and every issue is returned.
    /// Calling again after success returns the same frozen view.
    pub fn freeze(&mut self) -> Result<FrozenCircuit, ValidationError> {
        let data = match &self.state {
            CircuitState::Frozen(frozen) => return Ok(frozen.clone()),
            CircuitState::Mutable(data) => data,
        };

        let issues = validate::validate(data, &self.catalog);
        if !issues.is_empty() {
            debug!(
                "Circuit '{}' failed validation with {} issue(s)",
                data.name,
                issues.len()
            );
            return Err(ValidationError::new(issues));
        }

        let data = match std::mem::replace(
            &mut self.state,
            CircuitState::Mutable(CircuitData::default()),
        ) {
            CircuitState::Mutable(data) => data,
            CircuitState::Frozen(frozen) => return Ok(frozen),
        };
        debug!(
            "Froze circuit '{}' with {} operation(s)",
            data.name,
            data.operations.len()
        );
        let frozen = FrozenCircuit {
            inner: Arc::new(FrozenInner {
                catalog: Arc::clone(&self.catalog),
                data,
            }),
        };
        self.state = CircuitState::Frozen(frozen.clone());
        Ok(frozen)
    }

    /// Whether the circuit has been frozen.
    pub fn is_frozen(&self) -> bool {
        matches!(self.state, CircuitState::Frozen(_))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Circuit content.
    pub fn data(&self) -> &CircuitData {
        match &self.state {
            CircuitState::Mutable(data) => data,
            CircuitState::Frozen(frozen) => frozen.data(),
        }
    }

    fn data_mut(&mut self) -> IrResult<&mut CircuitData> {
        match &mut self.state {
            CircuitState::Mutable(data) => Ok(data),
            CircuitState::Frozen(frozen) => Err(IrError::CircuitFrozen(frozen.name().to_string())),
        }
    }

    /// Circuit name.
    pub fn name(&self) -> &str {
        &self.data().name
    }

    /// The catalog gates resolve through.
    pub fn catalog(&self) -> &Arc<GateCatalog> {
        &self.catalog
    }

    /// Declared registers.
    pub fn registers(&self) -> &[Register] {
        &self.data().registers
    }

    /// Operations in program order.
    pub fn operations(&self) -> &[Operation] {
        &self.data().operations
    }

    /// Total number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.data().num_qubits()
    }

    /// Total number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.data().num_clbits()
    }
}

impl std::fmt::Debug for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Circuit")
            .field("name", &self.name())
            .field("frozen", &self.is_frozen())
            .field("registers", &self.registers())
            .field("operations", &self.operations().len())
            .finish()
    }
}

#[derive(Debug)]
struct FrozenInner {
    catalog: Arc<GateCatalog>,
    data: CircuitData,
}

/// A validated, read-only circuit.
///
/// Cloning is cheap and the value can be shared across threads.
#[derive(Debug, Clone)]
pub struct FrozenCircuit {
    inner: Arc<FrozenInner>,
}

impl FrozenCircuit {
    /// Circuit name.
    pub fn name(&self) -> &str {
        &self.inner.data.name
    }

    /// The catalog the circuit was validated against.
    pub fn catalog(&self) -> &Arc<GateCatalog> {
        &self.inner.catalog
    }

    /// Circuit content.
    pub fn data(&self) -> &CircuitData {
        &self.inner.data
    }

    /// Declared registers.
    pub fn registers(&self) -> &[Register] {
        &self.inner.data.registers
    }

    /// Register referenced by `id`.
    pub fn register(&self, id: RegisterId) -> Option<&Register> {
        self.inner.data.register(id)
    }

    /// Operations in program order.
    pub fn operations(&self) -> &[Operation] {
        &self.inner.data.operations
    }

    /// Total number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.inner.data.num_qubits()
    }

    /// Total number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.inner.data.num_clbits()
    }

    /// Definition of the gate used by `op`.
    pub fn definition(&self, op: &Operation) -> Option<&GateDefinition> {
        self.inner.catalog.get(&op.gate)
    }

    /// Canonical id of the gate used by `op`.
    pub fn canonical(&self, op: &Operation) -> CanonicalGate {
        self.definition(op).map_or_else(
            || CanonicalGate::Opaque(op.gate.clone()),
            |def| def.canonical().clone(),
        )
    }

    /// Canonical ids of every operation, in program order.
    pub fn canonical_ops(&self) -> Vec<CanonicalGate> {
        self.operations().iter().map(|op| self.canonical(op)).collect()
    }

    /// Operation counts keyed by canonical id.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for op in self.operations() {
            *counts.entry(self.canonical(op).id().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Circuit depth (barriers do not add a layer).
    pub fn depth(&self) -> usize {
        CircuitDag::from_circuit(self).depth()
    }

    /// Build the dependency DAG.
    pub fn dag(&self) -> CircuitDag {
        CircuitDag::from_circuit(self)
    }

    /// A new mutable circuit with the same content and catalog.
    pub fn to_mutable(&self) -> Circuit {
        Circuit::from_data(Arc::clone(&self.inner.catalog), self.inner.data.clone())
    }

    /// Whether two handles share the same frozen content.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GateCatalogBuilder;

    fn bell() -> Circuit {
        let mut circuit = Circuit::standard("bell");
        let q = circuit.add_qreg("q", 2).unwrap();
        let c = circuit.add_creg("c", 2).unwrap();
        circuit
            .h(q.bit(0))
            .unwrap()
            .cx(q.bit(0), q.bit(1))
            .unwrap()
            .measure(q.bit(0), c.bit(0))
            .unwrap()
            .measure(q.bit(1), c.bit(1))
            .unwrap();
        circuit
    }

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::standard("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert_eq!(circuit.num_clbits(), 0);
        assert!(!circuit.is_frozen());
    }

    #[test]
    fn test_circuit_with_size() {
        let circuit = Circuit::with_size("test", 3, 2).unwrap();
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_clbits(), 2);
        assert!(circuit.register_by_name("q").is_some());
        assert!(circuit.register_by_name("c").is_some());
    }

    #[test]
    fn test_register_errors() {
        let mut circuit = Circuit::standard("test");
        circuit.add_qreg("q", 2).unwrap();
        assert!(matches!(
            circuit.add_qreg("q", 1),
            Err(IrError::DuplicateRegister(name)) if name == "q"
        ));
        assert!(matches!(
            circuit.add_creg("c", 0),
            Err(IrError::InvalidSize { size: 0, .. })
        ));
        assert!(matches!(
            circuit.add_qreg("q 1", 1),
            Err(IrError::InvalidRegisterName(_))
        ));
        assert!(matches!(
            circuit.add_creg("measure", 1),
            Err(IrError::InvalidRegisterName(name)) if name == "measure"
        ));
    }

    #[test]
    fn test_add_operation_errors_are_immediate() {
        let mut circuit = Circuit::standard("test");
        let q = circuit.add_qreg("q", 2).unwrap();
        let c = circuit.add_creg("c", 1).unwrap();

        assert!(matches!(
            circuit.add_operation("frobnicate", &[q.bit(0)], &[], &[]),
            Err(IrError::UnknownGate(_))
        ));
        assert!(matches!(
            circuit.add_operation("cx", &[q.bit(0)], &[], &[]),
            Err(IrError::ArityMismatch { got: 1, .. })
        ));
        assert!(matches!(
            circuit.add_operation("x", &[q.bit(2)], &[], &[]),
            Err(IrError::OutOfRange { index: 2, size: 2, .. })
        ));
        assert!(matches!(
            circuit.add_operation("x", &[c.bit(0)], &[], &[]),
            Err(IrError::RegisterKindMismatch { .. })
        ));
        assert!(matches!(
            circuit.add_operation("cx", &[q.bit(1), q.bit(1)], &[], &[]),
            Err(IrError::DuplicateOperand { index: 1, .. })
        ));
        assert!(matches!(
            circuit.add_operation("rx", &[q.bit(0)], &[], &[f64::INFINITY]),
            Err(IrError::NonFiniteParameter { position: 0, .. })
        ));
        assert!(circuit.operations().is_empty());
    }

    #[test]
    fn test_operation_handles_follow_order() {
        let mut circuit = Circuit::standard("test");
        let q = circuit.add_qreg("q", 1).unwrap();
        let first = circuit.add_operation("h", &[q.bit(0)], &[], &[]).unwrap();
        let second = circuit.add_operation("x", &[q.bit(0)], &[], &[]).unwrap();
        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
        assert_eq!(circuit.operations()[1].gate, "x");
    }

    #[test]
    fn test_freeze_is_idempotent() {
        let mut circuit = bell();
        let first = circuit.freeze().unwrap();
        let second = circuit.freeze().unwrap();
        assert!(first.ptr_eq(&second));
        assert!(circuit.is_frozen());
    }

    #[test]
    fn test_frozen_rejects_mutation() {
        let mut circuit = bell();
        let frozen = circuit.freeze().unwrap();
        let q = circuit.register_by_name("q").unwrap();

        assert!(matches!(circuit.h(q.bit(0)), Err(IrError::CircuitFrozen(_))));
        assert!(matches!(
            circuit.add_qreg("r", 1),
            Err(IrError::CircuitFrozen(_))
        ));
        assert_eq!(frozen.operations().len(), 4);
    }

    #[test]
    fn test_failed_freeze_leaves_circuit_mutable() {
        let data = CircuitData {
            name: "broken".into(),
            registers: vec![Register::quantum("q", 1)],
            operations: vec![Operation::new(
                "h",
                vec![BitRef::new(RegisterId(0), 3)],
                vec![],
                vec![],
            )],
        };
        let mut circuit = Circuit::from_data(GateCatalog::standard(), data);

        let err = circuit.freeze().unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(!circuit.is_frozen());

        let q = circuit.register_by_name("q").unwrap();
        circuit.x(q.bit(0)).unwrap();
        assert_eq!(circuit.operations().len(), 2);
    }

    #[test]
    fn test_to_mutable_is_independent() {
        let mut circuit = bell();
        let frozen = circuit.freeze().unwrap();
        let mut copy = frozen.to_mutable();
        let q = copy.register_by_name("q").unwrap();
        copy.x(q.bit(0)).unwrap();

        assert_eq!(copy.operations().len(), 5);
        assert_eq!(frozen.operations().len(), 4);
        assert!(!copy.is_frozen());
    }

    #[test]
    fn test_copy_of_mutable() {
        let circuit = bell();
        let copy = circuit.copy();
        assert_eq!(copy.data(), circuit.data());
    }

    #[test]
    fn test_measure_all() {
        let mut circuit = Circuit::standard("test");
        let q = circuit.add_qreg("q", 3).unwrap();
        circuit.h(q.bit(0)).unwrap().measure_all().unwrap();

        let meas = circuit.register_by_name("meas").unwrap();
        assert_eq!(meas.size(), 3);
        let ops = circuit.operations();
        assert_eq!(ops[1].gate, "barrier");
        assert_eq!(ops[1].qubits.len(), 3);
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[4].clbits, vec![meas.bit(2)]);
    }

    #[test]
    fn test_helpers_use_catalog_names() {
        let catalog = GateCatalog::standard().restrict(["h", "cnot"]).unwrap();
        let mut circuit = Circuit::new("restricted", catalog);
        let q = circuit.add_qreg("q", 2).unwrap();
        circuit.h(q.bit(0)).unwrap().cx(q.bit(0), q.bit(1)).unwrap();
        assert_eq!(circuit.operations()[1].gate, "cnot");

        assert!(matches!(circuit.x(q.bit(0)), Err(IrError::UnknownGate(_))));
    }

    #[test]
    fn test_count_ops_and_canonical_ops() {
        let mut builder = GateCatalogBuilder::standard();
        builder
            .register(GateDefinition::opaque("oracle", 2, 0))
            .unwrap();
        let mut circuit = Circuit::new("mixed", builder.build());
        let q = circuit.add_qreg("q", 2).unwrap();
        circuit
            .add_operation("cnot", &[q.bit(0), q.bit(1)], &[], &[])
            .unwrap();
        circuit.cx(q.bit(1), q.bit(0)).unwrap();
        circuit.gate("oracle", &[q.bit(0), q.bit(1)], &[]).unwrap();
        let frozen = circuit.freeze().unwrap();

        assert_eq!(
            frozen.canonical_ops(),
            vec![
                CanonicalGate::CX,
                CanonicalGate::CX,
                CanonicalGate::Opaque("oracle".into())
            ]
        );
        let counts = frozen.count_ops();
        assert_eq!(counts["cx"], 2);
        assert_eq!(counts["oracle"], 1);
    }

    #[test]
    fn test_frozen_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FrozenCircuit>();
    }

    #[test]
    fn test_circuit_data_serde() {
        let circuit = bell();
        let json = serde_json::to_string(circuit.data()).unwrap();
        let data: CircuitData = serde_json::from_str(&json).unwrap();
        assert_eq!(&data, circuit.data());
    }
}
