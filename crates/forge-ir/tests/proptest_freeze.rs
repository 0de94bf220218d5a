//! Property-based tests for circuit construction and freezing.

use forge_ir::{
    BitRef, Circuit, CircuitData, GateCatalog, IrError, Operation, RegisterId, ValidationIssue,
};
use proptest::prelude::*;

/// Gate operations that can be applied to a circuit.
#[derive(Debug, Clone)]
enum GateOp {
    H(u32),
    X(u32),
    Rz(f64, u32),
    CX(u32, u32),
    Measure(u32),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) -> Result<(), IrError> {
        let q = circuit.register_by_name("q").unwrap();
        let c = circuit.register_by_name("c").unwrap();
        match self {
            GateOp::H(i) => circuit.h(q.bit(i)).map(|_| ()),
            GateOp::X(i) => circuit.x(q.bit(i)).map(|_| ()),
            GateOp::Rz(theta, i) => circuit.rz(theta, q.bit(i)).map(|_| ()),
            GateOp::CX(a, b) => circuit.cx(q.bit(a), q.bit(b)).map(|_| ()),
            GateOp::Measure(i) => circuit.measure(q.bit(i), c.bit(i)).map(|_| ()),
        }
    }
}

fn arb_gate_op(num_qubits: u32) -> impl Strategy<Value = GateOp> {
    if num_qubits < 2 {
        prop_oneof![
            (0..num_qubits).prop_map(GateOp::H),
            (0..num_qubits).prop_map(GateOp::X),
            (-6.0_f64..6.0, 0..num_qubits).prop_map(|(t, q)| GateOp::Rz(t, q)),
            (0..num_qubits).prop_map(GateOp::Measure),
        ]
        .boxed()
    } else {
        prop_oneof![
            (0..num_qubits).prop_map(GateOp::H),
            (0..num_qubits).prop_map(GateOp::X),
            (-6.0_f64..6.0, 0..num_qubits).prop_map(|(t, q)| GateOp::Rz(t, q)),
            (0..num_qubits).prop_map(GateOp::Measure),
            (0..num_qubits, 0..num_qubits)
                .prop_filter("distinct qubits", |(a, b)| a != b)
                .prop_map(|(a, b)| GateOp::CX(a, b)),
        ]
        .boxed()
    }
}

/// 1-5 qubits with 0-20 valid operations.
fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (1_u32..=5).prop_flat_map(|n| {
        prop::collection::vec(arb_gate_op(n), 0..=20).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("prop", n, n).unwrap();
            for op in ops {
                op.apply(&mut circuit).unwrap();
            }
            circuit
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Circuits built through the API always freeze.
    #[test]
    fn built_circuits_freeze(mut circuit in arb_circuit()) {
        let before = circuit.data().clone();
        let frozen = circuit.freeze().unwrap();
        prop_assert_eq!(frozen.data(), &before);
    }

    /// Depth is bounded by the operation count and is positive when any
    /// operation is present.
    #[test]
    fn depth_is_bounded(mut circuit in arb_circuit()) {
        let frozen = circuit.freeze().unwrap();
        let depth = frozen.depth();
        prop_assert!(depth <= frozen.operations().len());
        prop_assert_eq!(depth == 0, frozen.operations().is_empty());
        let layered: usize = frozen.dag().layers().iter().map(Vec::len).sum();
        prop_assert_eq!(layered, frozen.operations().len());
    }

    /// Out-of-range references are rejected at the call and leave the
    /// circuit unchanged.
    #[test]
    fn out_of_range_is_rejected(mut circuit in arb_circuit(), extra in 0_u32..10) {
        let q = circuit.register_by_name("q").unwrap();
        let before = circuit.operations().len();
        let bad = q.bit(q.size() + extra);
        let result = circuit.h(bad);
        prop_assert!(
            matches!(result, Err(IrError::OutOfRange { .. })),
            "expected OutOfRange"
        );
        prop_assert_eq!(circuit.operations().len(), before);
    }

    /// Unchecked imports with a bad operation fail to freeze and stay mutable.
    #[test]
    fn invalid_import_reports_issue(circuit in arb_circuit(), position in any::<prop::sample::Index>()) {
        let mut data: CircuitData = circuit.data().clone();
        let bad = Operation::new("h", vec![BitRef::new(RegisterId(7), 0)], vec![], vec![]);
        let at = position.index(data.operations.len() + 1);
        data.operations.insert(at, bad);

        let mut imported = Circuit::from_data(GateCatalog::standard(), data);
        let err = imported.freeze().unwrap_err();
        prop_assert_eq!(err.len(), 1);
        let is_unknown_register = matches!(
            &err.issues[0],
            ValidationIssue::UnknownRegister { operation, register: 7, .. } if *operation == at
        );
        prop_assert!(is_unknown_register);
        prop_assert!(!imported.is_frozen());
    }
}
