//! Circuit Forge intermediate representation
//!
//! This crate describes a quantum circuit once, independent of any backend,
//! so that the emitters in `forge-emit` can lower the same circuit into
//! several target formats.
//!
//! # Core Components
//!
//! - **Gate catalog**: [`GateCatalog`] resolves IR gate names to
//!   [`GateDefinition`]s carrying a [`CanonicalGate`] id. Aliases such as
//!   `cnot` and `cx` share one canonical id.
//! - **Registers**: [`Register`]s are declared on a circuit and addressed
//!   through copyable [`RegisterHandle`]s producing [`BitRef`]s.
//! - **Circuit**: [`Circuit`] is the mutable builder; [`Circuit::freeze`]
//!   validates it and returns a shareable [`FrozenCircuit`].
//! - **Validator**: [`validate()`] reports every [`ValidationIssue`].
//! - **DAG**: [`CircuitDag`] for depth and layering.
//! - **Library**: [`library`] generators for Bell, GHZ, QFT, adder and
//!   multiplier benchmarks.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use forge_ir::Circuit;
//!
//! let mut circuit = Circuit::standard("bell_state");
//! let q = circuit.add_qreg("q", 2).unwrap();
//! let c = circuit.add_creg("c", 2).unwrap();
//!
//! circuit.h(q.bit(0)).unwrap();
//! circuit.cx(q.bit(0), q.bit(1)).unwrap();
//! circuit.measure(q.bit(0), c.bit(0)).unwrap();
//! circuit.measure(q.bit(1), c.bit(1)).unwrap();
//!
//! let frozen = circuit.freeze().unwrap();
//! assert_eq!(frozen.num_qubits(), 2);
//! assert_eq!(frozen.depth(), 3); // H, CX, parallel measures
//! ```
//!
//! # Example: Custom Gates
//!
//! ```rust
//! use forge_ir::{Circuit, GateCatalogBuilder, GateDefinition};
//!
//! let mut builder = GateCatalogBuilder::standard();
//! builder.register(GateDefinition::opaque("oracle", 2, 0)).unwrap();
//!
//! let mut circuit = Circuit::new("custom", builder.build());
//! let q = circuit.add_qreg("q", 2).unwrap();
//! circuit.gate("oracle", &[q.bit(0), q.bit(1)], &[]).unwrap();
//! assert!(circuit.freeze().is_ok());
//! ```

pub mod catalog;
pub mod circuit;
pub mod dag;
pub mod error;
pub mod library;
pub mod operation;
pub mod register;
pub mod validate;

pub use catalog::{Arity, CanonicalGate, GateCatalog, GateCatalogBuilder, GateDefinition};
pub use circuit::{Circuit, CircuitData, FrozenCircuit};
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex};
pub use error::{IrError, IrResult, OperandKind, ValidationError};
pub use operation::{Operation, OperationHandle};
pub use register::{BitRef, Register, RegisterHandle, RegisterId, RegisterKind};
pub use validate::{ValidationIssue, validate};
