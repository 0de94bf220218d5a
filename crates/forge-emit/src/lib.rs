//! Backend emitters for Circuit Forge
//!
//! This crate lowers a [`FrozenCircuit`](forge_ir::FrozenCircuit) into the
//! formats external toolchains consume, and reflects those artifacts back
//! into IR.
//!
//! # Targets
//!
//! | Target   | Emitter            | Artifact                 |
//! |----------|--------------------|--------------------------|
//! | `qasm3`  | [`Qasm3Emitter`]   | [`Qasm3Program`] (text)  |
//! | `qiskit` | [`QiskitEmitter`]  | [`QiskitCircuit`]        |
//! | `cirq`   | [`CirqEmitter`]    | [`CirqCircuit`]          |
//!
//! Every emitter translates through the canonical gate id. A gate the target
//! has no construct for fails with [`EmitError::Unsupported`]; nothing is
//! decomposed behind the caller's back.
//!
//! # Example
//!
//! ```rust
//! use forge_emit::{Emitter, EmitterRegistry};
//! use forge_ir::library;
//!
//! let frozen = library::bell().unwrap().freeze().unwrap();
//! let registry = EmitterRegistry::with_defaults();
//!
//! let qasm = registry.create("qasm3").unwrap().emit(&frozen).unwrap();
//! assert!(qasm.render().contains("cx q[0], q[1];"));
//! ```

pub mod artifact;
pub mod cirq;
pub mod emitter;
pub mod error;
mod python;
pub mod qasm3;
pub mod qiskit;
pub mod registry;

pub use artifact::{Artifact, BitLabel};
pub use cirq::{CirqCircuit, CirqEmitter, CirqGate, CirqOperation};
pub use emitter::Emitter;
pub use error::{EmitError, EmitResult};
pub use qasm3::{Qasm3Emitter, Qasm3Program, save_qasm_file};
pub use qiskit::{CircuitInstruction, QiskitCircuit, QiskitEmitter, QiskitOperation, QiskitRegister};
pub use registry::EmitterRegistry;
