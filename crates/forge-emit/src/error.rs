//! Error types for the emitters.

use forge_ir::{CanonicalGate, IrError};
use thiserror::Error;

/// Errors that can occur while emitting or lifting artifacts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EmitError {
    /// The target has no construct for this gate.
    #[error("Target '{target}' cannot express gate '{gate}' (canonical: {canonical})")]
    Unsupported {
        /// Target id.
        target: String,
        /// IR gate name as written in the circuit.
        gate: String,
        /// Canonical id the gate resolved to.
        canonical: CanonicalGate,
    },

    /// An artifact was handed to an emitter for a different target.
    #[error("Artifact for target '{found}' given to the '{expected}' emitter")]
    TargetMismatch {
        /// Target of the emitter.
        expected: String,
        /// Target of the artifact.
        found: String,
    },

    /// An artifact could not be reflected back into IR.
    #[error("Malformed {target} artifact: {message}")]
    Malformed {
        /// Target id.
        target: String,
        /// What went wrong.
        message: String,
    },

    /// No emitter is registered under this id.
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    /// Writing an artifact failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// IR error while building or reading a circuit.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),
}

impl EmitError {
    /// Shorthand for [`EmitError::Malformed`].
    pub fn malformed(target: &str, message: impl Into<String>) -> Self {
        EmitError::Malformed {
            target: target.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for emitter operations.
pub type EmitResult<T> = Result<T, EmitError>;
