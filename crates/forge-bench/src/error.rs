//! Harness error types.

use forge_emit::EmitError;
use thiserror::Error;

/// Result type for harness operations.
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors that can occur while preparing or running a comparison.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Emitting or lifting an artifact failed.
    #[error("Emit error: {0}")]
    Emit(#[from] EmitError),

    /// A transpiler reported a failure.
    #[error("Transpiler error: {0}")]
    Transpile(String),

    /// An external transpiler process could not be run or exited unsuccessfully.
    #[error("Process '{program}' failed: {message}")]
    Process {
        /// Program that was run.
        program: String,
        /// What went wrong.
        message: String,
    },

    /// Transpiler output did not contain a metrics object.
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tracing setup failed.
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Export error: {0}")]
    Export(#[from] serde_json::Error),
}
