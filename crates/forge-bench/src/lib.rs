//! Transpiler comparison harness for Circuit Forge
//!
//! Feeds one frozen circuit to several backends (an emitter paired with a
//! transpiler), runs them concurrently and collects their metrics into a
//! single [`ComparisonReport`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use forge_bench::{BackendSpec, BackendStatus, Harness, Metric};
//! use forge_emit::{CirqEmitter, Qasm3Emitter};
//! use forge_ir::library;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let frozen = library::ghz(3).unwrap().freeze().unwrap();
//! let backends = [
//!     BackendSpec::reference("qasm3", Arc::new(Qasm3Emitter::new())),
//!     BackendSpec::reference("cirq", Arc::new(CirqEmitter::new())),
//! ];
//!
//! let report = runtime.block_on(Harness::new().compare(
//!     &frozen,
//!     &backends,
//!     &[Metric::GateCount, Metric::Depth],
//! ));
//! assert_eq!(report.backend("qasm3").unwrap().status, BackendStatus::Ok);
//! assert_eq!(report.backend("qasm3").unwrap().metrics["depth"], 4.0);
//! println!("{}", report.to_table());
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod harness;
pub mod metrics;
pub mod report;
pub mod telemetry;
pub mod transpiler;

pub use config::{BackendConfig, HarnessConfig, LoggingConfig, TranspilerConfig};
pub use error::{BenchError, BenchResult};
pub use export::ExportConfig;
pub use harness::{BackendSpec, Harness};
pub use metrics::{Metric, MetricValues, structural_metrics};
pub use report::{BackendReport, BackendStatus, CircuitSummary, ComparisonReport};
pub use telemetry::init_tracing;
pub use transpiler::{CommandTranspiler, ReferenceTranspiler, TranspileOptions, Transpiler};
