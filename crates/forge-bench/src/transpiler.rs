//! The transpiler seam.
//!
//! A [`Transpiler`] takes an emitted artifact plus opaque options and
//! reports metrics about what it produced. The harness never optimizes
//! anything itself: [`ReferenceTranspiler`] measures the artifact as
//! emitted, and [`CommandTranspiler`] hands it to an external toolchain.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use forge_emit::{Artifact, Emitter};
use forge_ir::GateCatalog;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{BenchError, BenchResult};
use crate::metrics::{MetricValues, structural_metrics};

/// Options forwarded untouched to a transpiler.
pub type TranspileOptions = serde_json::Value;

/// Environment variable carrying the options of a [`CommandTranspiler`].
pub const OPTIONS_ENV: &str = "FORGE_TRANSPILE_OPTIONS";

/// Something that transpiles artifacts of one target.
#[async_trait]
pub trait Transpiler: Send + Sync {
    /// Name shown in reports.
    fn name(&self) -> &str;

    /// Transpile an artifact and return metrics keyed by metric id.
    async fn transpile(
        &self,
        artifact: &Artifact,
        options: &TranspileOptions,
    ) -> BenchResult<MetricValues>;
}

// =========================================================================
// Reference
// =========================================================================

/// Measures the artifact unchanged by lifting it back into IR.
pub struct ReferenceTranspiler {
    emitter: Arc<dyn Emitter>,
    catalog: Arc<GateCatalog>,
}

impl ReferenceTranspiler {
    /// Create a reference transpiler lifting through `emitter` into `catalog`.
    pub fn new(emitter: Arc<dyn Emitter>, catalog: Arc<GateCatalog>) -> Self {
        Self { emitter, catalog }
    }
}

#[async_trait]
impl Transpiler for ReferenceTranspiler {
    fn name(&self) -> &str {
        "reference"
    }

    async fn transpile(
        &self,
        artifact: &Artifact,
        _options: &TranspileOptions,
    ) -> BenchResult<MetricValues> {
        let mut circuit = self.emitter.lift(artifact, Arc::clone(&self.catalog))?;
        let frozen = circuit
            .freeze()
            .map_err(|e| BenchError::Transpile(format!("lifted circuit is invalid: {e}")))?;
        Ok(structural_metrics(&frozen))
    }
}

// =========================================================================
// External command
// =========================================================================

/// Runs an external program per transpilation.
///
/// The rendered artifact is written to the program's stdin and the options
/// are passed as JSON in [`OPTIONS_ENV`]. The program must print a JSON
/// object mapping metric ids to numbers on stdout. It is killed if the
/// transpilation future is dropped, which is how harness timeouts stop it.
#[derive(Debug, Clone)]
pub struct CommandTranspiler {
    program: String,
    args: Vec<String>,
}

impl CommandTranspiler {
    /// Create a transpiler running `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program that is run.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn process_error(&self, message: impl Into<String>) -> BenchError {
        BenchError::Process {
            program: self.program.clone(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl Transpiler for CommandTranspiler {
    fn name(&self) -> &str {
        &self.program
    }

    async fn transpile(
        &self,
        artifact: &Artifact,
        options: &TranspileOptions,
    ) -> BenchResult<MetricValues> {
        debug!("Running '{}' on {} artifact", self.program, artifact.target());
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(OPTIONS_ENV, serde_json::to_string(options)?)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.process_error(e.to_string()))?;

        let stdin = child.stdin.take();
        let input = artifact.render();
        let write = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output.map_err(|e| self.process_error(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.process_error(format!("{}: {}", output.status, stderr.trim())));
        }
        // A program may exit without reading its input.
        if let Err(e) = written {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(self.process_error(e.to_string()));
            }
        }

        parse_metrics(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse a JSON object of metric values. Non-numeric entries are skipped.
pub fn parse_metrics(stdout: &str) -> BenchResult<MetricValues> {
    let value: serde_json::Value = serde_json::from_str(stdout.trim())
        .map_err(|e| BenchError::Metrics(format!("output is not JSON: {e}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| BenchError::Metrics("output is not a JSON object".into()))?;
    Ok(object
        .iter()
        .filter_map(|(k, v)| v.as_f64().map(|v| (k.clone(), v)))
        .collect())
}
