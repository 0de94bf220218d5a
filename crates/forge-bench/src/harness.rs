//! The comparison harness.
//!
//! [`Harness::compare`] runs one task per backend on a `JoinSet`. Each task
//! emits the circuit, transpiles the artifact under the backend's timeout,
//! and produces exactly one [`BackendReport`]. Failures of any kind,
//! panics included, become report entries; `compare` itself cannot fail.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use forge_emit::{EmitError, Emitter, EmitterRegistry};
use forge_ir::{FrozenCircuit, GateCatalog};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::config::{HarnessConfig, TranspilerConfig};
use crate::error::BenchResult;
use crate::metrics::{Metric, MetricValues};
use crate::report::{BackendReport, BackendStatus, ComparisonReport};
use crate::transpiler::{CommandTranspiler, ReferenceTranspiler, TranspileOptions, Transpiler};

/// One backend in a comparison: an emitter paired with a transpiler.
#[derive(Clone)]
pub struct BackendSpec {
    /// Backend id used as the report key.
    pub id: String,
    /// Emitter producing the artifact.
    pub emitter: Arc<dyn Emitter>,
    /// Transpiler run on the artifact.
    pub transpiler: Arc<dyn Transpiler>,
    /// Options passed to the transpiler.
    pub options: TranspileOptions,
    /// Transpilation timeout; falls back to the harness default.
    pub timeout: Option<Duration>,
}

impl BackendSpec {
    /// Create a backend spec.
    pub fn new(
        id: impl Into<String>,
        emitter: Arc<dyn Emitter>,
        transpiler: Arc<dyn Transpiler>,
    ) -> Self {
        Self {
            id: id.into(),
            emitter,
            transpiler,
            options: TranspileOptions::Null,
            timeout: None,
        }
    }

    /// Backend measuring the emitted artifact with a [`ReferenceTranspiler`].
    pub fn reference(id: impl Into<String>, emitter: Arc<dyn Emitter>) -> Self {
        let transpiler = Arc::new(ReferenceTranspiler::new(
            Arc::clone(&emitter),
            GateCatalog::standard(),
        ));
        Self::new(id, emitter, transpiler)
    }

    /// Set transpiler options.
    pub fn with_options(mut self, options: TranspileOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl std::fmt::Debug for BackendSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSpec")
            .field("id", &self.id)
            .field("target", &self.emitter.target())
            .field("transpiler", &self.transpiler.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Drives backends over a circuit and collects a [`ComparisonReport`].
pub struct Harness {
    registry: EmitterRegistry,
    catalog: Arc<GateCatalog>,
    default_timeout: Option<Duration>,
}

impl Harness {
    /// Harness with the default emitters and the standard catalog.
    pub fn new() -> Self {
        Self {
            registry: EmitterRegistry::with_defaults(),
            catalog: GateCatalog::standard(),
            default_timeout: None,
        }
    }

    /// Use a custom emitter registry.
    pub fn with_registry(mut self, registry: EmitterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Catalog reference transpilers lift into.
    pub fn with_catalog(mut self, catalog: Arc<GateCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Timeout for backends that do not set one.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// The emitter registry.
    pub fn registry(&self) -> &EmitterRegistry {
        &self.registry
    }

    /// Build backend specs from configuration.
    pub fn backends_from_config(&self, config: &HarnessConfig) -> BenchResult<Vec<BackendSpec>> {
        config
            .backends
            .iter()
            .map(|backend| {
                let emitter = self.registry.create(&backend.emitter)?;
                let transpiler: Arc<dyn Transpiler> = match &backend.transpiler {
                    TranspilerConfig::Reference => Arc::new(ReferenceTranspiler::new(
                        Arc::clone(&emitter),
                        Arc::clone(&self.catalog),
                    )),
                    TranspilerConfig::Command { program, args } => {
                        Arc::new(CommandTranspiler::new(program.clone()).args(args.iter().cloned()))
                    }
                };
                let timeout = backend
                    .timeout_seconds
                    .or(config.default_timeout_seconds)
                    .map(Duration::from_secs);
                Ok(BackendSpec {
                    id: backend.id.clone(),
                    emitter,
                    transpiler,
                    options: backend.options.clone(),
                    timeout,
                })
            })
            .collect()
    }

    /// Compare the backends and metrics named in a configuration.
    ///
    /// Same as [`Harness::backends_from_config`] followed by
    /// [`Harness::compare`] with `config.metrics`.
    pub async fn compare_config(
        &self,
        circuit: &FrozenCircuit,
        config: &HarnessConfig,
    ) -> BenchResult<ComparisonReport> {
        let backends = self.backends_from_config(config)?;
        Ok(self.compare(circuit, &backends, &config.metrics).await)
    }

    /// Compare backends on one circuit.
    ///
    /// Duplicate backend ids are reported as `id#2`, `id#3`, ... in the
    /// order given. The report always has one entry per backend.
    pub async fn compare(
        &self,
        circuit: &FrozenCircuit,
        backends: &[BackendSpec],
        metrics: &[Metric],
    ) -> ComparisonReport {
        info!(
            "Comparing {} backend(s) on circuit '{}'",
            backends.len(),
            circuit.name()
        );
        let mut report = ComparisonReport::new(circuit, metrics);
        let ids = unique_ids(backends);

        let mut tasks = JoinSet::new();
        for (id, backend) in ids.iter().zip(backends) {
            let id = id.clone();
            let circuit = circuit.clone();
            let mut backend = backend.clone();
            backend.timeout = backend.timeout.or(self.default_timeout);
            let metrics = metrics.to_vec();
            tasks.spawn(async move {
                let target = backend.emitter.target();
                let transpiler = backend.transpiler.name().to_string();
                // Run in a nested task so a panic is attributed to this backend.
                let mut inner =
                    AbortOnDrop(tokio::spawn(run_backend(circuit, backend, metrics)));
                let report = match (&mut inner.0).await {
                    Ok(report) => report,
                    Err(e) => BackendReport::new(BackendStatus::Failed, target, transpiler)
                        .with_error(format!("backend task failed: {e}")),
                };
                (id, report)
            });
        }

        let mut results = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, entry)) => {
                    log_outcome(&id, &entry);
                    results.insert(id, entry);
                }
                Err(e) => warn!("Comparison task failed: {}", e),
            }
        }

        for (id, backend) in ids.into_iter().zip(backends) {
            let entry = results.remove(&id).unwrap_or_else(|| {
                BackendReport::new(
                    BackendStatus::Failed,
                    backend.emitter.target(),
                    backend.transpiler.name(),
                )
                .with_error("backend task did not complete")
            });
            report.backends.insert(id, entry);
        }

        info!(
            "Comparison of '{}' finished: {} ok, {} unsupported, {} failed, {} timed out",
            circuit.name(),
            report.count(BackendStatus::Ok),
            report.count(BackendStatus::Unsupported),
            report.count(BackendStatus::Failed),
            report.count(BackendStatus::TimedOut),
        );
        report
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Aborts the wrapped task when dropped, so cancelling `compare` stops
/// backend work too.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Emit, transpile and measure for one backend.
async fn run_backend(
    circuit: FrozenCircuit,
    backend: BackendSpec,
    metrics: Vec<Metric>,
) -> BackendReport {
    let target = backend.emitter.target();
    let transpiler = backend.transpiler.name().to_string();
    let entry = |status| BackendReport::new(status, target, transpiler.clone());

    let artifact = match backend.emitter.emit(&circuit) {
        Ok(artifact) => artifact,
        Err(e @ EmitError::Unsupported { .. }) => {
            return entry(BackendStatus::Unsupported).with_error(e.to_string());
        }
        Err(e) => return entry(BackendStatus::Failed).with_error(e.to_string()),
    };
    debug!("Backend '{}' emitted {} artifact", backend.id, target);

    let started = Instant::now();
    let transpile = backend.transpiler.transpile(&artifact, &backend.options);
    let result = match backend.timeout {
        Some(limit) => match tokio::time::timeout(limit, transpile).await {
            Ok(result) => result,
            Err(_) => {
                return entry(BackendStatus::TimedOut)
                    .with_error(format!("transpiler exceeded {:.3}s", limit.as_secs_f64()));
            }
        },
        None => transpile.await,
    };
    let elapsed = started.elapsed().as_secs_f64();

    match result {
        Ok(values) => entry(BackendStatus::Ok).with_metrics(select_metrics(&metrics, &values, elapsed)),
        Err(e) => entry(BackendStatus::Failed).with_error(e.to_string()),
    }
}

/// Keep the requested metrics; timing comes from the harness clock.
fn select_metrics(requested: &[Metric], values: &MetricValues, elapsed: f64) -> MetricValues {
    requested
        .iter()
        .filter_map(|metric| {
            let value = match metric {
                Metric::TranspileSeconds => Some(elapsed),
                other => values.get(other.id()).copied(),
            };
            if value.is_none() {
                debug!("Transpiler reported no value for '{}'", metric);
            }
            value.map(|v| (metric.id().to_string(), v))
        })
        .collect()
}

/// Backend ids with repeats suffixed `#2`, `#3`, ...
///
/// A suffix never reuses an id given explicitly or generated earlier.
fn unique_ids(backends: &[BackendSpec]) -> Vec<String> {
    let given: BTreeSet<&str> = backends.iter().map(|b| b.id.as_str()).collect();
    let mut taken: BTreeSet<String> = BTreeSet::new();
    let mut next: BTreeMap<&str, usize> = BTreeMap::new();
    backends
        .iter()
        .map(|b| {
            let id = if taken.contains(&b.id) {
                let n = next.entry(b.id.as_str()).or_insert(2);
                loop {
                    let candidate = format!("{}#{}", b.id, n);
                    *n += 1;
                    if !given.contains(candidate.as_str()) && !taken.contains(&candidate) {
                        break candidate;
                    }
                }
            } else {
                b.id.clone()
            };
            taken.insert(id.clone());
            id
        })
        .collect()
}

fn log_outcome(id: &str, entry: &BackendReport) {
    match entry.status {
        BackendStatus::Ok => info!("Backend '{}' ok", id),
        BackendStatus::Unsupported => info!(
            "Backend '{}' unsupported: {}",
            id,
            entry.error.as_deref().unwrap_or("")
        ),
        BackendStatus::Failed | BackendStatus::TimedOut => warn!(
            "Backend '{}' {}: {}",
            id,
            entry.status,
            entry.error.as_deref().unwrap_or("")
        ),
    }
}
