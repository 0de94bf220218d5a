//! End-to-end tests for the comparison harness.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use forge_bench::{
    BackendSpec, BackendStatus, BenchError, BenchResult, CommandTranspiler, Harness,
    HarnessConfig, Metric, MetricValues, TranspileOptions, Transpiler, structural_metrics,
};
use forge_emit::{Artifact, CirqEmitter, Emitter, Qasm3Emitter, QiskitEmitter};
use forge_ir::library::{self, AdderSpec};

/// Transpiler that sleeps before answering.
struct Sleepy(Duration);

#[async_trait]
impl Transpiler for Sleepy {
    fn name(&self) -> &str {
        "sleepy"
    }

    async fn transpile(&self, _: &Artifact, _: &TranspileOptions) -> BenchResult<MetricValues> {
        tokio::time::sleep(self.0).await;
        Ok(MetricValues::new())
    }
}

/// Transpiler that raises a flag once its work completes.
struct Flagging(Arc<AtomicBool>);

#[async_trait]
impl Transpiler for Flagging {
    fn name(&self) -> &str {
        "flagging"
    }

    async fn transpile(&self, _: &Artifact, _: &TranspileOptions) -> BenchResult<MetricValues> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        self.0.store(true, Ordering::SeqCst);
        Ok(MetricValues::new())
    }
}

/// Transpiler that always errors.
struct Broken;

#[async_trait]
impl Transpiler for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    async fn transpile(&self, _: &Artifact, _: &TranspileOptions) -> BenchResult<MetricValues> {
        Err(BenchError::Transpile("optimizer crashed".into()))
    }
}

/// Transpiler that panics.
struct Panicky;

#[async_trait]
impl Transpiler for Panicky {
    fn name(&self) -> &str {
        "panicky"
    }

    async fn transpile(&self, _: &Artifact, _: &TranspileOptions) -> BenchResult<MetricValues> {
        panic!("transpiler bug");
    }
}

/// Transpiler that echoes its options as a metric.
struct EchoOptions;

#[async_trait]
impl Transpiler for EchoOptions {
    fn name(&self) -> &str {
        "echo"
    }

    async fn transpile(&self, _: &Artifact, options: &TranspileOptions) -> BenchResult<MetricValues> {
        let mut values = MetricValues::new();
        if let Some(level) = options["optimization_level"].as_f64() {
            values.insert("gate_count".into(), level);
        }
        Ok(values)
    }
}

fn qasm() -> Arc<dyn Emitter> {
    Arc::new(Qasm3Emitter::new())
}

#[tokio::test]
async fn test_reference_backends_agree_with_ir() {
    let frozen = library::qft(4).unwrap().freeze().unwrap();
    let backends = [
        BackendSpec::reference("qasm3", qasm()),
        BackendSpec::reference("qiskit", Arc::new(QiskitEmitter::new())),
        BackendSpec::reference("cirq", Arc::new(CirqEmitter::new())),
    ];
    let metrics = [Metric::GateCount, Metric::Depth, Metric::TwoQubitGateCount];
    let report = Harness::new().compare(&frozen, &backends, &metrics).await;

    let expected = structural_metrics(&frozen);
    assert_eq!(report.backends.len(), 3);
    for (id, entry) in &report.backends {
        assert_eq!(entry.status, BackendStatus::Ok, "{id}");
        assert_eq!(entry.metrics, expected, "{id}");
        assert_eq!(entry.transpiler, "reference");
    }
    assert_eq!(report.circuit.num_qubits, 4);
}

#[tokio::test]
async fn test_unsupported_is_reported_not_raised() {
    let frozen = library::adder(&AdderSpec::new(4)).unwrap().freeze().unwrap();
    let backends = [
        BackendSpec::reference("qasm3", qasm()),
        BackendSpec::reference("cirq", Arc::new(CirqEmitter::new())),
    ];
    let report = Harness::new()
        .compare(&frozen, &backends, &[Metric::GateCount])
        .await;

    assert_eq!(report.backend("qasm3").unwrap().status, BackendStatus::Ok);
    let cirq = report.backend("cirq").unwrap();
    assert_eq!(cirq.status, BackendStatus::Unsupported);
    assert!(cirq.error.as_deref().unwrap().contains("barrier"));
    assert!(cirq.metrics.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_marks_only_slow_backend() {
    let frozen = library::bell().unwrap().freeze().unwrap();
    let backends = [
        BackendSpec::new("slow", qasm(), Arc::new(Sleepy(Duration::from_secs(60))))
            .with_timeout(Duration::from_secs(1)),
        BackendSpec::reference("fast", qasm()),
    ];
    let report = Harness::new()
        .compare(&frozen, &backends, &[Metric::Depth, Metric::TranspileSeconds])
        .await;

    assert_eq!(report.backend("slow").unwrap().status, BackendStatus::TimedOut);
    let fast = report.backend("fast").unwrap();
    assert_eq!(fast.status, BackendStatus::Ok);
    assert_eq!(fast.metrics["depth"], 3.0);
    assert!(fast.metrics.contains_key("transpile_seconds"));
}

#[tokio::test(start_paused = true)]
async fn test_default_timeout_applies() {
    let frozen = library::bell().unwrap().freeze().unwrap();
    let backends = [BackendSpec::new(
        "slow",
        qasm(),
        Arc::new(Sleepy(Duration::from_secs(60))),
    )];
    let report = Harness::new()
        .with_default_timeout(Duration::from_secs(5))
        .compare(&frozen, &backends, &[Metric::GateCount])
        .await;
    assert_eq!(report.backend("slow").unwrap().status, BackendStatus::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_compare_stops_backend_work() {
    let frozen = library::bell().unwrap().freeze().unwrap();
    let finished = Arc::new(AtomicBool::new(false));
    let backends = [BackendSpec::new(
        "flag",
        qasm(),
        Arc::new(Flagging(Arc::clone(&finished))),
    )];
    let harness = Harness::new();

    let cancelled = tokio::time::timeout(
        Duration::from_secs(1),
        harness.compare(&frozen, &backends, &[Metric::GateCount]),
    )
    .await;
    assert!(cancelled.is_err());

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(!finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_errors_and_panics_become_failed_entries() {
    let frozen = library::bell().unwrap().freeze().unwrap();
    let backends = [
        BackendSpec::new("broken", qasm(), Arc::new(Broken)),
        BackendSpec::new("panicky", qasm(), Arc::new(Panicky)),
        BackendSpec::reference("ok", qasm()),
    ];
    let report = Harness::new()
        .compare(&frozen, &backends, &[Metric::GateCount])
        .await;

    let broken = report.backend("broken").unwrap();
    assert_eq!(broken.status, BackendStatus::Failed);
    assert!(broken.error.as_deref().unwrap().contains("optimizer crashed"));

    let panicky = report.backend("panicky").unwrap();
    assert_eq!(panicky.status, BackendStatus::Failed);
    assert_eq!(panicky.transpiler, "panicky");

    assert_eq!(report.backend("ok").unwrap().status, BackendStatus::Ok);
    assert_eq!(report.count(BackendStatus::Failed), 2);
}

#[tokio::test]
async fn test_duplicate_ids_are_disambiguated() {
    let frozen = library::bell().unwrap().freeze().unwrap();
    let backends = [
        BackendSpec::reference("ref", qasm()),
        BackendSpec::reference("ref", Arc::new(QiskitEmitter::new())),
    ];
    let report = Harness::new()
        .compare(&frozen, &backends, &[Metric::GateCount])
        .await;

    assert_eq!(report.backend("ref").unwrap().target, "qasm3");
    assert_eq!(report.backend("ref#2").unwrap().target, "qiskit");
}

#[tokio::test]
async fn test_suffixes_do_not_collide_with_given_ids() {
    let frozen = library::bell().unwrap().freeze().unwrap();
    let backends = [
        BackendSpec::reference("a", qasm()),
        BackendSpec::reference("a", Arc::new(QiskitEmitter::new())),
        BackendSpec::reference("a#2", Arc::new(CirqEmitter::new())),
    ];
    let report = Harness::new()
        .compare(&frozen, &backends, &[Metric::GateCount])
        .await;

    assert_eq!(report.backends.len(), 3);
    assert_eq!(report.count(BackendStatus::Ok), 3);
    assert_eq!(report.backend("a").unwrap().target, "qasm3");
    assert_eq!(report.backend("a#3").unwrap().target, "qiskit");
    assert_eq!(report.backend("a#2").unwrap().target, "cirq");
}

#[tokio::test]
async fn test_compare_config_uses_configured_metrics() {
    let config = HarnessConfig::from_yaml_str(
        "metrics: [depth]\nbackends:\n  - id: q\n    emitter: qasm3\n",
    )
    .unwrap();
    let frozen = library::ghz(3).unwrap().freeze().unwrap();
    let report = Harness::new().compare_config(&frozen, &config).await.unwrap();

    let entry = report.backend("q").unwrap();
    assert_eq!(entry.status, BackendStatus::Ok);
    assert_eq!(entry.metrics.len(), 1);
    assert_eq!(entry.metrics["depth"], 4.0);
}

#[tokio::test]
async fn test_options_reach_transpiler() {
    let frozen = library::bell().unwrap().freeze().unwrap();
    let backends = [BackendSpec::new("echo", qasm(), Arc::new(EchoOptions))
        .with_options(serde_json::json!({"optimization_level": 2}))];
    let report = Harness::new()
        .compare(&frozen, &backends, &[Metric::GateCount, Metric::Depth])
        .await;

    let entry = report.backend("echo").unwrap();
    assert_eq!(entry.status, BackendStatus::Ok);
    assert_eq!(entry.metrics["gate_count"], 2.0);
    assert!(!entry.metrics.contains_key("depth"));
}

#[tokio::test]
async fn test_empty_backend_list() {
    let frozen = library::bell().unwrap().freeze().unwrap();
    let report = Harness::new().compare(&frozen, &[], &[Metric::Depth]).await;
    assert!(report.backends.is_empty());
    assert_eq!(report.circuit.name, "bell");
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_backend_is_killed_on_timeout() {
    let frozen = library::bell().unwrap().freeze().unwrap();
    let transpiler = CommandTranspiler::new("sh").args(["-c", "sleep 30"]);
    let backends = [BackendSpec::new("cmd", qasm(), Arc::new(transpiler))
        .with_timeout(Duration::from_millis(200))];

    let started = std::time::Instant::now();
    let report = Harness::new()
        .compare(&frozen, &backends, &[Metric::GateCount])
        .await;
    assert_eq!(report.backend("cmd").unwrap().status, BackendStatus::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[cfg(unix)]
#[tokio::test]
async fn test_configured_command_backend() {
    let yaml = r#"
metrics: [gate_count, transpile_seconds]
backends:
  - id: external
    emitter: qiskit
    transpiler:
      type: command
      program: sh
      args: ["-c", "cat > /dev/null; echo '{\"gate_count\": 11}'"]
    timeout_seconds: 20
  - id: reference
    emitter: qasm3
"#;
    let config = HarnessConfig::from_yaml_str(yaml).unwrap();
    let frozen = library::ghz(3).unwrap().freeze().unwrap();
    let report = Harness::new().compare_config(&frozen, &config).await.unwrap();

    let external = report.backend("external").unwrap();
    assert_eq!(external.status, BackendStatus::Ok, "{:?}", external.error);
    assert_eq!(external.metrics["gate_count"], 11.0);
    assert!(external.metrics["transpile_seconds"] >= 0.0);
    assert_eq!(report.backend("reference").unwrap().metrics["gate_count"], 6.0);

    let table = report.to_table();
    assert!(table.contains("external"));
    assert!(table.contains("reference"));
}
