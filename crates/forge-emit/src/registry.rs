//! Emitter registry.
//!
//! The [`EmitterRegistry`] is the central point for discovering and
//! creating emitters by target id.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::cirq::CirqEmitter;
use crate::emitter::Emitter;
use crate::error::{EmitError, EmitResult};
use crate::qasm3::Qasm3Emitter;
use crate::qiskit::QiskitEmitter;

/// Factory function type for emitters.
type EmitterFactory = Box<dyn Fn() -> Arc<dyn Emitter> + Send + Sync>;

/// Registry of emitter factories keyed by target id.
pub struct EmitterRegistry {
    factories: FxHashMap<String, EmitterFactory>,
}

impl EmitterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Registry holding the `qasm3`, `qiskit` and `cirq` emitters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_factory(crate::qasm3::TARGET, || Arc::new(Qasm3Emitter::new()));
        registry.register_factory(crate::qiskit::TARGET, || Arc::new(QiskitEmitter::new()));
        registry.register_factory(crate::cirq::TARGET, || Arc::new(CirqEmitter::new()));
        registry
    }

    /// Register an emitter factory, replacing any factory under that id.
    pub fn register_factory(
        &mut self,
        target: impl Into<String>,
        factory: impl Fn() -> Arc<dyn Emitter> + Send + Sync + 'static,
    ) {
        let target = target.into();
        debug!("Registering emitter: {}", target);
        self.factories.insert(target, Box::new(factory));
    }

    /// Create the emitter registered under `target`.
    pub fn create(&self, target: &str) -> EmitResult<Arc<dyn Emitter>> {
        self.factories
            .get(target)
            .map(|factory| factory())
            .ok_or_else(|| EmitError::UnknownTarget(target.to_string()))
    }

    /// Registered target ids, sorted.
    pub fn available_targets(&self) -> Vec<String> {
        let mut names: Vec<_> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a target is registered.
    pub fn has_target(&self, target: &str) -> bool {
        self.factories.contains_key(target)
    }
}

impl Default for EmitterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for EmitterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmitterRegistry")
            .field("targets", &self.available_targets())
            .finish()
    }
}
