// crates/firelynx-engines/src/factory.rs
// ============================================================================
// Module: Evaluator Factory
// Description: Dialect registry and spec-to-evaluator compilation.
// Purpose: Compile once at config time, evaluate per request.
// Dependencies: crate::source, firelynx-core
// ============================================================================

//! ## Overview
//! The registry maps dialects to engines; the factory resolves a spec's
//! source and asks the matching engine to compile it. Compilation happens
//! during transaction prepare so syntax and load errors surface before
//! commit, and the resulting evaluators are immutable and shared across
//! requests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use firelynx_core::CompileError;
use firelynx_core::CompiledEvaluator;
use firelynx_core::Dialect;
use firelynx_core::EvaluatorSpec;
use firelynx_core::ScriptEngine;

use crate::source::resolve_source;

// ============================================================================
// SECTION: Engine Registry
// ============================================================================

/// Registry of script engines keyed by dialect.
///
/// # Invariants
/// - Registration happens before the registry is shared; lookups after that
///   never observe mutation.
#[derive(Default)]
pub struct EngineRegistry {
    /// Registered engines by dialect.
    engines: BTreeMap<Dialect, Arc<dyn ScriptEngine>>,
}

impl EngineRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an engine for a dialect, replacing any previous entry.
    pub fn register(&mut self, dialect: Dialect, engine: Arc<dyn ScriptEngine>) {
        self.engines.insert(dialect, engine);
    }

    /// Returns the engine registered for a dialect.
    #[must_use]
    pub fn engine(&self, dialect: Dialect) -> Option<Arc<dyn ScriptEngine>> {
        self.engines.get(&dialect).map(Arc::clone)
    }

    /// Returns the registered dialects in stable order.
    #[must_use]
    pub fn dialects(&self) -> Vec<Dialect> {
        self.engines.keys().copied().collect()
    }
}

// ============================================================================
// SECTION: Evaluator Factory
// ============================================================================

/// Compiles evaluator specs through the registered engines.
#[derive(Clone)]
pub struct EvaluatorFactory {
    /// Shared engine registry.
    registry: Arc<EngineRegistry>,
}

impl EvaluatorFactory {
    /// Creates a factory over the given registry.
    #[must_use]
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        Self {
            registry,
        }
    }

    /// Compiles a spec into a reusable evaluator.
    ///
    /// Resolves the source (including file and HTTP loads), then compiles it
    /// with the engine registered for the spec's dialect.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] when no engine is registered, the source
    /// cannot be resolved, or the engine rejects it.
    pub fn compile(&self, spec: &EvaluatorSpec) -> Result<Arc<dyn CompiledEvaluator>, CompileError> {
        let engine = self
            .registry
            .engine(spec.dialect)
            .ok_or(CompileError::UnknownDialect(spec.dialect))?;
        let bytes = resolve_source(&spec.source)?;
        engine.compile(&bytes, spec)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
