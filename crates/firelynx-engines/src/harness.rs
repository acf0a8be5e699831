// crates/firelynx-engines/src/harness.rs
// ============================================================================
// Module: Harness Engines
// Description: Closure- and constant-backed engines for tests and embedders.
// Purpose: Exercise the full evaluator pipeline without a real interpreter.
// Dependencies: firelynx-core
// ============================================================================

//! ## Overview
//! Production engines are external collaborators; these harness engines make
//! the dispatch plane exercisable without one. [`FnEngine`] compiles every
//! source into an evaluator that calls a supplied closure; [`StaticEngine`]
//! returns a fixed value. Both are library code rather than test-only code so
//! embedders can use them during bring-up.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use firelynx_core::CompileError;
use firelynx_core::CompiledEvaluator;
use firelynx_core::EvalError;
use firelynx_core::EvalInput;
use firelynx_core::EvaluatorSpec;
use firelynx_core::ScriptEngine;
use serde_json::Value;

// ============================================================================
// SECTION: Closure Engine
// ============================================================================

/// Evaluation closure signature for [`FnEngine`].
pub type EvalFn = dyn Fn(&EvalInput) -> Result<Value, EvalError> + Send + Sync;

/// Engine compiling every source into a closure-backed evaluator.
///
/// # Invariants
/// - The closure must be safe for concurrent invocation; the engine shares
///   one instance across all compiled evaluators.
#[derive(Clone)]
pub struct FnEngine {
    /// Shared evaluation closure.
    eval: Arc<EvalFn>,
}

impl FnEngine {
    /// Creates an engine around the given evaluation closure.
    #[must_use]
    pub fn new(eval: impl Fn(&EvalInput) -> Result<Value, EvalError> + Send + Sync + 'static) -> Self {
        Self {
            eval: Arc::new(eval),
        }
    }
}

impl ScriptEngine for FnEngine {
    fn compile(
        &self,
        source: &[u8],
        _spec: &EvaluatorSpec,
    ) -> Result<Arc<dyn CompiledEvaluator>, CompileError> {
        if source.is_empty() {
            return Err(CompileError::Source("script source is empty".to_string()));
        }
        Ok(Arc::new(FnEvaluator {
            eval: Arc::clone(&self.eval),
        }))
    }
}

/// Closure-backed compiled evaluator.
struct FnEvaluator {
    /// Shared evaluation closure.
    eval: Arc<EvalFn>,
}

impl CompiledEvaluator for FnEvaluator {
    fn evaluate(&self, input: &EvalInput) -> Result<Value, EvalError> {
        (self.eval)(input)
    }
}

// ============================================================================
// SECTION: Static Engine
// ============================================================================

/// Engine compiling every source into a fixed-value evaluator.
#[derive(Clone)]
pub struct StaticEngine {
    /// Value returned by every evaluation.
    value: Value,
}

impl StaticEngine {
    /// Creates an engine returning the given value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self {
            value,
        }
    }
}

impl ScriptEngine for StaticEngine {
    fn compile(
        &self,
        source: &[u8],
        _spec: &EvaluatorSpec,
    ) -> Result<Arc<dyn CompiledEvaluator>, CompileError> {
        if source.is_empty() {
            return Err(CompileError::Source("script source is empty".to_string()));
        }
        Ok(Arc::new(StaticEvaluator {
            value: self.value.clone(),
        }))
    }
}

/// Fixed-value compiled evaluator.
struct StaticEvaluator {
    /// Value returned by every evaluation.
    value: Value,
}

impl CompiledEvaluator for StaticEvaluator {
    fn evaluate(&self, _input: &EvalInput) -> Result<Value, EvalError> {
        Ok(self.value.clone())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
