// crates/firelynx-core/src/evaluator.rs
// ============================================================================
// Module: Firelynx Evaluator Contract
// Description: Script evaluator specs, engine and compiled-evaluator traits.
// Purpose: Define the compile-once, evaluate-per-request contract.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Script apps are powered by evaluators: an evaluator spec (dialect, source,
//! timeout) is compiled once into an opaque, thread-safe compiled evaluator,
//! then invoked once per request with a context map. Concrete engines are
//! external collaborators that plug in through [`ScriptEngine`]; firelynx
//! validates specs and enforces timeouts but never interprets script text
//! itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Evaluator Specification
// ============================================================================

/// Script dialect understood by an engine.
///
/// # Invariants
/// - Variants are stable for serialization and config matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Risor inline scripting dialect.
    Risor,
    /// Starlark inline scripting dialect.
    Starlark,
    /// Extism WebAssembly host dialect.
    Extism,
}

impl Dialect {
    /// Returns a stable label for the dialect.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Risor => "risor",
            Self::Starlark => "starlark",
            Self::Extism => "extism",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of script text or module bytes.
///
/// # Invariants
/// - Exactly one form is carried; the config layer rejects code-and-uri.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorSource {
    /// Inline source text embedded in the configuration.
    Code(String),
    /// URI pointing at a file or HTTP resource holding the source.
    Uri(String),
}

/// Validated evaluator specification handed to the factory.
///
/// # Invariants
/// - `timeout` of `None` means no deadline is installed for evaluations.
/// - `entrypoint` is present only for [`Dialect::Extism`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorSpec {
    /// Script dialect selecting the engine.
    pub dialect: Dialect,
    /// Script source location or inline text.
    pub source: EvaluatorSource,
    /// Per-evaluation deadline; `None` disables the deadline.
    pub timeout: Option<Duration>,
    /// Exported symbol to invoke for WebAssembly modules.
    pub entrypoint: Option<String>,
}

// ============================================================================
// SECTION: Evaluation Input
// ============================================================================

/// Input handed to a compiled evaluator for one evaluation.
///
/// # Invariants
/// - `context` is a JSON object with the reserved `data` and `request` keys
///   (and `previous` inside composite chains).
/// - `deadline` mirrors the externally enforced timeout so cooperative
///   engines can stop early.
#[derive(Debug, Clone)]
pub struct EvalInput {
    /// Context map for the evaluation.
    pub context: Value,
    /// Deadline mirrored from the evaluator spec, when configured.
    pub deadline: Option<Duration>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced while compiling an evaluator spec.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The source text or bytes are missing or empty.
    #[error("evaluator source error: {0}")]
    Source(String),
    /// A URI source could not be loaded.
    #[error("evaluator source load failed: {0}")]
    Load(String),
    /// The engine rejected the source.
    #[error("evaluator compilation failed: {0}")]
    Engine(String),
    /// No engine is registered for the requested dialect.
    #[error("no engine registered for dialect {0}")]
    UnknownDialect(Dialect),
}

/// Errors surfaced while evaluating a compiled evaluator.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The evaluation exceeded its configured deadline.
    #[error("evaluation timed out")]
    Timeout,
    /// The evaluation failed or the engine panicked.
    #[error("evaluation failed: {0}")]
    Execution(String),
}

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Script engine compiling sources for one dialect.
///
/// Engines are external collaborators registered at embed time; each engine
/// owns syntax validation and entrypoint resolution for its dialect.
pub trait ScriptEngine: Send + Sync {
    /// Compiles source bytes into a reusable evaluator.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] when the source does not compile or, for
    /// WebAssembly modules, when the entrypoint does not resolve.
    fn compile(
        &self,
        source: &[u8],
        spec: &EvaluatorSpec,
    ) -> Result<Arc<dyn CompiledEvaluator>, CompileError>;
}

/// Compiled evaluator invoked once per request evaluation.
///
/// # Invariants
/// - Implementations are immutable after compile and safe for concurrent
///   invocation.
/// - Implementations should honor `input.deadline` cooperatively; the
///   executor enforces the deadline externally regardless.
pub trait CompiledEvaluator: Send + Sync {
    /// Evaluates the compiled script against the given input.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] when the script fails or times out internally.
    fn evaluate(&self, input: &EvalInput) -> Result<Value, EvalError>;
}
