// crates/firelynx-engines/src/exec.rs
// ============================================================================
// Module: Deadline-Aware Evaluation
// Description: Run a compiled evaluator under its configured deadline.
// Purpose: Bound evaluation wall-clock on the request path.
// Dependencies: firelynx-core, tokio
// ============================================================================

//! ## Overview
//! Script evaluation may block arbitrarily long, so the request path shifts
//! it onto the blocking pool and bounds the wait with the evaluator's
//! configured deadline. Expiry surfaces as [`EvalError::Timeout`]; the
//! abandoned blocking task finishes in the background, which is why the
//! deadline is also mirrored into [`EvalInput`] for cooperative engines.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use firelynx_core::CompiledEvaluator;
use firelynx_core::EvalError;
use firelynx_core::EvalInput;
use serde_json::Value;

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Evaluates on the blocking pool, bounded by the given deadline.
///
/// A deadline of `None` waits indefinitely.
///
/// # Errors
///
/// Returns [`EvalError::Timeout`] on expiry, or the evaluator's own error.
pub async fn evaluate_with_deadline(
    evaluator: Arc<dyn CompiledEvaluator>,
    input: EvalInput,
    deadline: Option<Duration>,
) -> Result<Value, EvalError> {
    let task = tokio::task::spawn_blocking(move || evaluator.evaluate(&input));
    let joined = match deadline {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => return Err(EvalError::Timeout),
        },
        None => task.await,
    };
    joined.map_err(|_| EvalError::Execution("evaluator task failed".to_string()))?
}

// ============================================================================
// SECTION: Tests
// ============================================================================
