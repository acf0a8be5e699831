// crates/firelynx-core/src/app.rs
// ============================================================================
// Module: Firelynx App Contract
// Description: Application contract and per-request context assembly.
// Purpose: Define how the executor hands requests to app instances.
// Dependencies: crate::{data, evaluator, request, response}, async-trait
// ============================================================================

//! ## Overview
//! An app is a named handler for requests: echo, script, composite, or MCP.
//! The executor builds an [`AppRequest`] carrying the merged static data and
//! the structured request view, invokes the app, and marshals the returned
//! [`crate::response::AppResponse`] onto the wire. App instances are built at
//! commit time, are immutable afterwards, and are shared across requests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::data::StaticData;
use crate::evaluator::EvalError;
use crate::request::RequestView;
use crate::response::AppResponse;

// ============================================================================
// SECTION: App Request
// ============================================================================

/// Per-request input handed to an app.
///
/// # Invariants
/// - `data` is the fully merged static data for this invocation (app data
///   with route data merged over it).
/// - `previous` is set only inside composite chains, carrying the prior
///   stage's output value.
#[derive(Debug, Clone)]
pub struct AppRequest {
    /// Merged static data for this invocation.
    pub data: StaticData,
    /// Structured view of the HTTP request.
    pub view: RequestView,
    /// Output of the previous composite stage, when chained.
    pub previous: Option<Value>,
}

impl AppRequest {
    /// Builds the context map with the reserved `data` and `request` keys.
    ///
    /// Inside composite chains the `previous` key carries the prior stage's
    /// output value.
    #[must_use]
    pub fn context_value(&self) -> Value {
        let mut context = Map::new();
        let data: Map<String, Value> =
            self.data.iter().map(|(key, value)| (key.clone(), value.clone())).collect();
        context.insert("data".to_string(), Value::Object(data));
        context.insert("request".to_string(), self.view.to_value());
        if let Some(previous) = &self.previous {
            context.insert("previous".to_string(), previous.clone());
        }
        Value::Object(context)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced while an app handles a request.
#[derive(Debug, Error)]
pub enum AppError {
    /// Script evaluation failed or timed out.
    #[error(transparent)]
    Evaluation(#[from] EvalError),
    /// The app failed outside script evaluation.
    #[error("app error: {0}")]
    Internal(String),
}

// ============================================================================
// SECTION: App Trait
// ============================================================================

/// Named handler for requests.
///
/// # Invariants
/// - Implementations are immutable after construction and safe for
///   concurrent invocation.
#[async_trait]
pub trait App: Send + Sync {
    /// Handles one request and produces HTTP response parts.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when evaluation fails; dispatch-level failures
    /// (unknown app, unmatched route) are handled before the app is invoked.
    async fn handle(&self, request: AppRequest) -> Result<AppResponse, AppError>;
}

// ============================================================================
// SECTION: Tests
// ============================================================================
