// crates/firelynx-server/src/apps.rs
// ============================================================================
// Module: App Implementations
// Description: Echo, script, composite, and MCP app instances.
// Purpose: Terminal handlers invoked by the request executor.
// Dependencies: crate, firelynx-core, firelynx-engines, firelynx-mcp
// ============================================================================

//! ## Overview
//! App instances are built once per commit and shared across requests. The
//! executor hands each invocation the route-level static data as an overlay;
//! script apps merge their own data under it (later sources win: app data,
//! then composite base, then route data). Composite apps chain script
//! members, threading each stage's output through the `previous` context
//! key. The MCP app bridges the request body into the JSON-RPC service.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use firelynx_core::App;
use firelynx_core::AppError;
use firelynx_core::AppRequest;
use firelynx_core::AppResponse;
use firelynx_core::CompiledEvaluator;
use firelynx_core::EvalInput;
use firelynx_core::MergeMode;
use firelynx_core::StaticData;
use firelynx_core::marshal_value;
use firelynx_core::merge_static_data;
use firelynx_engines::evaluate_with_deadline;
use firelynx_mcp::McpService;
use serde_json::Value;

// ============================================================================
// SECTION: Echo App
// ============================================================================

/// Fixed-response app.
pub struct EchoApp {
    /// Response body, already interpolated by validation.
    response: String,
}

impl EchoApp {
    /// Creates an echo app with the given response body.
    #[must_use]
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl App for EchoApp {
    async fn handle(&self, _request: AppRequest) -> Result<AppResponse, AppError> {
        Ok(AppResponse::text(200, self.response.clone()))
    }
}

/// Built-in `echo` app reflecting the request context as JSON.
///
/// Routes may reference it without a config entry; it is the debugging
/// counterpart to the configured fixed-response echo app.
pub struct RequestEchoApp;

#[async_trait]
impl App for RequestEchoApp {
    async fn handle(&self, request: AppRequest) -> Result<AppResponse, AppError> {
        Ok(AppResponse::json(200, request.context_value()))
    }
}

// ============================================================================
// SECTION: Script App
// ============================================================================

/// Script-evaluator app.
pub struct ScriptApp {
    /// Compiled evaluator invoked per request.
    evaluator: Arc<dyn CompiledEvaluator>,
    /// App-level static data merged under the request overlay.
    data: StaticData,
    /// Merge behavior on key collision.
    merge_mode: MergeMode,
    /// Evaluation deadline, when configured.
    timeout: Option<Duration>,
}

impl ScriptApp {
    /// Creates a script app over a compiled evaluator.
    #[must_use]
    pub fn new(
        evaluator: Arc<dyn CompiledEvaluator>,
        data: StaticData,
        merge_mode: MergeMode,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            evaluator,
            data,
            merge_mode,
            timeout,
        }
    }

    /// Evaluates the script with merged data and returns its raw value.
    async fn evaluate(&self, request: &AppRequest) -> Result<Value, AppError> {
        let merged = merge_static_data(&self.data, &request.data, self.merge_mode);
        let context = AppRequest {
            data: merged,
            view: request.view.clone(),
            previous: request.previous.clone(),
        };
        let input = EvalInput {
            context: context.context_value(),
            deadline: self.timeout,
        };
        let value =
            evaluate_with_deadline(Arc::clone(&self.evaluator), input, self.timeout).await?;
        Ok(value)
    }
}

#[async_trait]
impl App for ScriptApp {
    async fn handle(&self, request: AppRequest) -> Result<AppResponse, AppError> {
        let value = self.evaluate(&request).await?;
        Ok(marshal_value(value))
    }
}

// ============================================================================
// SECTION: Composite App
// ============================================================================

/// Chained-evaluation app over script members.
pub struct CompositeApp {
    /// Script members in invocation order.
    members: Vec<Arc<ScriptApp>>,
    /// Base static data merged over member data.
    data: StaticData,
    /// Merge behavior on key collision.
    merge_mode: MergeMode,
}

impl CompositeApp {
    /// Creates a composite app over resolved script members.
    #[must_use]
    pub fn new(members: Vec<Arc<ScriptApp>>, data: StaticData, merge_mode: MergeMode) -> Self {
        Self {
            members,
            data,
            merge_mode,
        }
    }
}

#[async_trait]
impl App for CompositeApp {
    async fn handle(&self, request: AppRequest) -> Result<AppResponse, AppError> {
        // Overlay handed to each member: composite base under the route data.
        let overlay = merge_static_data(&self.data, &request.data, self.merge_mode);
        let mut previous: Option<Value> = None;
        let mut last = Value::Null;
        for member in &self.members {
            let member_request = AppRequest {
                data: overlay.clone(),
                view: request.view.clone(),
                previous: previous.clone(),
            };
            let value = member.evaluate(&member_request).await?;
            previous = Some(value.clone());
            last = value;
        }
        Ok(marshal_value(last))
    }
}

// ============================================================================
// SECTION: MCP App
// ============================================================================

/// MCP tool-protocol app bridging HTTP bodies into the JSON-RPC service.
pub struct McpApp {
    /// Underlying MCP service.
    service: Arc<McpService>,
}

impl McpApp {
    /// Creates an MCP app over a built service.
    #[must_use]
    pub const fn new(service: Arc<McpService>) -> Self {
        Self {
            service,
        }
    }
}

#[async_trait]
impl App for McpApp {
    async fn handle(&self, request: AppRequest) -> Result<AppResponse, AppError> {
        if request.view.method != "POST" {
            return Ok(AppResponse::text(405, "method not allowed"));
        }
        let body = request.view.body.as_ref().map_or_else(Vec::new, |value| {
            serde_json::to_vec(value).unwrap_or_default()
        });
        let (status, envelope) = self.service.handle(&body).await;
        let value = serde_json::to_value(&envelope)
            .map_err(|err| AppError::Internal(format!("mcp envelope serialization: {err}")))?;
        Ok(AppResponse::json(status.as_u16(), value))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
