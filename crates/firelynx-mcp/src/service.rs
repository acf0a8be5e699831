// crates/firelynx-mcp/src/service.rs
// ============================================================================
// Module: MCP Service
// Description: JSON-RPC method dispatch for one MCP app.
// Purpose: Answer initialize, tool, and prompt methods on a listener path.
// Dependencies: crate::{rpc, tools}, axum
// ============================================================================

//! ## Overview
//! The service owns the tool registry and prompt list for one configured MCP
//! app. It is transport-agnostic above the byte level: the serving runtime
//! hands it a request body and maps the returned status and envelope onto
//! HTTP. Tool-level failures are not JSON-RPC errors; they come back as
//! results with `isError` set and the `{"error": <msg>}` text content.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::rpc::CODE_INVALID_PARAMS;
use crate::rpc::CODE_INVALID_REQUEST;
use crate::rpc::CODE_METHOD_NOT_FOUND;
use crate::rpc::CODE_SERIALIZATION;
use crate::rpc::JsonRpcRequest;
use crate::rpc::JsonRpcResponse;
use crate::tools::McpError;
use crate::tools::ToolOutcome;
use crate::tools::ToolRegistry;
use crate::tools::ToolSpec;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// MCP protocol revision advertised during initialize.
const PROTOCOL_VERSION: &str = "2024-11-05";

// ============================================================================
// SECTION: Service Types
// ============================================================================

/// Server identity advertised during initialize.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

/// Prompt registered on the service.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    /// Prompt name, unique within the service.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Prompt template text.
    pub template: String,
}

/// MCP service for one configured app.
pub struct McpService {
    /// Server identity.
    info: ServerInfo,
    /// Registered tools.
    tools: ToolRegistry,
    /// Registered prompts.
    prompts: Vec<PromptSpec>,
}

// ============================================================================
// SECTION: Wire Payloads
// ============================================================================

/// Tool call parameters for `tools/call`.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Raw JSON arguments.
    #[serde(default)]
    arguments: Value,
}

/// Prompt fetch parameters for `prompts/get`.
#[derive(Debug, Deserialize)]
struct PromptGetParams {
    /// Prompt name.
    name: String,
}

/// Tool output payloads for JSON-RPC responses.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ToolContent {
    /// JSON tool output.
    Json {
        /// JSON payload.
        json: Value,
    },
    /// Text tool output.
    Text {
        /// Text payload.
        text: String,
    },
}

/// Tool call response payload.
#[derive(Debug, Serialize)]
struct ToolCallResult {
    /// Tool output content.
    content: Vec<ToolContent>,
    /// Whether the call failed at the tool level.
    #[serde(rename = "isError")]
    is_error: bool,
}

// ============================================================================
// SECTION: Service Implementation
// ============================================================================

impl McpService {
    /// Builds a service, compiling every tool input schema.
    ///
    /// # Errors
    ///
    /// Returns [`McpError`] on duplicate tool names or invalid schemas.
    pub fn new(
        info: ServerInfo,
        tools: Vec<ToolSpec>,
        prompts: Vec<PromptSpec>,
    ) -> Result<Self, McpError> {
        Ok(Self {
            info,
            tools: ToolRegistry::build(tools)?,
            prompts,
        })
    }

    /// Returns the advertised server identity.
    #[must_use]
    pub const fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Handles one JSON-RPC request body.
    pub async fn handle(&self, body: &[u8]) -> (StatusCode, JsonRpcResponse) {
        let request: JsonRpcRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    JsonRpcResponse::error(
                        Value::Null,
                        CODE_INVALID_REQUEST,
                        "invalid json-rpc request".to_string(),
                    ),
                );
            }
        };
        if request.jsonrpc != "2.0" {
            return (
                StatusCode::BAD_REQUEST,
                JsonRpcResponse::error(
                    request.id,
                    CODE_INVALID_REQUEST,
                    "invalid json-rpc version".to_string(),
                ),
            );
        }
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            "prompts/list" => self.handle_prompts_list(request.id),
            "prompts/get" => self.handle_prompts_get(request.id, request.params),
            _ => (
                StatusCode::BAD_REQUEST,
                JsonRpcResponse::error(
                    request.id,
                    CODE_METHOD_NOT_FOUND,
                    "method not found".to_string(),
                ),
            ),
        }
    }

    /// Handles `initialize`.
    fn handle_initialize(&self, id: Value) -> (StatusCode, JsonRpcResponse) {
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "prompts": {},
            },
            "serverInfo": self.info,
        });
        (StatusCode::OK, JsonRpcResponse::result(id, result))
    }

    /// Handles `tools/list`.
    fn handle_tools_list(&self, id: Value) -> (StatusCode, JsonRpcResponse) {
        let result = json!({ "tools": self.tools.definitions() });
        (StatusCode::OK, JsonRpcResponse::result(id, result))
    }

    /// Handles `tools/call`.
    async fn handle_tools_call(
        &self,
        id: Value,
        params: Option<Value>,
    ) -> (StatusCode, JsonRpcResponse) {
        let params = params.unwrap_or(Value::Null);
        let call: ToolCallParams = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    JsonRpcResponse::error(
                        id,
                        CODE_INVALID_PARAMS,
                        "invalid tool params".to_string(),
                    ),
                );
            }
        };
        let Some(entry) = self.tools.entry(&call.name) else {
            return (
                StatusCode::BAD_REQUEST,
                JsonRpcResponse::error(
                    id,
                    CODE_METHOD_NOT_FOUND,
                    format!("unknown tool {:?}", call.name),
                ),
            );
        };
        if let Err(message) = entry.validate_args(&call.arguments) {
            return (
                StatusCode::BAD_REQUEST,
                JsonRpcResponse::error(id, CODE_INVALID_PARAMS, message),
            );
        }
        let outcome = entry.call(call.arguments).await;
        let result = match outcome {
            ToolOutcome::Value(Value::String(text)) => ToolCallResult {
                content: vec![ToolContent::Text {
                    text,
                }],
                is_error: false,
            },
            ToolOutcome::Value(value) => ToolCallResult {
                content: vec![ToolContent::Json {
                    json: value,
                }],
                is_error: false,
            },
            ToolOutcome::Error(message) => ToolCallResult {
                content: vec![ToolContent::Text {
                    text: json!({ "error": message }).to_string(),
                }],
                is_error: true,
            },
        };
        match serde_json::to_value(result) {
            Ok(result) => (StatusCode::OK, JsonRpcResponse::result(id, result)),
            Err(_) => serialization_failure(id),
        }
    }

    /// Handles `prompts/list`.
    fn handle_prompts_list(&self, id: Value) -> (StatusCode, JsonRpcResponse) {
        let prompts: Vec<Value> = self
            .prompts
            .iter()
            .map(|prompt| {
                json!({
                    "name": prompt.name,
                    "description": prompt.description,
                })
            })
            .collect();
        (StatusCode::OK, JsonRpcResponse::result(id, json!({ "prompts": prompts })))
    }

    /// Handles `prompts/get`.
    fn handle_prompts_get(&self, id: Value, params: Option<Value>) -> (StatusCode, JsonRpcResponse) {
        let params = params.unwrap_or(Value::Null);
        let get: PromptGetParams = match serde_json::from_value(params) {
            Ok(get) => get,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    JsonRpcResponse::error(
                        id,
                        CODE_INVALID_PARAMS,
                        "invalid prompt params".to_string(),
                    ),
                );
            }
        };
        let Some(prompt) = self.prompts.iter().find(|prompt| prompt.name == get.name) else {
            return (
                StatusCode::BAD_REQUEST,
                JsonRpcResponse::error(
                    id,
                    CODE_INVALID_PARAMS,
                    format!("unknown prompt {:?}", get.name),
                ),
            );
        };
        let result = json!({
            "description": prompt.description,
            "messages": [{
                "role": "user",
                "content": { "type": "text", "text": prompt.template },
            }],
        });
        (StatusCode::OK, JsonRpcResponse::result(id, result))
    }
}

/// Builds the serialization-failure error response.
fn serialization_failure(id: Value) -> (StatusCode, JsonRpcResponse) {
    (
        StatusCode::OK,
        JsonRpcResponse::error(id, CODE_SERIALIZATION, "serialization failed".to_string()),
    )
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
