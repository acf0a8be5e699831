// crates/firelynx-mcp/src/rpc.rs
// ============================================================================
// Module: MCP JSON-RPC Envelope
// Description: JSON-RPC 2.0 request and response payloads.
// Purpose: Frame MCP traffic with stable error codes.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The envelope types mirror JSON-RPC 2.0: requests carry a version tag, an
//! id, a method, and optional params; responses carry exactly one of a
//! result or an error. Error codes follow the JSON-RPC reserved range with
//! server-defined codes for internal and serialization failures.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Error Codes
// ============================================================================

/// Invalid JSON-RPC envelope or version.
pub const CODE_INVALID_REQUEST: i64 = -32600;
/// Unknown method or tool.
pub const CODE_METHOD_NOT_FOUND: i64 = -32601;
/// Invalid method or tool parameters.
pub const CODE_INVALID_PARAMS: i64 = -32602;
/// Internal server failure.
pub const CODE_INTERNAL: i64 = -32050;
/// Response serialization failure.
pub const CODE_SERIALIZATION: i64 = -32060;

// ============================================================================
// SECTION: Envelope Types
// ============================================================================

/// Incoming JSON-RPC request payload.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    pub jsonrpc: String,
    /// Request identifier.
    #[serde(default)]
    pub id: Value,
    /// Method name.
    pub method: String,
    /// Optional parameters payload.
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    pub jsonrpc: &'static str,
    /// Request identifier.
    pub id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Builds a success response.
    #[must_use]
    pub const fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Builds an error response.
    #[must_use]
    pub const fn error(id: Value, code: i64, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
            }),
        }
    }
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Human-readable error message.
    pub message: String,
}
