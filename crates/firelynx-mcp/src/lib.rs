// crates/firelynx-mcp/src/lib.rs
// ============================================================================
// Module: Firelynx MCP Library
// Description: MCP app surface over JSON-RPC 2.0.
// Purpose: Expose configured tools and prompts on a listener path.
// Dependencies: firelynx-core, firelynx-engines, jsonschema, serde_json
// ============================================================================

//! ## Overview
//! `firelynx-mcp` implements the MCP app surface: a JSON-RPC 2.0 service
//! answering `initialize`, `tools/list`, `tools/call`, `prompts/list`, and
//! `prompts/get` on the HTTP path its route is mounted at. Tool handlers are
//! built-in or script-backed through the evaluator machinery; tool arguments
//! are validated against the configured JSON schema before dispatch, and
//! handler errors surface as MCP tool errors (`is_error` plus a single text
//! content encoding `{"error": <msg>}`).

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod rpc;
pub mod service;
pub mod tools;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use rpc::JsonRpcError;
pub use rpc::JsonRpcRequest;
pub use rpc::JsonRpcResponse;
pub use service::McpService;
pub use service::PromptSpec;
pub use service::ServerInfo;
pub use tools::BuiltinTool;
pub use tools::McpError;
pub use tools::ScriptTool;
pub use tools::ToolHandler;
pub use tools::ToolSpec;
