// crates/firelynx-mcp/src/service/tests.rs
// ============================================================================
// Module: MCP Service Unit Tests
// Description: Unit tests for JSON-RPC method dispatch.
// Purpose: Validate envelopes for every supported method.
// Dependencies: firelynx-mcp, firelynx-engines, serde_json
// ============================================================================

//! ## Overview
//! Exercises the service against raw request bodies and asserts on the
//! serialized response envelopes.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use firelynx_core::Dialect;
use firelynx_core::EvaluatorSource;
use firelynx_core::EvaluatorSpec;
use firelynx_core::ScriptEngine;
use firelynx_core::StaticData;
use firelynx_engines::FnEngine;
use std::time::Duration;

use super::*;
use crate::tools::BuiltinTool;
use crate::tools::ScriptTool;
use crate::tools::ToolHandler;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn sample_service() -> McpService {
    let engine = FnEngine::new(|input| Ok(json!({"got": input.context["args"]})));
    let spec = EvaluatorSpec {
        dialect: Dialect::Risor,
        source: EvaluatorSource::Code("tool".to_string()),
        timeout: Some(Duration::from_secs(1)),
        entrypoint: None,
    };
    let evaluator = engine.compile(b"tool", &spec).expect("compiles");
    McpService::new(
        ServerInfo {
            name: "firelynx-mcp".to_string(),
            version: "0.1.0".to_string(),
        },
        vec![
            ToolSpec {
                name: "echo".to_string(),
                description: "echoes arguments".to_string(),
                input_schema: None,
                output_schema: None,
                handler: ToolHandler::Builtin(BuiltinTool::Echo),
            },
            ToolSpec {
                name: "lookup".to_string(),
                description: "scripted lookup".to_string(),
                input_schema: Some(json!({
                    "type": "object",
                    "required": ["id"],
                    "properties": {"id": {"type": "integer"}},
                })),
                output_schema: None,
                handler: ToolHandler::Script(ScriptTool {
                    evaluator,
                    timeout: Some(Duration::from_secs(1)),
                    data: StaticData::new(),
                }),
            },
        ],
        vec![PromptSpec {
            name: "greeting".to_string(),
            description: "a greeting".to_string(),
            template: "Say hello".to_string(),
        }],
    )
    .expect("service builds")
}

async fn call(service: &McpService, body: Value) -> (StatusCode, Value) {
    let bytes = serde_json::to_vec(&body).expect("body bytes");
    let (status, response) = service.handle(&bytes).await;
    (status, serde_json::to_value(&response).expect("response value"))
}

// ============================================================================
// SECTION: Envelope Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn initialize_reports_server_info() {
    let service = sample_service();
    let (status, response) =
        call(&service, json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["result"]["serverInfo"]["name"], json!("firelynx-mcp"));
    assert_eq!(response["result"]["protocolVersion"], json!("2024-11-05"));
}

#[tokio::test(flavor = "multi_thread")]
async fn tools_list_advertises_definitions() {
    let service = sample_service();
    let (status, response) =
        call(&service, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
    assert_eq!(status, StatusCode::OK);
    let tools = response["result"]["tools"].as_array().expect("tools array");
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0]["name"], json!("echo"));
    assert_eq!(tools[1]["inputSchema"]["required"], json!(["id"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn tools_call_returns_json_content() {
    let service = sample_service();
    let (status, response) = call(
        &service,
        json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": {"name": "lookup", "arguments": {"id": 7}},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["result"]["isError"], json!(false));
    assert_eq!(response["result"]["content"][0]["type"], json!("json"));
    assert_eq!(response["result"]["content"][0]["json"]["got"]["id"], json!(7));
}

#[tokio::test(flavor = "multi_thread")]
async fn tools_call_validates_arguments() {
    let service = sample_service();
    let (status, response) = call(
        &service,
        json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": {"name": "lookup", "arguments": {}},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], json!(CODE_INVALID_PARAMS));
}

#[tokio::test(flavor = "multi_thread")]
async fn tool_error_sets_is_error_with_text_envelope() {
    let engine = FnEngine::new(|_| Ok(json!({"error": "denied"})));
    let spec = EvaluatorSpec {
        dialect: Dialect::Risor,
        source: EvaluatorSource::Code("tool".to_string()),
        timeout: None,
        entrypoint: None,
    };
    let evaluator = engine.compile(b"tool", &spec).expect("compiles");
    let service = McpService::new(
        ServerInfo {
            name: "s".to_string(),
            version: "1".to_string(),
        },
        vec![ToolSpec {
            name: "deny".to_string(),
            description: String::new(),
            input_schema: None,
            output_schema: None,
            handler: ToolHandler::Script(ScriptTool {
                evaluator,
                timeout: None,
                data: StaticData::new(),
            }),
        }],
        Vec::new(),
    )
    .expect("service builds");
    let (status, response) = call(
        &service,
        json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": {"name": "deny", "arguments": {}},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["result"]["isError"], json!(true));
    let text = response["result"]["content"][0]["text"].as_str().expect("text content");
    let envelope: Value = serde_json::from_str(text).expect("error envelope json");
    assert_eq!(envelope, json!({"error": "denied"}));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_tool_is_method_not_found() {
    let service = sample_service();
    let (status, response) = call(
        &service,
        json!({
            "jsonrpc": "2.0",
            "id": 6,
            "method": "tools/call",
            "params": {"name": "ghost", "arguments": {}},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], json!(CODE_METHOD_NOT_FOUND));
}

#[tokio::test(flavor = "multi_thread")]
async fn prompts_round_trip() {
    let service = sample_service();
    let (_, listed) =
        call(&service, json!({"jsonrpc": "2.0", "id": 7, "method": "prompts/list"})).await;
    assert_eq!(listed["result"]["prompts"][0]["name"], json!("greeting"));
    let (_, fetched) = call(
        &service,
        json!({
            "jsonrpc": "2.0",
            "id": 8,
            "method": "prompts/get",
            "params": {"name": "greeting"},
        }),
    )
    .await;
    assert_eq!(
        fetched["result"]["messages"][0]["content"]["text"],
        json!("Say hello")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_version_and_unknown_method_are_rejected() {
    let service = sample_service();
    let (status, response) =
        call(&service, json!({"jsonrpc": "1.0", "id": 9, "method": "tools/list"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], json!(CODE_INVALID_REQUEST));

    let (status, response) =
        call(&service, json!({"jsonrpc": "2.0", "id": 10, "method": "resources/list"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], json!(CODE_METHOD_NOT_FOUND));
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_body_is_invalid_request() {
    let service = sample_service();
    let (status, response) = service.handle(b"not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let value = serde_json::to_value(&response).expect("response value");
    assert_eq!(value["error"]["code"], json!(CODE_INVALID_REQUEST));
}
