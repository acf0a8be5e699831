// crates/firelynx-server/src/apps/tests.rs
// ============================================================================
// Module: App Implementation Unit Tests
// Description: Unit tests for echo, script, composite, and MCP apps.
// Purpose: Validate data merging, chaining, and response contracts.
// Dependencies: firelynx-server, firelynx-engines, firelynx-mcp, serde_json
// ============================================================================

//! ## Overview
//! Exercises each app kind with harness evaluators: static-data precedence,
//! composite chaining through `previous`, timeout isolation, and the MCP
//! bridge.

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
use firelynx_core::EvalError;
use firelynx_core::EvaluatorSource;
use firelynx_core::EvaluatorSpec;
use firelynx_core::RequestView;
use firelynx_core::ResponseBody;
use firelynx_core::ScriptEngine;
use firelynx_engines::FnEngine;
use serde_json::json;

use super::*;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn compiled(engine: &FnEngine) -> Arc<dyn CompiledEvaluator> {
    let spec = EvaluatorSpec {
        dialect: Dialect::Risor,
        source: EvaluatorSource::Code("script".to_string()),
        timeout: None,
        entrypoint: None,
    };
    engine.compile(b"script", &spec).expect("compiles")
}

fn data(pairs: &[(&str, Value)]) -> StaticData {
    pairs.iter().map(|(key, value)| ((*key).to_string(), value.clone())).collect()
}

fn request_with_overlay(overlay: StaticData) -> AppRequest {
    AppRequest {
        data: overlay,
        view: RequestView {
            method: "GET".to_string(),
            ..RequestView::default()
        },
        previous: None,
    }
}

// ============================================================================
// SECTION: Echo Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn echo_app_returns_its_response_as_text() {
    let app = EchoApp::new("Hello, World!");
    let response = app.handle(request_with_overlay(StaticData::new())).await.expect("handles");
    assert_eq!(response.status, 200);
    assert_eq!(response.content_type.as_deref(), Some("text/plain"));
    assert_eq!(response.body, ResponseBody::Text("Hello, World!".to_string()));
}

#[tokio::test(flavor = "multi_thread")]
async fn request_echo_app_reflects_the_context() {
    let app = RequestEchoApp;
    let response = app
        .handle(request_with_overlay(data(&[("tier", json!("edge"))])))
        .await
        .expect("handles");
    let ResponseBody::Json(value) = response.body else {
        panic!("expected json body");
    };
    assert_eq!(value["data"]["tier"], json!("edge"));
    assert_eq!(value["request"]["method"], json!("GET"));
}

// ============================================================================
// SECTION: Script Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn script_app_merges_route_data_over_app_data() {
    let engine = FnEngine::new(|input| Ok(input.context["data"].clone()));
    let app = ScriptApp::new(
        compiled(&engine),
        data(&[("service", json!("app")), ("region", json!("eu"))]),
        MergeMode::Last,
        None,
    );
    let response = app
        .handle(request_with_overlay(data(&[("service", json!("route"))])))
        .await
        .expect("handles");
    let ResponseBody::Json(value) = response.body else {
        panic!("expected json body");
    };
    assert_eq!(value["service"], json!("route"));
    assert_eq!(value["region"], json!("eu"));
}

#[tokio::test(flavor = "multi_thread")]
async fn script_timeout_surfaces_as_evaluation_error() {
    let engine = FnEngine::new(|_| {
        std::thread::sleep(Duration::from_millis(200));
        Ok(json!("late"))
    });
    let app = ScriptApp::new(
        compiled(&engine),
        StaticData::new(),
        MergeMode::Last,
        Some(Duration::from_millis(1)),
    );
    let result = app.handle(request_with_overlay(StaticData::new())).await;
    assert!(matches!(result, Err(AppError::Evaluation(EvalError::Timeout))));
}

#[tokio::test(flavor = "multi_thread")]
async fn script_error_mapping_marshals_to_500() {
    let engine = FnEngine::new(|_| Ok(json!({"error": "denied"})));
    let app = ScriptApp::new(compiled(&engine), StaticData::new(), MergeMode::Last, None);
    let response = app.handle(request_with_overlay(StaticData::new())).await.expect("handles");
    assert_eq!(response.status, 500);
    assert!(response.is_error);
}

// ============================================================================
// SECTION: Composite Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn composite_threads_previous_between_members() {
    let first = FnEngine::new(|_| Ok(json!({"stage": 1})));
    let second = FnEngine::new(|input| {
        Ok(json!({
            "stage": 2,
            "saw": input.context["previous"]["stage"],
        }))
    });
    let members = vec![
        Arc::new(ScriptApp::new(compiled(&first), StaticData::new(), MergeMode::Last, None)),
        Arc::new(ScriptApp::new(compiled(&second), StaticData::new(), MergeMode::Last, None)),
    ];
    let app = CompositeApp::new(members, StaticData::new(), MergeMode::Last);
    let response = app.handle(request_with_overlay(StaticData::new())).await.expect("handles");
    let ResponseBody::Json(value) = response.body else {
        panic!("expected json body");
    };
    assert_eq!(value, json!({"stage": 2, "saw": 1}));
}

#[tokio::test(flavor = "multi_thread")]
async fn composite_stops_on_first_stage_error() {
    let first = FnEngine::new(|_| Err(EvalError::Execution("stage one failed".to_string())));
    let second = FnEngine::new(|_| Ok(json!("unreachable")));
    let members = vec![
        Arc::new(ScriptApp::new(compiled(&first), StaticData::new(), MergeMode::Last, None)),
        Arc::new(ScriptApp::new(compiled(&second), StaticData::new(), MergeMode::Last, None)),
    ];
    let app = CompositeApp::new(members, StaticData::new(), MergeMode::Last);
    let result = app.handle(request_with_overlay(StaticData::new())).await;
    assert!(matches!(result, Err(AppError::Evaluation(EvalError::Execution(_)))));
}

#[tokio::test(flavor = "multi_thread")]
async fn composite_base_beats_member_data_and_route_beats_base() {
    let engine = FnEngine::new(|input| Ok(input.context["data"].clone()));
    let member = Arc::new(ScriptApp::new(
        compiled(&engine),
        data(&[("layer", json!("member")), ("member_only", json!(true))]),
        MergeMode::Last,
        None,
    ));
    let app = CompositeApp::new(
        vec![member],
        data(&[("layer", json!("composite")), ("base_only", json!(true))]),
        MergeMode::Last,
    );
    let response = app
        .handle(request_with_overlay(data(&[("layer", json!("route"))])))
        .await
        .expect("handles");
    let ResponseBody::Json(value) = response.body else {
        panic!("expected json body");
    };
    assert_eq!(value["layer"], json!("route"));
    assert_eq!(value["member_only"], json!(true));
    assert_eq!(value["base_only"], json!(true));
}

// ============================================================================
// SECTION: MCP Bridge Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn mcp_app_rejects_non_post_requests() {
    let service = firelynx_mcp::McpService::new(
        firelynx_mcp::ServerInfo {
            name: "s".to_string(),
            version: "1".to_string(),
        },
        Vec::new(),
        Vec::new(),
    )
    .expect("service builds");
    let app = McpApp::new(Arc::new(service));
    let response = app.handle(request_with_overlay(StaticData::new())).await.expect("handles");
    assert_eq!(response.status, 405);
}

#[tokio::test(flavor = "multi_thread")]
async fn mcp_app_bridges_json_rpc_bodies() {
    let service = firelynx_mcp::McpService::new(
        firelynx_mcp::ServerInfo {
            name: "bridge".to_string(),
            version: "1".to_string(),
        },
        Vec::new(),
        Vec::new(),
    )
    .expect("service builds");
    let app = McpApp::new(Arc::new(service));
    let request = AppRequest {
        data: StaticData::new(),
        view: RequestView {
            method: "POST".to_string(),
            body: Some(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"})),
            ..RequestView::default()
        },
        previous: None,
    };
    let response = app.handle(request).await.expect("handles");
    assert_eq!(response.status, 200);
    let ResponseBody::Json(value) = response.body else {
        panic!("expected json body");
    };
    assert_eq!(value["result"]["serverInfo"]["name"], json!("bridge"));
}
