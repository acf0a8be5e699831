// crates/firelynx-server/src/executor.rs
// ============================================================================
// Module: Request Executor
// Description: Per-request pipeline from socket bytes to response parts.
// Purpose: Build the context map, invoke the app, marshal the result.
// Dependencies: crate::{middleware, router, topology}, axum, firelynx-core
// ============================================================================

//! ## Overview
//! The executor is the single axum handler behind every listener. It loads
//! the current endpoint-stack snapshot once per request (so a topology swap
//! never splits a request across generations), projects the HTTP request
//! into the structured view, runs the matched endpoint's middleware chain
//! around routing and app invocation, and converts the app's response parts
//! onto the wire. Evaluator failures are isolated to the request: timeouts
//! and execution errors become 500 JSON envelopes and the server keeps
//! serving.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::net::SocketAddr;

use axum::body::Body;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::Method;
use axum::http::Uri;
use axum::response::Response;
use firelynx_core::AppError;
use firelynx_core::AppRequest;
use firelynx_core::AppResponse;
use firelynx_core::EvalError;
use firelynx_core::RequestView;
use firelynx_core::ResponseBody;
use firelynx_core::UrlView;
use serde_json::Value;
use serde_json::json;
use tokio::sync::watch;
use tracing::error;

use crate::router::CompiledRoute;
use crate::topology::EndpointStack;
use crate::topology::EndpointUnit;

// ============================================================================
// SECTION: Request and Response State
// ============================================================================

/// Mutable request state flowing through the middleware chain.
///
/// # Invariants
/// - Header names are lowercased; values preserve arrival order.
#[derive(Debug, Clone, Default)]
pub struct RequestState {
    /// HTTP method, uppercase.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Raw query string without the leading `?`.
    pub raw_query: String,
    /// Header name to ordered value list, names lowercased.
    pub headers: BTreeMap<String, Vec<String>>,
    /// Client address, when the transport knows it.
    pub client_ip: Option<IpAddr>,
    /// Raw request body bytes.
    pub body: Vec<u8>,
}

impl RequestState {
    /// Projects the state into the view handed to apps.
    ///
    /// The body is parsed only for JSON content types; malformed JSON leaves
    /// the view's body unset rather than failing the request.
    #[must_use]
    pub fn to_view(&self) -> RequestView {
        let body = if self.has_json_content_type() && !self.body.is_empty() {
            serde_json::from_slice::<Value>(&self.body).ok()
        } else {
            None
        };
        RequestView {
            method: self.method.clone(),
            url: UrlView {
                path: self.path.clone(),
                raw_query: self.raw_query.clone(),
            },
            headers: self.headers.clone(),
            body,
        }
    }

    /// Returns true when the request advertises a JSON content type.
    fn has_json_content_type(&self) -> bool {
        self.headers
            .get("content-type")
            .and_then(|values| values.first())
            .is_some_and(|value| value.to_ascii_lowercase().contains("json"))
    }
}

/// Mutable response state flowing back through the middleware chain.
///
/// # Invariants
/// - Header names are lowercased; values preserve insertion order.
#[derive(Debug, Clone, Default)]
pub struct ResponseState {
    /// HTTP status code.
    pub status: u16,
    /// Header name to ordered value list, names lowercased.
    pub headers: BTreeMap<String, Vec<String>>,
    /// Response body bytes.
    pub body: Vec<u8>,
    /// Whether the response carries an evaluator-reported error.
    pub is_error: bool,
}

impl ResponseState {
    /// Builds the canonical 404 response for unmatched routes.
    #[must_use]
    pub fn not_found() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), vec!["text/plain".to_string()]);
        Self {
            status: 404,
            headers,
            body: b"not found".to_vec(),
            is_error: false,
        }
    }

    /// Converts app response parts into wire-ready state.
    #[must_use]
    pub fn from_app_response(response: AppResponse) -> Self {
        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in response.headers {
            headers.insert(name.to_ascii_lowercase(), vec![value]);
        }
        let content_type = response.content_type.clone().or_else(|| {
            match &response.body {
                ResponseBody::Json(_) => Some("application/json".to_string()),
                ResponseBody::Text(_) => Some("text/plain".to_string()),
                ResponseBody::Binary(_) | ResponseBody::Empty => None,
            }
        });
        if let Some(content_type) = content_type {
            headers.entry("content-type".to_string()).or_insert_with(|| vec![content_type]);
        }
        Self {
            status: response.status,
            headers,
            body: response.body.into_bytes(),
            is_error: response.is_error,
        }
    }
}

// ============================================================================
// SECTION: Listener Handler
// ============================================================================

/// Per-listener axum state: the watch side of the topology swap.
#[derive(Clone)]
pub struct ListenerState {
    /// Receiver of the current endpoint stack snapshot.
    pub stack: watch::Receiver<std::sync::Arc<EndpointStack>>,
}

/// Single axum handler serving every path on a listener.
pub async fn handle_request(
    State(state): State<ListenerState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // One snapshot load per request: the request finishes on this topology
    // even if a commit publishes a new one mid-flight.
    let stack = state.stack.borrow().clone();
    let request = build_request_state(&method, &uri, &headers, peer, &body);
    let response = stack.serve(request).await;
    into_axum_response(response)
}

/// Projects axum extractor output into the pipeline request state.
fn build_request_state(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    peer: SocketAddr,
    body: &Bytes,
) -> RequestState {
    let mut header_map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        if let Ok(text) = value.to_str() {
            header_map.entry(name.as_str().to_string()).or_default().push(text.to_string());
        }
    }
    RequestState {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        raw_query: uri.query().unwrap_or_default().to_string(),
        headers: header_map,
        client_ip: Some(peer.ip()),
        body: body.to_vec(),
    }
}

/// Renders pipeline response state as an axum response.
fn into_axum_response(state: ResponseState) -> Response {
    let mut builder = Response::builder().status(state.status);
    for (name, values) in &state.headers {
        for value in values {
            builder = builder.header(name.as_str(), value.as_str());
        }
    }
    builder.body(Body::from(state.body)).unwrap_or_else(|err| {
        error!(error = %err, "response assembly failed");
        Response::new(Body::from("internal error"))
    })
}

// ============================================================================
// SECTION: Endpoint Dispatch
// ============================================================================

impl EndpointStack {
    /// Serves one request against this stack snapshot.
    ///
    /// The endpoint is chosen by the first router match across endpoints in
    /// declared order; when nothing matches, the first endpoint still hosts
    /// the 404 so its middleware (and logger) observe the miss.
    pub async fn serve(&self, mut request: RequestState) -> ResponseState {
        let Some(endpoint) = self.select_endpoint(&request.path) else {
            return ResponseState::not_found();
        };
        let scope = endpoint.middlewares.before(&mut request);
        let mut response = match endpoint.router.match_path(&request.path) {
            Some(route) => dispatch_route(route, &request).await,
            None => ResponseState::not_found(),
        };
        endpoint.middlewares.after(&scope, &request, &mut response);
        response
    }

    /// Picks the endpoint handling a path: first router match, falling back
    /// to the first endpoint so misses still flow through a chain.
    fn select_endpoint(&self, path: &str) -> Option<&EndpointUnit> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.router.match_path(path).is_some())
            .or_else(|| self.endpoints.first())
    }
}

/// Invokes the matched route's app and marshals the outcome.
async fn dispatch_route(route: &CompiledRoute, request: &RequestState) -> ResponseState {
    let app_request = AppRequest {
        data: route.static_data.clone(),
        view: request.to_view(),
        previous: None,
    };
    match route.app.handle(app_request).await {
        Ok(response) => ResponseState::from_app_response(response),
        Err(AppError::Evaluation(EvalError::Timeout)) => {
            error!(app = %route.app_id, path = %request.path, "evaluation timed out");
            evaluation_failure("timeout")
        }
        Err(AppError::Evaluation(EvalError::Execution(message))) => {
            error!(app = %route.app_id, path = %request.path, error = %message, "evaluation failed");
            evaluation_failure(&message)
        }
        Err(AppError::Internal(message)) => {
            error!(app = %route.app_id, path = %request.path, error = %message, "app failed");
            evaluation_failure(&message)
        }
    }
}

/// Builds the 500 `{"error": <msg>}` response for evaluator failures.
fn evaluation_failure(message: &str) -> ResponseState {
    let mut state = ResponseState {
        status: 500,
        headers: BTreeMap::new(),
        body: serde_json::to_vec(&json!({ "error": message })).unwrap_or_default(),
        is_error: true,
    };
    state.headers.insert("content-type".to_string(), vec!["application/json".to_string()]);
    state
}

// ============================================================================
// SECTION: Tests
// ============================================================================
