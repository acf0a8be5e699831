// crates/firelynx-core/src/response.rs
// ============================================================================
// Module: Firelynx App Response
// Description: App response model and evaluator value marshaling.
// Purpose: Turn evaluator output values into HTTP response parts.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Every app produces an [`AppResponse`]; for script apps the response is
//! derived from the evaluator's returned value by a fixed top-to-bottom rule
//! set: an `error` mapping becomes a 500 JSON error, an explicit
//! `status_code`/`body`/`header` mapping is used verbatim, a plain string
//! becomes a raw body, and anything else is JSON-encoded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Response Model
// ============================================================================

/// Response body payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// No body.
    Empty,
    /// Raw text body.
    Text(String),
    /// Raw binary body.
    Binary(Vec<u8>),
    /// Structured body serialized as JSON.
    Json(Value),
}

impl ResponseBody {
    /// Renders the body into bytes for the wire.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Empty => Vec::new(),
            Self::Text(text) => text.into_bytes(),
            Self::Binary(bytes) => bytes,
            Self::Json(value) => serde_json::to_vec(&value).unwrap_or_default(),
        }
    }
}

/// HTTP response parts produced by an app.
///
/// # Invariants
/// - `is_error` marks evaluator-reported errors so middleware and loggers can
///   classify the outcome without re-parsing the body.
/// - `content_type` of `None` lets the transport pick the default for the
///   body kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppResponse {
    /// HTTP status code.
    pub status: u16,
    /// Content type override, when the app chose one.
    pub content_type: Option<String>,
    /// Additional response headers set by the app.
    pub headers: BTreeMap<String, String>,
    /// Response body.
    pub body: ResponseBody,
    /// Whether the response carries an evaluator-reported error.
    pub is_error: bool,
}

impl AppResponse {
    /// Builds a plain-text response.
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("text/plain".to_string()),
            headers: BTreeMap::new(),
            body: ResponseBody::Text(body.into()),
            is_error: false,
        }
    }

    /// Builds a JSON response.
    #[must_use]
    pub fn json(status: u16, value: Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            headers: BTreeMap::new(),
            body: ResponseBody::Json(value),
            is_error: false,
        }
    }

    /// Builds the canonical 500 error envelope `{"error": <message>}`.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        let mut response = Self::json(500, json!({ "error": message.into() }));
        response.is_error = true;
        response
    }
}

// ============================================================================
// SECTION: Marshaling
// ============================================================================

/// Marshals an evaluator output value into HTTP response parts.
///
/// Rules are applied top-to-bottom:
/// 1. A mapping with a string `error` field becomes a 500 JSON error.
/// 2. A mapping with any of `status_code`, `body`, or `header` is used
///    verbatim (status defaults to 200; a structured body is JSON).
/// 3. A string becomes a 200 response with the raw value as body.
/// 4. Anything else is JSON-encoded with status 200.
#[must_use]
pub fn marshal_value(value: Value) -> AppResponse {
    if let Value::Object(map) = &value {
        if let Some(Value::String(message)) = map.get("error") {
            return AppResponse::error(message.clone());
        }
        if map.contains_key("status_code") || map.contains_key("body") || map.contains_key("header")
        {
            return marshal_explicit(map);
        }
    }
    if let Value::String(text) = value {
        return AppResponse {
            status: 200,
            content_type: None,
            headers: BTreeMap::new(),
            body: ResponseBody::Text(text),
            is_error: false,
        };
    }
    AppResponse::json(200, value)
}

/// Marshals an explicit `status_code`/`body`/`header` mapping.
fn marshal_explicit(map: &serde_json::Map<String, Value>) -> AppResponse {
    let status = map
        .get("status_code")
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok())
        .unwrap_or(200);
    let mut headers = BTreeMap::new();
    if let Some(Value::Object(pairs)) = map.get("header") {
        for (name, value) in pairs {
            if let Value::String(text) = value {
                headers.insert(name.clone(), text.clone());
            }
        }
    }
    let (content_type, body) = match map.get("body") {
        None => (None, ResponseBody::Empty),
        Some(Value::String(text)) => (None, ResponseBody::Text(text.clone())),
        Some(structured) => {
            (Some("application/json".to_string()), ResponseBody::Json(structured.clone()))
        }
    };
    AppResponse {
        status,
        content_type,
        headers,
        body,
        is_error: false,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
