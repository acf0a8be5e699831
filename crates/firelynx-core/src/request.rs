// crates/firelynx-core/src/request.rs
// ============================================================================
// Module: Firelynx Request View
// Description: Structured view of an HTTP request for app execution.
// Purpose: Provide the `request` key of the per-request context map.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Apps never see raw socket types. The executor projects each HTTP request
//! into this serializable view: method, URL parts, headers as name → value
//! list, and a parsed JSON body when the content type is JSON. The view is
//! the stable surface scripts program against.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Request View
// ============================================================================

/// URL parts exposed to apps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlView {
    /// Request path.
    pub path: String,
    /// Raw query string without the leading `?`; empty when absent.
    pub raw_query: String,
}

/// Structured view of one HTTP request.
///
/// # Invariants
/// - `headers` preserves every value of repeated header names in order.
/// - `body` is `Some` only when the content type is JSON and the payload
///   parsed; malformed JSON leaves `body` as `None` rather than failing the
///   request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestView {
    /// HTTP method, uppercase.
    pub method: String,
    /// URL parts.
    pub url: UrlView,
    /// Header name to ordered value list.
    pub headers: BTreeMap<String, Vec<String>>,
    /// Parsed JSON body for JSON content types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl RequestView {
    /// Serializes the view into the JSON value placed under `request`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
