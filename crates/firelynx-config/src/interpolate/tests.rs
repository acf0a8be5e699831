// crates/firelynx-config/src/interpolate/tests.rs
// ============================================================================
// Module: Interpolation Unit Tests
// Description: Unit tests for the `${VAR}` scanner.
// Purpose: Validate expansion, defaults, and failure modes.
// Dependencies: firelynx-config
// ============================================================================

//! ## Overview
//! Exercises the scanner against a fixed lookup table so tests never touch
//! the process environment.

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

use super::*;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn lookup(name: &str) -> Option<String> {
    match name {
        "HOST" => Some("0.0.0.0".to_string()),
        "PORT" => Some("8080".to_string()),
        "EMPTY" => Some(String::new()),
        _ => None,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn plain_text_passes_through() {
    assert_eq!(interpolate_with("no variables here", lookup), Ok("no variables here".to_string()));
}

#[test]
fn variable_expands_from_lookup() {
    assert_eq!(interpolate_with("${HOST}:${PORT}", lookup), Ok("0.0.0.0:8080".to_string()));
}

#[test]
fn default_applies_when_variable_is_unset() {
    assert_eq!(interpolate_with("${MISSING:fallback}", lookup), Ok("fallback".to_string()));
}

#[test]
fn set_variable_wins_over_default() {
    assert_eq!(interpolate_with("${PORT:9999}", lookup), Ok("8080".to_string()));
}

#[test]
fn empty_default_is_allowed() {
    assert_eq!(interpolate_with("x${MISSING:}y", lookup), Ok("xy".to_string()));
}

#[test]
fn empty_value_expands_to_empty() {
    assert_eq!(interpolate_with("a${EMPTY}b", lookup), Ok("ab".to_string()));
}

#[test]
fn missing_variable_without_default_errors() {
    assert_eq!(
        interpolate_with("${MISSING}", lookup),
        Err(InterpolateError::Missing("MISSING".to_string()))
    );
}

#[test]
fn unterminated_expression_errors() {
    assert_eq!(interpolate_with("${HOST", lookup), Err(InterpolateError::Unterminated));
}

#[test]
fn empty_name_errors() {
    assert_eq!(interpolate_with("${}", lookup), Err(InterpolateError::EmptyName));
    assert_eq!(interpolate_with("${:default}", lookup), Err(InterpolateError::EmptyName));
}

#[test]
fn multiple_expressions_expand_in_order() {
    assert_eq!(
        interpolate_with("${HOST} then ${MISSING:x} then ${PORT}", lookup),
        Ok("0.0.0.0 then x then 8080".to_string())
    );
}
