// crates/firelynx-config/src/interpolate.rs
// ============================================================================
// Module: Environment Interpolation
// Description: `${VAR}` / `${VAR:default}` expansion for config fields.
// Purpose: Resolve environment references on interpolatable fields only.
// Dependencies: std::env
// ============================================================================

//! ## Overview
//! Interpolation is a plain left-to-right scan: `${NAME}` resolves from the
//! process environment, `${NAME:default}` falls back to the default when the
//! variable is unset. A missing variable with no default is an error naming
//! the variable; the validation layer attaches the field path. Text outside
//! `${...}` passes through verbatim. The scanner is hand-rolled so the config
//! crate carries no pattern-matching dependency.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced while interpolating a config field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterpolateError {
    /// A referenced variable is unset and carries no default.
    #[error("environment variable {0} is not set and has no default")]
    Missing(String),
    /// A `${` opener has no closing brace.
    #[error("unterminated ${{...}} expression")]
    Unterminated,
    /// A `${}` expression names no variable.
    #[error("empty variable name in ${{...}} expression")]
    EmptyName,
}

// ============================================================================
// SECTION: Interpolation
// ============================================================================

/// Interpolates `${VAR}` and `${VAR:default}` from the process environment.
///
/// # Errors
///
/// Returns [`InterpolateError`] when a referenced variable is unset without a
/// default or the expression is malformed.
pub fn interpolate(input: &str) -> Result<String, InterpolateError> {
    interpolate_with(input, |name| env::var(name).ok())
}

/// Interpolates using a caller-supplied variable lookup.
///
/// # Errors
///
/// Returns [`InterpolateError`] when a referenced variable is unset without a
/// default or the expression is malformed.
pub fn interpolate_with(
    input: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, InterpolateError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find('}') else {
            return Err(InterpolateError::Unterminated);
        };
        let expression = &after_open[..end];
        let (name, default) = match expression.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (expression, None),
        };
        if name.is_empty() {
            return Err(InterpolateError::EmptyName);
        }
        match lookup(name) {
            Some(value) => output.push_str(&value),
            None => match default {
                Some(default) => output.push_str(default),
                None => return Err(InterpolateError::Missing(name.to_string())),
            },
        }
        rest = &after_open[end + 1..];
    }
    output.push_str(rest);
    Ok(output)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
