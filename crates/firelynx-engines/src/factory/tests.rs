// crates/firelynx-engines/src/factory/tests.rs
// ============================================================================
// Module: Factory Unit Tests
// Description: Unit tests for the dialect registry and factory.
// Purpose: Validate compile-time wiring and failure modes.
// Dependencies: firelynx-engines, serde_json
// ============================================================================

//! ## Overview
//! Exercises registry lookups and the factory's source-then-engine flow.

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

use firelynx_core::EvalInput;
use firelynx_core::EvaluatorSource;
use serde_json::json;

use super::*;
use crate::harness::StaticEngine;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn spec(dialect: Dialect, code: &str) -> EvaluatorSpec {
    EvaluatorSpec {
        dialect,
        source: EvaluatorSource::Code(code.to_string()),
        timeout: None,
        entrypoint: None,
    }
}

fn registry_with(dialect: Dialect) -> Arc<EngineRegistry> {
    let mut registry = EngineRegistry::new();
    registry.register(dialect, Arc::new(StaticEngine::new(json!({"ok": true}))));
    Arc::new(registry)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn factory_compiles_through_registered_engine() {
    let factory = EvaluatorFactory::new(registry_with(Dialect::Risor));
    let compiled = factory.compile(&spec(Dialect::Risor, "whatever")).expect("compiles");
    let input = EvalInput {
        context: json!({}),
        deadline: None,
    };
    assert_eq!(compiled.evaluate(&input).expect("evaluates"), json!({"ok": true}));
}

#[test]
fn unknown_dialect_is_rejected() {
    let factory = EvaluatorFactory::new(registry_with(Dialect::Risor));
    let result = factory.compile(&spec(Dialect::Starlark, "x = 1"));
    assert!(matches!(result, Err(CompileError::UnknownDialect(Dialect::Starlark))));
}

#[test]
fn empty_source_fails_before_the_engine() {
    let factory = EvaluatorFactory::new(registry_with(Dialect::Risor));
    let result = factory.compile(&spec(Dialect::Risor, ""));
    assert!(matches!(result, Err(CompileError::Source(_))));
}

#[test]
fn registry_reports_registered_dialects() {
    let mut registry = EngineRegistry::new();
    registry.register(Dialect::Starlark, Arc::new(StaticEngine::new(json!(1))));
    registry.register(Dialect::Risor, Arc::new(StaticEngine::new(json!(2))));
    assert_eq!(registry.dialects(), vec![Dialect::Risor, Dialect::Starlark]);
    assert!(registry.engine(Dialect::Extism).is_none());
}
