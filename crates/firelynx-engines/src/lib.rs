// crates/firelynx-engines/src/lib.rs
// ============================================================================
// Module: Firelynx Engines Library
// Description: Evaluator factory, source resolution, and harness engines.
// Purpose: Compile evaluator specs into reusable compiled evaluators.
// Dependencies: firelynx-core, reqwest, url
// ============================================================================

//! ## Overview
//! `firelynx-engines` turns evaluator specs into compiled evaluators: it
//! resolves the script source (inline text, a file path, or an HTTP resource
//! with strict size limits), then hands the bytes to the engine registered
//! for the dialect. Concrete production engines are external collaborators
//! registered at embed time; the crate ships closure- and constant-backed
//! harness engines so the full pipeline is exercisable without a real
//! interpreter, and a deadline-aware evaluation helper used by the request
//! path.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod exec;
pub mod factory;
pub mod harness;
pub mod source;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use exec::evaluate_with_deadline;
pub use factory::EngineRegistry;
pub use factory::EvaluatorFactory;
pub use harness::FnEngine;
pub use harness::StaticEngine;
pub use source::resolve_source;
