// crates/firelynx-core/src/lib.rs
// ============================================================================
// Module: Firelynx Core Library
// Description: Public API surface for the firelynx dispatch-plane core.
// Purpose: Expose shared identifiers, data, and contract types.
// Dependencies: crate::{app, data, evaluator, id, request, response}
// ============================================================================

//! ## Overview
//! Firelynx core defines the contract surfaces shared by the configuration
//! model, the evaluator factory, and the serving runtime: strongly typed
//! identifiers, static data with merge semantics, the script evaluator
//! contract, the application contract, and the request/response views used
//! when marshaling evaluator output to HTTP.
//!
//! The crate is deliberately runtime-agnostic: it contains no sockets, no
//! engines, and no configuration parsing. Those concerns integrate through
//! the traits defined here.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod app;
pub mod data;
pub mod evaluator;
pub mod id;
pub mod request;
pub mod response;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use app::App;
pub use app::AppError;
pub use app::AppRequest;
pub use data::MergeMode;
pub use data::StaticData;
pub use data::merge_static_data;
pub use evaluator::CompileError;
pub use evaluator::CompiledEvaluator;
pub use evaluator::Dialect;
pub use evaluator::EvalError;
pub use evaluator::EvalInput;
pub use evaluator::EvaluatorSource;
pub use evaluator::EvaluatorSpec;
pub use evaluator::ScriptEngine;
pub use id::AppId;
pub use id::EndpointId;
pub use id::ListenerId;
pub use request::RequestView;
pub use request::UrlView;
pub use response::AppResponse;
pub use response::ResponseBody;
pub use response::marshal_value;
