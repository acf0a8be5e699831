// crates/firelynx-server/src/lib.rs
// ============================================================================
// Module: Firelynx Server Library
// Description: Runtime dispatch plane for the firelynx HTTP front door.
// Purpose: Expose the transaction, listener, and supervision surfaces.
// Dependencies: crate::{apps, executor, listener, logger, middleware,
// registry, router, supervisor, topology, transaction}
// ============================================================================

//! ## Overview
//! `firelynx-server` is the runtime dispatch plane: transactional topology
//! replacement, the listener lifecycle with graceful drain, per-request
//! routing and middleware, app execution with timeout-bounded script
//! evaluation, and the top-level supervisor. The serving topology is an
//! immutable snapshot published through watch channels; a request finishes
//! end to end on the snapshot it loaded at entry.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod apps;
pub mod executor;
pub mod listener;
pub mod logger;
pub mod middleware;
pub mod registry;
pub mod router;
pub mod supervisor;
pub mod topology;
pub mod transaction;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use apps::CompositeApp;
pub use apps::EchoApp;
pub use apps::McpApp;
pub use apps::RequestEchoApp;
pub use apps::ScriptApp;
pub use executor::ListenerState;
pub use executor::RequestState;
pub use executor::ResponseState;
pub use listener::ListenerError;
pub use listener::ListenerManager;
pub use listener::ServerError;
pub use listener::UnitState;
pub use logger::ConsoleLogger;
pub use logger::LogSink;
pub use middleware::HeadersMiddleware;
pub use middleware::MiddlewareChain;
pub use middleware::MiddlewareEntry;
pub use middleware::MiddlewareUnit;
pub use registry::AppRegistry;
pub use registry::RegistryError;
pub use router::CompiledRoute;
pub use router::EndpointRouter;
pub use supervisor::Supervisor;
pub use supervisor::SupervisorError;
pub use topology::EndpointStack;
pub use topology::EndpointUnit;
pub use topology::ListenerSpec;
pub use topology::Topology;
pub use topology::TopologyError;
pub use transaction::Transaction;
pub use transaction::TransactionError;
pub use transaction::TransactionManager;
pub use transaction::TransactionSource;
pub use transaction::TransactionState;
