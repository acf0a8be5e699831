// crates/firelynx-server/src/middleware.rs
// ============================================================================
// Module: Middleware Chain
// Description: Ordered per-endpoint request/response wrappers.
// Purpose: Compose header mutations and logging around the app handler.
// Dependencies: crate::{executor, logger}, firelynx-config
// ============================================================================

//! ## Overview
//! Middlewares run outside-in on the request and inside-out on the response:
//! the chain iterates forward through [`MiddlewareChain::before`] and in
//! reverse through [`MiddlewareChain::after`]. Header mutations apply `set`
//! before `add` for the same name within a phase; `remove` drops every value.
//! The console logger measures wall-clock duration from its own position in
//! the chain, so an outer logger observes inner middleware cost.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use firelynx_config::HeaderMutations;
use firelynx_config::HeadersMiddlewareConfig;

use crate::executor::RequestState;
use crate::executor::ResponseState;
use crate::logger::ConsoleLogger;

// ============================================================================
// SECTION: Middleware Units
// ============================================================================

/// Headers middleware applying configured mutations per phase.
#[derive(Clone, Debug)]
pub struct HeadersMiddleware {
    /// Request- and response-phase mutations.
    config: HeadersMiddlewareConfig,
}

impl HeadersMiddleware {
    /// Creates a headers middleware from configuration.
    #[must_use]
    pub const fn new(config: HeadersMiddlewareConfig) -> Self {
        Self {
            config,
        }
    }

    /// Applies request-phase mutations.
    fn on_request(&self, request: &mut RequestState) {
        apply_mutations(&self.config.request, &mut request.headers);
    }

    /// Applies response-phase mutations.
    fn on_response(&self, response: &mut ResponseState) {
        apply_mutations(&self.config.response, &mut response.headers);
    }
}

/// Applies one phase of header mutations to a header map.
///
/// Order within the phase: `remove`, then `set`, then `add`, so `set` and
/// `add` on the same name compose as `{set_value, add_value}`.
fn apply_mutations(
    mutations: &HeaderMutations,
    headers: &mut std::collections::BTreeMap<String, Vec<String>>,
) {
    for name in &mutations.remove {
        headers.remove(&name.to_ascii_lowercase());
    }
    for (name, value) in &mutations.set {
        headers.insert(name.to_ascii_lowercase(), vec![value.clone()]);
    }
    for (name, value) in &mutations.add {
        headers.entry(name.to_ascii_lowercase()).or_default().push(value.clone());
    }
}

/// Middleware dispatch target.
#[derive(Clone, Debug)]
pub enum MiddlewareUnit {
    /// Header mutations.
    Headers(HeadersMiddleware),
    /// Structured per-request logging.
    Logger(ConsoleLogger),
}

/// Named middleware entry in a chain.
#[derive(Clone, Debug)]
pub struct MiddlewareEntry {
    /// Middleware identifier from configuration.
    pub id: String,
    /// Dispatch target.
    pub unit: MiddlewareUnit,
}

// ============================================================================
// SECTION: Chain
// ============================================================================

/// Per-request scratch carried from the request to the response phase.
///
/// # Invariants
/// - `started` is indexed by chain position; only loggers record a start.
#[derive(Debug)]
pub struct RequestScope {
    /// Request-phase entry instants per middleware position.
    started: Vec<Option<Instant>>,
}

/// Ordered middleware chain for one endpoint.
#[derive(Clone, Default, Debug)]
pub struct MiddlewareChain {
    /// Entries in configured order.
    entries: Vec<MiddlewareEntry>,
}

impl MiddlewareChain {
    /// Builds a chain over the given entries, preserving configured order.
    #[must_use]
    pub fn new(entries: Vec<MiddlewareEntry>) -> Self {
        Self {
            entries,
        }
    }

    /// Runs the request phase in configured order.
    #[must_use]
    pub fn before(&self, request: &mut RequestState) -> RequestScope {
        let mut started = vec![None; self.entries.len()];
        for (index, entry) in self.entries.iter().enumerate() {
            match &entry.unit {
                MiddlewareUnit::Headers(headers) => headers.on_request(request),
                MiddlewareUnit::Logger(_) => {
                    started[index] = Some(Instant::now());
                }
            }
        }
        RequestScope {
            started,
        }
    }

    /// Runs the response phase in reverse order.
    pub fn after(&self, scope: &RequestScope, request: &RequestState, response: &mut ResponseState) {
        for (index, entry) in self.entries.iter().enumerate().rev() {
            match &entry.unit {
                MiddlewareUnit::Headers(headers) => headers.on_response(response),
                MiddlewareUnit::Logger(logger) => {
                    let duration = scope
                        .started
                        .get(index)
                        .copied()
                        .flatten()
                        .map_or_else(Default::default, |started| started.elapsed());
                    logger.record(request, response, duration);
                }
            }
        }
    }

    /// Returns the number of configured middlewares.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
