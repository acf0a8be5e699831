// crates/firelynx-server/src/topology.rs
// ============================================================================
// Module: Serving Topology
// Description: Immutable snapshot of the full serving surface.
// Purpose: Build routers, middleware chains, and stacks per commit.
// Dependencies: crate::{logger, middleware, registry, router}, firelynx-config
// ============================================================================

//! ## Overview
//! A topology is everything a commit installs: listener specs and, per
//! listener, an endpoint stack holding routers and middleware chains with
//! app instances already resolved. Topologies are built fully off-band
//! during transaction prepare and published wholesale; request tasks hold
//! the `Arc` they loaded at entry, so a later commit never mutates what a
//! live request observes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use firelynx_config::Config;
use firelynx_config::MiddlewareKind;
use firelynx_config::RouteRule;
use firelynx_core::EndpointId;
use firelynx_core::ListenerId;
use thiserror::Error;

use crate::logger::ConsoleLogger;
use crate::middleware::HeadersMiddleware;
use crate::middleware::MiddlewareChain;
use crate::middleware::MiddlewareEntry;
use crate::middleware::MiddlewareUnit;
use crate::registry::AppRegistry;
use crate::registry::RegistryError;
use crate::router::CompiledRoute;
use crate::router::EndpointRouter;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced while building a topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// App registry construction failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A route referenced an app missing from the registry.
    #[error("route app {0} is not in the registry")]
    UnknownApp(String),
    /// A console logger sink could not be opened.
    #[error("logger {id} sink failed: {message}")]
    Logger {
        /// Middleware identifier.
        id: String,
        /// Underlying I/O message.
        message: String,
    },
}

// ============================================================================
// SECTION: Topology Types
// ============================================================================

/// Bind parameters for one listener.
///
/// # Invariants
/// - `address` is already interpolated and shape-checked by validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerSpec {
    /// Listener identifier.
    pub id: ListenerId,
    /// Bind address as `host:port`.
    pub address: String,
    /// Drain window on removal or shutdown.
    pub drain_timeout: Duration,
}

/// One endpoint's router and middleware chain.
#[derive(Clone, Debug)]
pub struct EndpointUnit {
    /// Endpoint identifier.
    pub id: EndpointId,
    /// Ordered route matcher.
    pub router: EndpointRouter,
    /// Ordered middleware chain.
    pub middlewares: MiddlewareChain,
}

/// All endpoints serving on one listener.
#[derive(Clone, Default, Debug)]
pub struct EndpointStack {
    /// Endpoints in declared order.
    pub endpoints: Vec<EndpointUnit>,
}

/// Immutable serving snapshot installed by a commit.
#[derive(Debug)]
pub struct Topology {
    /// Validated configuration this topology was built from.
    pub config: Arc<Config>,
    /// Listener bind parameters.
    pub listeners: Vec<ListenerSpec>,
    /// Endpoint stacks keyed by listener id.
    stacks: BTreeMap<ListenerId, Arc<EndpointStack>>,
}

impl Topology {
    /// Builds the full topology for a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError`] when evaluators fail to compile, an MCP
    /// service cannot be built, or a logger sink cannot be opened.
    pub fn build(
        config: Config,
        factory: &firelynx_engines::EvaluatorFactory,
    ) -> Result<Self, TopologyError> {
        let registry = AppRegistry::build(&config, factory)?;
        let mut listeners = Vec::with_capacity(config.listeners.len());
        let mut stacks = BTreeMap::new();
        for listener in &config.listeners {
            listeners.push(ListenerSpec {
                id: listener.id.clone(),
                address: listener.address.clone(),
                drain_timeout: listener.http.drain_timeout(),
            });
            let mut endpoints = Vec::new();
            for endpoint in config.endpoints_for_listener(&listener.id) {
                let mut routes = Vec::with_capacity(endpoint.routes.len());
                for route in &endpoint.routes {
                    let app = registry
                        .app(&route.app_id)
                        .ok_or_else(|| TopologyError::UnknownApp(route.app_id.to_string()))?;
                    let RouteRule::PathPrefix { value } = &route.rule;
                    routes.push(CompiledRoute {
                        app_id: route.app_id.clone(),
                        prefix: value.clone(),
                        static_data: route.static_data.clone(),
                        app,
                    });
                }
                let middlewares = build_chain(&endpoint.middlewares)?;
                endpoints.push(EndpointUnit {
                    id: endpoint.id.clone(),
                    router: EndpointRouter::new(routes),
                    middlewares,
                });
            }
            stacks.insert(listener.id.clone(), Arc::new(EndpointStack {
                endpoints,
            }));
        }
        Ok(Self {
            config: Arc::new(config),
            listeners,
            stacks,
        })
    }

    /// Returns the endpoint stack for a listener.
    #[must_use]
    pub fn stack(&self, id: &ListenerId) -> Option<Arc<EndpointStack>> {
        self.stacks.get(id).map(Arc::clone)
    }
}

/// Builds a middleware chain from configuration, opening logger sinks.
fn build_chain(
    middlewares: &[firelynx_config::Middleware],
) -> Result<MiddlewareChain, TopologyError> {
    let mut entries = Vec::with_capacity(middlewares.len());
    for middleware in middlewares {
        let unit = match &middleware.kind {
            MiddlewareKind::Headers(config) => {
                MiddlewareUnit::Headers(HeadersMiddleware::new(config.clone()))
            }
            MiddlewareKind::ConsoleLogger(config) => {
                let logger =
                    ConsoleLogger::from_config(config).map_err(|err| TopologyError::Logger {
                        id: middleware.id.clone(),
                        message: err.to_string(),
                    })?;
                MiddlewareUnit::Logger(logger)
            }
        };
        entries.push(MiddlewareEntry {
            id: middleware.id.clone(),
            unit,
        });
    }
    Ok(MiddlewareChain::new(entries))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
