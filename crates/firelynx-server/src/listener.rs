// crates/firelynx-server/src/listener.rs
// ============================================================================
// Module: Listener Manager
// Description: Bound-socket lifecycle: start, swap, drain, stop.
// Purpose: Install topologies without dropping in-flight connections.
// Dependencies: crate::{executor, topology}, axum, tokio
// ============================================================================

//! ## Overview
//! The manager owns one serving unit per listener id. Installing a topology
//! diffs by id: new addresses bind before anything is torn down (a bind
//! failure rolls the commit back with the running units untouched), removed
//! units drain within their configured window and are then aborted, and
//! retained units swap their endpoint-stack snapshot through a watch channel
//! with no socket churn. Accept-loop failures fan in over the error channel
//! so the supervisor can decide whether to shut down.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::executor::ListenerState;
use crate::executor::handle_request;
use crate::topology::EndpointStack;
use crate::topology::ListenerSpec;
use crate::topology::Topology;
use firelynx_core::ListenerId;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced while installing a topology.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// A listener could not acquire its address.
    #[error("listener {id} bind {address} failed: {message}")]
    Bind {
        /// Listener identifier.
        id: ListenerId,
        /// Address that failed to bind.
        address: String,
        /// Underlying I/O message.
        message: String,
    },
}

/// Fatal serving errors fanned in to the supervisor.
#[derive(Debug, Clone)]
pub enum ServerError {
    /// An accept loop died outside a drain.
    Accept {
        /// Listener identifier.
        id: ListenerId,
        /// Underlying error message.
        message: String,
    },
}

// ============================================================================
// SECTION: Serving Units
// ============================================================================

/// Lifecycle states of one serving unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    /// Created but not yet bound.
    NotStarted,
    /// Bound and accepting connections.
    Listening,
    /// No longer accepting; in-flight requests finishing.
    Draining,
    /// Socket released.
    Stopped,
}

/// One bound socket with its serving task.
struct ServingUnit {
    /// Bind parameters from the installed topology.
    spec: ListenerSpec,
    /// Actual bound address (resolves port 0).
    bound_addr: SocketAddr,
    /// Publisher side of the endpoint-stack snapshot.
    stack_tx: watch::Sender<Arc<EndpointStack>>,
    /// Graceful-shutdown trigger for the serving task.
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// Serving task handle.
    task: JoinHandle<()>,
    /// Lifecycle state.
    state: UnitState,
}

impl ServingUnit {
    /// Drains the unit: stop accepting, wait out the window, then abort.
    async fn drain(mut self) {
        self.state = UnitState::Draining;
        if let Some(shutdown) = self.shutdown_tx.take() {
            let _ = shutdown.send(());
        }
        let window = self.spec.drain_timeout;
        let id = self.spec.id.clone();
        match tokio::time::timeout(window, &mut self.task).await {
            Ok(_) => debug!(listener = %id, "listener drained"),
            Err(_) => {
                warn!(listener = %id, "drain window elapsed, aborting stragglers");
                self.task.abort();
            }
        }
        self.state = UnitState::Stopped;
    }
}

// ============================================================================
// SECTION: Listener Manager
// ============================================================================

/// Owner of every bound socket.
pub struct ListenerManager {
    /// Serving units by listener id.
    units: Mutex<BTreeMap<ListenerId, ServingUnit>>,
    /// Fan-in channel for accept-loop failures.
    errors: mpsc::UnboundedSender<ServerError>,
}

impl ListenerManager {
    /// Creates a manager reporting fatal errors on the given channel.
    #[must_use]
    pub fn new(errors: mpsc::UnboundedSender<ServerError>) -> Self {
        Self {
            units: Mutex::new(BTreeMap::new()),
            errors,
        }
    }

    /// Installs a topology: bind added, drain removed, swap retained.
    ///
    /// Added listeners bind before any teardown; on bind failure the units
    /// bound by this call are drained again and the running set is left as
    /// it was, failing the commit.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Bind`] when an added listener cannot bind.
    pub async fn install(&self, topology: &Topology) -> Result<(), ListenerError> {
        let mut units = self.units.lock().await;

        let mut to_add = Vec::new();
        let mut to_swap = Vec::new();
        for spec in &topology.listeners {
            match units.get(&spec.id) {
                Some(unit) if unit.spec.address == spec.address => to_swap.push(spec.clone()),
                // New id, or same id rebinding to a new address.
                _ => to_add.push(spec.clone()),
            }
        }
        let desired: std::collections::BTreeSet<&ListenerId> =
            topology.listeners.iter().map(|spec| &spec.id).collect();
        let to_remove: Vec<ListenerId> =
            units.keys().filter(|id| !desired.contains(id)).cloned().collect();

        // Phase 1: bind everything new before touching the running set.
        let mut added = Vec::new();
        for spec in to_add {
            let stack = topology.stack(&spec.id).unwrap_or_default();
            match self.start_unit(spec.clone(), stack).await {
                Ok(unit) => added.push(unit),
                Err(err) => {
                    for unit in added {
                        unit.drain().await;
                    }
                    return Err(err);
                }
            }
        }

        // Phase 2: drain removed ids and old sockets of rebinding ids.
        for id in to_remove {
            if let Some(unit) = units.remove(&id) {
                info!(listener = %id, "listener removed, draining");
                unit.drain().await;
            }
        }
        for unit in &added {
            if let Some(old) = units.remove(&unit.spec.id) {
                info!(listener = %old.spec.id, "listener rebinding, draining old socket");
                old.drain().await;
            }
        }

        // Phase 3: commit new units and swap retained stacks in place.
        for unit in added {
            info!(listener = %unit.spec.id, address = %unit.bound_addr, "listener started");
            units.insert(unit.spec.id.clone(), unit);
        }
        for spec in to_swap {
            if let Some(unit) = units.get_mut(&spec.id) {
                let stack = topology.stack(&spec.id).unwrap_or_default();
                let _ = unit.stack_tx.send(stack);
                unit.spec = spec;
                debug!(listener = %unit.spec.id, "endpoint stack swapped");
            }
        }
        Ok(())
    }

    /// Binds and starts serving one listener.
    async fn start_unit(
        &self,
        spec: ListenerSpec,
        stack: Arc<EndpointStack>,
    ) -> Result<ServingUnit, ListenerError> {
        let listener = TcpListener::bind(&spec.address).await.map_err(|err| {
            ListenerError::Bind {
                id: spec.id.clone(),
                address: spec.address.clone(),
                message: err.to_string(),
            }
        })?;
        let bound_addr = listener.local_addr().map_err(|err| ListenerError::Bind {
            id: spec.id.clone(),
            address: spec.address.clone(),
            message: err.to_string(),
        })?;
        let (stack_tx, stack_rx) = watch::channel(stack);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let state = ListenerState {
            stack: stack_rx,
        };
        let app = Router::new().fallback(handle_request).with_state(state);
        let service = app.into_make_service_with_connect_info::<SocketAddr>();
        let errors = self.errors.clone();
        let id = spec.id.clone();
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, service).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(err) = server.await {
                let _ = errors.send(ServerError::Accept {
                    id,
                    message: err.to_string(),
                });
            }
        });
        Ok(ServingUnit {
            spec,
            bound_addr,
            stack_tx,
            shutdown_tx: Some(shutdown_tx),
            task,
            state: UnitState::Listening,
        })
    }

    /// Drains every listener in parallel; used on shutdown.
    pub async fn shutdown_all(&self) {
        let mut units = self.units.lock().await;
        let draining: Vec<ServingUnit> =
            std::mem::take(&mut *units).into_values().collect();
        drop(units);
        let handles: Vec<JoinHandle<()>> =
            draining.into_iter().map(|unit| tokio::spawn(unit.drain())).collect();
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Returns the bound address per listener id.
    pub async fn addresses(&self) -> BTreeMap<ListenerId, SocketAddr> {
        let units = self.units.lock().await;
        units.iter().map(|(id, unit)| (id.clone(), unit.bound_addr)).collect()
    }

    /// Returns the lifecycle state of one listener, when present.
    pub async fn unit_state(&self, id: &ListenerId) -> Option<UnitState> {
        let units = self.units.lock().await;
        units.get(id).map(|unit| unit.state)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
