// crates/firelynx-server/src/supervisor.rs
// ============================================================================
// Module: Supervisor
// Description: Top-level lifecycle, error fan-in, graceful shutdown.
// Purpose: Boot components in order and coordinate their teardown.
// Dependencies: crate::{listener, transaction}, firelynx-config, tokio
// ============================================================================

//! ## Overview
//! The supervisor wires the components in dependency order: engine registry,
//! transaction manager, listener manager. It applies the initial file
//! transaction at boot, accepts pushed replacements at runtime, and runs
//! until either the caller's shutdown signal fires or a fatal component
//! error (an accept loop dying outside a drain) arrives on the fan-in
//! channel. Shutdown drains every listener in parallel, each bounded by its
//! configured drain window.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use firelynx_config::Config;
use firelynx_config::ConfigError;
use firelynx_core::ListenerId;
use firelynx_engines::EngineRegistry;
use firelynx_engines::EvaluatorFactory;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tracing::error;
use tracing::info;

use crate::listener::ListenerManager;
use crate::listener::ServerError;
use crate::topology::Topology;
use crate::transaction::TransactionError;
use crate::transaction::TransactionManager;
use crate::transaction::TransactionSource;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced by the supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// Initial configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A transaction failed.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    /// A component died with an unrecoverable error.
    #[error("fatal component error: {0}")]
    Fatal(String),
}

// ============================================================================
// SECTION: Supervisor
// ============================================================================

/// Top-level owner of the serving runtime.
pub struct Supervisor {
    /// Transaction manager holding the current topology.
    manager: TransactionManager,
    /// Listener manager owning every bound socket.
    listeners: Arc<ListenerManager>,
    /// Receiver of fatal component errors.
    errors: Mutex<mpsc::UnboundedReceiver<ServerError>>,
}

impl Supervisor {
    /// Creates a supervisor over the given engine registry.
    #[must_use]
    pub fn new(engines: Arc<EngineRegistry>) -> Self {
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        let listeners = Arc::new(ListenerManager::new(errors_tx));
        let factory = EvaluatorFactory::new(engines);
        let manager = TransactionManager::new(factory, Arc::clone(&listeners));
        Self {
            manager,
            listeners,
            errors: Mutex::new(errors_rx),
        }
    }

    /// Boots from a configuration file: load, validate, prepare, commit.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError`] when loading fails or the initial
    /// transaction does not commit.
    pub async fn boot_from_file(&self, path: &Path) -> Result<Arc<Topology>, SupervisorError> {
        let config = Config::from_file(path)?;
        let source = TransactionSource::File(path.display().to_string());
        Ok(self.manager.apply(config, source).await?)
    }

    /// Applies a pushed configuration replacement at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError`]; the running topology is untouched on
    /// failure.
    pub async fn apply_config(&self, config: Config) -> Result<Arc<Topology>, TransactionError> {
        self.manager.apply(config, TransactionSource::Push).await
    }

    /// Returns the topology currently serving traffic.
    #[must_use]
    pub fn current_topology(&self) -> Option<Arc<Topology>> {
        self.manager.current()
    }

    /// Returns the bound address per listener id.
    pub async fn listener_addresses(&self) -> BTreeMap<ListenerId, SocketAddr> {
        self.listeners.addresses().await
    }

    /// Runs until the shutdown signal fires or a component dies.
    ///
    /// Either way every listener is drained before returning; the first
    /// fatal component error is returned to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Fatal`] when a component died.
    pub async fn run_until(
        &self,
        shutdown: impl Future<Output = ()> + Send,
    ) -> Result<(), SupervisorError> {
        let outcome = {
            let mut errors = self.errors.lock().await;
            tokio::select! {
                () = shutdown => Ok(()),
                failure = errors.recv() => match failure {
                    Some(ServerError::Accept { id, message }) => {
                        error!(listener = %id, error = %message, "accept loop died");
                        Err(SupervisorError::Fatal(format!("listener {id}: {message}")))
                    }
                    None => Ok(()),
                },
            }
        };
        info!("shutting down, draining listeners");
        self.shutdown().await;
        outcome
    }

    /// Drains every listener in parallel.
    pub async fn shutdown(&self) {
        self.listeners.shutdown_all().await;
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
