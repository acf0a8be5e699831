// crates/firelynx-server/src/transaction.rs
// ============================================================================
// Module: Transaction Engine
// Description: Staged, all-or-nothing replacement of the serving topology.
// Purpose: Validate, prepare, and commit candidate configurations.
// Dependencies: crate::{listener, topology}, firelynx-config, firelynx-engines
// ============================================================================

//! ## Overview
//! A transaction drives one candidate configuration through an explicit
//! state machine: `Created → Validating → Validated → Preparing → Prepared →
//! Committing → Committed`, with any failure landing in the terminal
//! `Failed` state. Validation (including evaluator compilation) and prepare
//! run off the request path; commit hands the built topology to the listener
//! manager. The manager serializes transactions with a single in-progress
//! slot: only one may progress past `Validated` at a time, and a concurrent
//! second one is rejected as busy while the running topology stays intact.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use firelynx_config::AppKind;
use firelynx_config::Config;
use firelynx_config::ConfigError;
use firelynx_config::McpToolHandlerConfig;
use firelynx_core::CompileError;
use firelynx_engines::EvaluatorFactory;
use thiserror::Error;
use tracing::debug;
use tracing::info;

use crate::listener::ListenerError;
use crate::listener::ListenerManager;
use crate::topology::Topology;
use crate::topology::TopologyError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced while applying a transaction.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Configuration validation failed.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Evaluator compilation failed.
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// Topology construction failed.
    #[error("prepare failed: {0}")]
    Prepare(String),
    /// A listener could not acquire its address.
    #[error("bind failed: {0}")]
    Bind(String),
    /// Another transaction is already past validation.
    #[error("a configuration transaction is already in progress")]
    Busy,
    /// The prepare task was cancelled before completing.
    #[error("prepare task cancelled")]
    Cancelled,
}

impl From<ConfigError> for TransactionError {
    fn from(err: ConfigError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<TopologyError> for TransactionError {
    fn from(err: TopologyError) -> Self {
        match err {
            TopologyError::Registry(crate::registry::RegistryError::Compile(err)) => {
                Self::Compile(err)
            }
            other => Self::Prepare(other.to_string()),
        }
    }
}

impl From<ListenerError> for TransactionError {
    fn from(err: ListenerError) -> Self {
        Self::Bind(err.to_string())
    }
}

// ============================================================================
// SECTION: Transaction
// ============================================================================

/// Where a candidate configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionSource {
    /// Loaded from a file at boot.
    File(String),
    /// Pushed at runtime (admin channel or tests).
    Push,
}

/// Transaction lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Created with a candidate config.
    Created,
    /// Validation in progress.
    Validating,
    /// Validation passed.
    Validated,
    /// Topology construction in progress.
    Preparing,
    /// Topology built and ready to commit.
    Prepared,
    /// Topology being installed.
    Committing,
    /// Terminal success.
    Committed,
    /// Terminal failure.
    Failed,
}

/// One staged configuration replacement.
pub struct Transaction {
    /// Candidate configuration; interpolated in place during validation.
    config: Config,
    /// Where the candidate came from.
    source: TransactionSource,
    /// Current lifecycle state.
    state: TransactionState,
    /// Built topology after a successful prepare.
    topology: Option<Topology>,
}

impl Transaction {
    /// Creates a transaction over a candidate configuration.
    #[must_use]
    pub const fn new(config: Config, source: TransactionSource) -> Self {
        Self {
            config,
            source,
            state: TransactionState::Created,
            topology: None,
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TransactionState {
        self.state
    }

    /// Returns where the candidate configuration came from.
    #[must_use]
    pub const fn source(&self) -> &TransactionSource {
        &self.source
    }

    /// Validates the candidate, including evaluator compilation checks.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError`] and lands in `Failed`; the running
    /// topology is untouched.
    pub fn validate(&mut self, factory: &EvaluatorFactory) -> Result<(), TransactionError> {
        self.state = TransactionState::Validating;
        debug!(source = ?self.source, "transaction validating");
        if let Err(err) = self.config.validate() {
            self.state = TransactionState::Failed;
            return Err(err.into());
        }
        if let Err(err) = compile_check(&self.config, factory) {
            self.state = TransactionState::Failed;
            return Err(err);
        }
        self.state = TransactionState::Validated;
        Ok(())
    }

    /// Builds the topology for the validated candidate.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError`] and lands in `Failed`; partially built
    /// artifacts are dropped.
    pub fn prepare(&mut self, factory: &EvaluatorFactory) -> Result<(), TransactionError> {
        self.state = TransactionState::Preparing;
        debug!(source = ?self.source, "transaction preparing");
        match Topology::build(self.config.clone(), factory) {
            Ok(topology) => {
                self.topology = Some(topology);
                self.state = TransactionState::Prepared;
                Ok(())
            }
            Err(err) => {
                self.state = TransactionState::Failed;
                Err(err.into())
            }
        }
    }

    /// Takes the prepared topology for commit.
    fn take_topology(&mut self) -> Option<Topology> {
        self.topology.take()
    }
}

/// Compiles every evaluator spec in the config, discarding the artifacts.
///
/// This is the validation-time compile pass; prepare compiles again while
/// building the registry that commit installs.
fn compile_check(config: &Config, factory: &EvaluatorFactory) -> Result<(), TransactionError> {
    for app in &config.apps {
        match &app.config {
            AppKind::Script(script) => {
                factory.compile(&script.evaluator.to_spec())?;
            }
            AppKind::Mcp(mcp) => {
                for tool in &mcp.tools {
                    if let McpToolHandlerConfig::Script {
                        evaluator, ..
                    } = &tool.handler
                    {
                        factory.compile(&evaluator.to_spec())?;
                    }
                }
            }
            AppKind::Echo(_) | AppKind::Composite(_) => {}
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Transaction Manager
// ============================================================================

/// Serialized manager state: the current topology and the busy slot.
#[derive(Default)]
struct ManagerState {
    /// Topology currently serving traffic.
    current: Option<Arc<Topology>>,
    /// Whether a transaction is past validation.
    in_progress: bool,
}

/// Drives transactions and owns the current-topology slot.
pub struct TransactionManager {
    /// Factory compiling evaluator specs.
    factory: EvaluatorFactory,
    /// Listener manager receiving commits.
    listeners: Arc<ListenerManager>,
    /// Current topology and in-progress slot behind one mutex.
    state: Mutex<ManagerState>,
}

impl TransactionManager {
    /// Creates a manager over the given factory and listener manager.
    #[must_use]
    pub fn new(factory: EvaluatorFactory, listeners: Arc<ListenerManager>) -> Self {
        Self {
            factory,
            listeners,
            state: Mutex::new(ManagerState::default()),
        }
    }

    /// Returns the topology currently serving traffic.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Topology>> {
        self.state.lock().ok().and_then(|state| state.current.clone())
    }

    /// Applies a candidate configuration end to end.
    ///
    /// Validation runs first; the in-progress slot is then claimed so only
    /// one transaction progresses past `Validated` at a time. Identical
    /// configurations commit without listener churn.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError`]; on any failure the running topology is
    /// left exactly as it was.
    pub async fn apply(
        &self,
        config: Config,
        source: TransactionSource,
    ) -> Result<Arc<Topology>, TransactionError> {
        // Validation compiles evaluators, which may load sources from disk
        // or HTTP; keep that off the async threads.
        let factory = self.factory.clone();
        let mut transaction = Transaction::new(config, source);
        let transaction = tokio::task::spawn_blocking(move || {
            let result = transaction.validate(&factory);
            (transaction, result)
        })
        .await
        .map_err(|_| TransactionError::Cancelled)
        .and_then(|(transaction, result)| result.map(|()| transaction))?;

        let unchanged = {
            let mut state = self.state.lock().map_err(|_| TransactionError::Busy)?;
            if state.in_progress {
                return Err(TransactionError::Busy);
            }
            match &state.current {
                // Commit is idempotent for identical configurations.
                Some(current) if *current.config == transaction.config => {
                    Some(Arc::clone(current))
                }
                _ => {
                    state.in_progress = true;
                    None
                }
            }
        };
        if let Some(current) = unchanged {
            info!(source = ?transaction.source(), "configuration unchanged, commit is a no-op");
            return Ok(current);
        }

        let result = self.drive(transaction).await;
        if let Ok(mut state) = self.state.lock() {
            state.in_progress = false;
            if let Ok(topology) = &result {
                state.current = Some(Arc::clone(topology));
            }
        }
        result
    }

    /// Prepares off the async path and commits through the listener manager.
    async fn drive(&self, mut transaction: Transaction) -> Result<Arc<Topology>, TransactionError> {
        let factory = self.factory.clone();
        let mut transaction = tokio::task::spawn_blocking(move || {
            let result = transaction.prepare(&factory);
            (transaction, result)
        })
        .await
        .map_err(|_| TransactionError::Cancelled)
        .and_then(|(transaction, result)| result.map(|()| transaction))?;

        transaction.state = TransactionState::Committing;
        let topology = transaction.take_topology().map(Arc::new).ok_or_else(|| {
            transaction.state = TransactionState::Failed;
            TransactionError::Prepare("prepared topology missing".to_string())
        })?;
        if let Err(err) = self.listeners.install(&topology).await {
            transaction.state = TransactionState::Failed;
            return Err(err.into());
        }
        transaction.state = TransactionState::Committed;
        info!(source = ?transaction.source(), "configuration committed");
        Ok(topology)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
