// crates/firelynx-cli/src/main.rs
// ============================================================================
// Module: Firelynx CLI Entry Point
// Description: Command dispatcher for the firelynx server binary.
// Purpose: Boot the dispatch plane from a config file and run to shutdown.
// Dependencies: clap, firelynx-config, firelynx-engines, firelynx-server,
// tokio, tracing-subscriber
// ============================================================================

//! ## Overview
//! The CLI owns process concerns only: argument parsing, tracing setup from
//! the `[logging]` config section, signal handling, and exit codes. The
//! `server` command boots a supervisor on the given configuration and runs
//! until interrupted. Script dialect engines are external collaborators;
//! embedders register them on the engine registry, so the stock binary
//! serves echo, composite-free, and MCP built-in configurations and rejects
//! script apps at boot with a clear compile error.
//!
//! Exit codes: `0` on clean shutdown, `1` on configuration or bind failure
//! at boot, `2` on a fatal runtime error.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use firelynx_config::Config;
use firelynx_config::LogFormat;
use firelynx_config::LoggingConfig;
use firelynx_engines::EngineRegistry;
use firelynx_server::Supervisor;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// Firelynx: a programmable HTTP front door.
#[derive(Debug, Parser)]
#[command(name = "firelynx", version, about = "Programmable HTTP front door")]
struct Cli {
    /// Command to run.
    #[command(subcommand)]
    command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Runs the server on a configuration file.
    Server {
        /// Path to the TOML configuration file.
        #[arg(short, long)]
        config: PathBuf,
        /// Admin channel bind address (reserved; accepted and logged).
        #[arg(long)]
        admin: Option<String>,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Exit code for configuration and bind failures at boot.
const EXIT_BOOT_FAILURE: u8 = 1;
/// Exit code for fatal runtime errors.
const EXIT_RUNTIME_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let code = match cli.command {
        Command::Server {
            config,
            admin,
        } => run_server(&config, admin.as_deref()).await,
    };
    ExitCode::from(code)
}

/// Runs the server command to completion, returning the exit code.
async fn run_server(config_path: &std::path::Path, admin: Option<&str>) -> u8 {
    // Logging settings come from the config file, so parse before tracing.
    let parsed = match Config::from_file(config_path) {
        Ok(parsed) => parsed,
        Err(err) => {
            let _ = writeln!(std::io::stderr(), "firelynx: {err}");
            return EXIT_BOOT_FAILURE;
        }
    };
    init_tracing(&parsed.logging);
    if let Some(admin) = admin {
        info!(address = %admin, "admin channel requested (reserved)");
    }

    let supervisor = Supervisor::new(Arc::new(EngineRegistry::new()));
    if let Err(err) = supervisor.boot_from_file(config_path).await {
        tracing::error!(error = %err, "boot failed");
        return EXIT_BOOT_FAILURE;
    }
    for (id, address) in supervisor.listener_addresses().await {
        info!(listener = %id, address = %address, "listening");
    }

    let outcome = supervisor
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    match outcome {
        Ok(()) => {
            info!("shutdown complete");
            0
        }
        Err(err) => {
            tracing::error!(error = %err, "server failed");
            EXIT_RUNTIME_FAILURE
        }
    }
}

/// Installs the tracing subscriber from the `[logging]` section.
///
/// `RUST_LOG` overrides the configured level when set.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match logging.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    // A second init (tests, embedding) keeps the first subscriber.
    drop(result);
}
