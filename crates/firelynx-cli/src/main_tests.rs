// crates/firelynx-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Unit Tests
// Description: Unit tests for argument parsing and boot failures.
// Purpose: Validate the CLI surface without spawning the binary.
// Dependencies: firelynx-cli, clap, tempfile
// ============================================================================

//! ## Overview
//! Exercises clap parsing and the server command's failure exit codes.

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

use clap::Parser;

use super::*;

// ============================================================================
// SECTION: Parsing Tests
// ============================================================================

#[test]
fn server_command_parses_config_path() {
    let cli = Cli::try_parse_from(["firelynx", "server", "--config", "firelynx.toml"])
        .expect("args parse");
    let Command::Server {
        config,
        admin,
    } = cli.command;
    assert_eq!(config, PathBuf::from("firelynx.toml"));
    assert_eq!(admin, None);
}

#[test]
fn server_command_accepts_admin_address() {
    let cli = Cli::try_parse_from([
        "firelynx",
        "server",
        "--config",
        "firelynx.toml",
        "--admin",
        "127.0.0.1:9090",
    ])
    .expect("args parse");
    let Command::Server {
        admin, ..
    } = cli.command;
    assert_eq!(admin.as_deref(), Some("127.0.0.1:9090"));
}

#[test]
fn missing_config_flag_is_a_parse_error() {
    assert!(Cli::try_parse_from(["firelynx", "server"]).is_err());
}

// ============================================================================
// SECTION: Boot Failure Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn missing_config_file_exits_nonzero() {
    let code = run_server(std::path::Path::new("/nonexistent/firelynx.toml"), None).await;
    assert_eq!(code, EXIT_BOOT_FAILURE);
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_config_exits_nonzero() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    std::io::Write::write_all(&mut file, b"version = \"v9\"\n").expect("write config");
    let code = run_server(file.path(), None).await;
    assert_eq!(code, EXIT_BOOT_FAILURE);
}
