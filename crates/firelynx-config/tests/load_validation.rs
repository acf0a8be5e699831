//! Loading and validation tests for firelynx-config.
// crates/firelynx-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate file loading limits and end-to-end validation flow.
// Purpose: Ensure config loading fails closed and reports joined violations.
// =============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::io::Write;

use firelynx_config::Config;
use firelynx_config::ConfigError;

type TestResult = Result<(), String>;

const MINIMAL: &str = r#"
version = "v1"

[[listeners]]
id = "main"
address = "127.0.0.1:0"

[[endpoints]]
id = "web"
listener_id = "main"

[[endpoints.routes]]
app_id = "greetz"
rule = { type = "path_prefix", value = "/" }

[[apps]]
id = "greetz"
type = "echo"
response = "Hello, World!"
"#;

#[test]
fn file_load_parses_and_validates() -> TestResult {
    let mut file = tempfile::NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(MINIMAL.as_bytes()).map_err(|err| err.to_string())?;
    let mut config = Config::from_file(file.path()).map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.listeners.len() != 1 {
        return Err("expected one listener".to_string());
    }
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let result = Config::from_file(std::path::Path::new("/nonexistent/firelynx.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn oversized_file_is_rejected() -> TestResult {
    let mut file = tempfile::NamedTempFile::new().map_err(|err| err.to_string())?;
    let filler = vec![b'#'; firelynx_config::MAX_CONFIG_FILE_SIZE + 1];
    file.write_all(&filler).map_err(|err| err.to_string())?;
    match Config::from_file(file.path()) {
        Err(ConfigError::Invalid(message)) if message.contains("size limit") => Ok(()),
        other => Err(format!("expected size limit rejection, got {other:?}")),
    }
}

#[test]
fn non_utf8_file_is_rejected() -> TestResult {
    let mut file = tempfile::NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xff, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    match Config::from_file(file.path()) {
        Err(ConfigError::Invalid(message)) if message.contains("utf-8") => Ok(()),
        other => Err(format!("expected utf-8 rejection, got {other:?}")),
    }
}

#[test]
fn invalid_references_report_every_violation() {
    let broken = r#"
version = "v1"

[[listeners]]
id = "main"
address = "not-an-address"

[[endpoints]]
id = "web"
listener_id = "ghost"

[[endpoints.routes]]
app_id = "missing"
rule = { type = "path_prefix", value = "relative" }
"#;
    let mut config = Config::from_toml_str(broken).expect("parses");
    let message = config.validate().expect_err("invalid").to_string();
    assert!(message.contains("listeners[0].address"), "{message}");
    assert!(message.contains("unknown listener"), "{message}");
    assert!(message.contains("unknown app"), "{message}");
    assert!(message.contains("must begin with /"), "{message}");
}

#[test]
fn interpolated_address_resolves_with_defaults() {
    let source = r#"
version = "v1"

[[listeners]]
id = "main"
address = "${FIRELYNX_TEST_UNSET_HOST:127.0.0.1}:${FIRELYNX_TEST_UNSET_PORT:0}"

[[endpoints]]
id = "web"
listener_id = "main"

[[endpoints.routes]]
app_id = "echo"
rule = { type = "path_prefix", value = "/" }
"#;
    let mut config = Config::from_toml_str(source).expect("parses");
    config.validate().expect("validates");
    assert_eq!(config.listeners[0].address, "127.0.0.1:0");
}
