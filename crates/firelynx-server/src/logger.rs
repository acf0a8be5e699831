// crates/firelynx-server/src/logger.rs
// ============================================================================
// Module: Console Logger Middleware
// Description: Structured per-request records to a configured sink.
// Purpose: Emit one JSON line per request with the configured fields.
// Dependencies: crate::executor, firelynx-config, serde_json
// ============================================================================

//! ## Overview
//! The console logger writes one JSON object per request containing exactly
//! the fields enabled by configuration. Filters drop requests by path prefix
//! or method before any record is built. Sinks are append-only: standard
//! streams or a file opened at prepare time so open failures abort the
//! transaction instead of losing records at request time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use firelynx_config::ConsoleLoggerConfig;
use firelynx_config::LoggerFields;
use firelynx_config::LoggerFilters;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::executor::RequestState;
use crate::executor::ResponseState;

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Append-only record sink.
pub trait LogSink: Send + Sync {
    /// Writes one serialized record line.
    fn write_line(&self, line: &str);
}

/// Sink writing to standard output.
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write_line(&self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{line}");
    }
}

/// Sink writing to standard error.
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write_line(&self, line: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{line}");
    }
}

/// Sink appending to a file.
pub struct FileSink {
    /// Open file handle guarded for concurrent writers.
    file: Mutex<File>,
}

impl FileSink {
    /// Opens the file for appending, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the file cannot be opened.
    pub fn open(path: &str) -> Result<Self, std::io::Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl LogSink for FileSink {
    fn write_line(&self, line: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }
}

/// Builds the sink for a configured output target.
///
/// # Errors
///
/// Returns the I/O error when a file target cannot be opened.
pub fn build_sink(output: &str) -> Result<Arc<dyn LogSink>, std::io::Error> {
    match output {
        "stdout" => Ok(Arc::new(StdoutSink)),
        "stderr" => Ok(Arc::new(StderrSink)),
        path => Ok(Arc::new(FileSink::open(path)?)),
    }
}

// ============================================================================
// SECTION: Console Logger
// ============================================================================

/// Console logger middleware instance.
///
/// # Invariants
/// - `fields` is fully expanded; presets never reach the runtime.
#[derive(Clone)]
pub struct ConsoleLogger {
    /// Enabled record fields.
    fields: LoggerFields,
    /// Path and method filters.
    filters: LoggerFilters,
    /// Cap on captured body bytes.
    max_body_size: usize,
    /// Record sink.
    sink: Arc<dyn LogSink>,
}

impl std::fmt::Debug for ConsoleLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleLogger")
            .field("fields", &self.fields)
            .field("filters", &self.filters)
            .field("max_body_size", &self.max_body_size)
            .finish_non_exhaustive()
    }
}

impl ConsoleLogger {
    /// Builds a logger from configuration, opening its sink.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when a file sink cannot be opened.
    pub fn from_config(config: &ConsoleLoggerConfig) -> Result<Self, std::io::Error> {
        Ok(Self {
            fields: config.fields,
            filters: config.filters.clone(),
            max_body_size: config.max_body_size,
            sink: build_sink(&config.output)?,
        })
    }

    /// Builds a logger over an explicit sink, for embedding and tests.
    #[must_use]
    pub fn with_sink(
        fields: LoggerFields,
        filters: LoggerFilters,
        max_body_size: usize,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            fields,
            filters,
            max_body_size,
            sink,
        }
    }

    /// Records one request if the filters admit it.
    pub fn record(&self, request: &RequestState, response: &ResponseState, duration: Duration) {
        if !self.admits(request) {
            return;
        }
        let mut record = Map::new();
        if self.fields.method {
            record.insert("method".to_string(), json!(request.method));
        }
        if self.fields.path {
            record.insert("path".to_string(), json!(request.path));
        }
        if self.fields.client_ip {
            let client_ip = request.client_ip.map(|ip| ip.to_string());
            record.insert("client_ip".to_string(), json!(client_ip));
        }
        if self.fields.status_code {
            record.insert("status_code".to_string(), json!(response.status));
        }
        if self.fields.duration {
            let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
            record.insert("duration_ms".to_string(), json!(duration_ms));
        }
        if self.fields.request_headers {
            record.insert("request_headers".to_string(), headers_value(&request.headers));
        }
        if self.fields.response_headers {
            record.insert("response_headers".to_string(), headers_value(&response.headers));
        }
        if self.fields.request_body {
            record.insert("request_body".to_string(), body_value(&request.body, self.max_body_size));
        }
        if self.fields.response_body {
            record
                .insert("response_body".to_string(), body_value(&response.body, self.max_body_size));
        }
        self.sink.write_line(&Value::Object(record).to_string());
    }

    /// Applies include/exclude filters for paths and methods.
    fn admits(&self, request: &RequestState) -> bool {
        if !self.filters.include_paths.is_empty()
            && !self.filters.include_paths.iter().any(|prefix| request.path.starts_with(prefix))
        {
            return false;
        }
        if self.filters.exclude_paths.iter().any(|prefix| request.path.starts_with(prefix)) {
            return false;
        }
        if !self.filters.include_methods.is_empty()
            && !self
                .filters
                .include_methods
                .iter()
                .any(|method| method.eq_ignore_ascii_case(&request.method))
        {
            return false;
        }
        if self
            .filters
            .exclude_methods
            .iter()
            .any(|method| method.eq_ignore_ascii_case(&request.method))
        {
            return false;
        }
        true
    }
}

/// Serializes a header map for a record.
fn headers_value(headers: &std::collections::BTreeMap<String, Vec<String>>) -> Value {
    json!(headers)
}

/// Serializes a body capture, capped and lossy on non-UTF-8 bytes.
fn body_value(body: &[u8], cap: usize) -> Value {
    let slice = &body[..body.len().min(cap)];
    json!(String::from_utf8_lossy(slice))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
