// crates/firelynx-engines/src/source.rs
// ============================================================================
// Module: Evaluator Source Resolution
// Description: Load script sources from inline text, files, or HTTP.
// Purpose: Resolve sources with strict limits before engine compilation.
// Dependencies: firelynx-core, reqwest, url
// ============================================================================

//! ## Overview
//! A source is inline code or a URI. URIs resolve at compile time only:
//! `file://` and plain paths read from disk, `http(s)://` fetches with a
//! bounded timeout and size cap, redirects disabled. Loaded bytes must be
//! non-empty; an empty script never reaches an engine.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use firelynx_core::CompileError;
use firelynx_core::EvaluatorSource;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum script source size in bytes.
pub const MAX_SOURCE_BYTES: usize = 4 * 1024 * 1024;
/// Timeout for HTTP source fetches.
const HTTP_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
/// User agent presented on HTTP source fetches.
const USER_AGENT: &str = "firelynx/0.1";

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves an evaluator source into script bytes.
///
/// # Errors
///
/// Returns [`CompileError`] when the source is empty, the URI cannot be
/// loaded, or the payload exceeds [`MAX_SOURCE_BYTES`].
pub fn resolve_source(source: &EvaluatorSource) -> Result<Vec<u8>, CompileError> {
    let bytes = match source {
        EvaluatorSource::Code(code) => code.as_bytes().to_vec(),
        EvaluatorSource::Uri(uri) => resolve_uri(uri)?,
    };
    if bytes.is_empty() {
        return Err(CompileError::Source("script source is empty".to_string()));
    }
    if bytes.len() > MAX_SOURCE_BYTES {
        return Err(CompileError::Source("script source exceeds size limit".to_string()));
    }
    Ok(bytes)
}

/// Resolves a URI source into bytes.
fn resolve_uri(uri: &str) -> Result<Vec<u8>, CompileError> {
    if uri.trim().is_empty() {
        return Err(CompileError::Source("uri is empty".to_string()));
    }
    match Url::parse(uri) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => fetch_http(&url),
        Ok(url) if url.scheme() == "file" => {
            let path = url
                .to_file_path()
                .map_err(|()| CompileError::Load(format!("invalid file uri {uri:?}")))?;
            read_file(&path)
        }
        Ok(url) => Err(CompileError::Load(format!("unsupported uri scheme {:?}", url.scheme()))),
        // Not a URL at all; treat it as a plain filesystem path.
        Err(_) => read_file(&PathBuf::from(uri)),
    }
}

/// Reads a script file from disk.
fn read_file(path: &std::path::Path) -> Result<Vec<u8>, CompileError> {
    fs::read(path)
        .map_err(|err| CompileError::Load(format!("read {} failed: {err}", path.display())))
}

/// Fetches a script over HTTP with redirects disabled and a hard size cap.
fn fetch_http(url: &Url) -> Result<Vec<u8>, CompileError> {
    let client = Client::builder()
        .timeout(HTTP_FETCH_TIMEOUT)
        .redirect(Policy::none())
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| CompileError::Load(format!("http client init failed: {err}")))?;
    let response = client
        .get(url.clone())
        .send()
        .map_err(|err| CompileError::Load(format!("fetch {url} failed: {err}")))?;
    let status = response.status();
    if !status.is_success() {
        return Err(CompileError::Load(format!("fetch {url} returned status {status}")));
    }
    let mut bytes = Vec::new();
    let mut limited = response.take(MAX_SOURCE_BYTES as u64 + 1);
    limited
        .read_to_end(&mut bytes)
        .map_err(|err| CompileError::Load(format!("read {url} failed: {err}")))?;
    if bytes.len() > MAX_SOURCE_BYTES {
        return Err(CompileError::Source("script source exceeds size limit".to_string()));
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
