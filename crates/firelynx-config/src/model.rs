// crates/firelynx-config/src/model.rs
// ============================================================================
// Module: Firelynx Configuration Model
// Description: Typed configuration tree and strict TOML loading.
// Purpose: Provide fail-closed config parsing with hard limits.
// Dependencies: firelynx-core, serde, toml
// ============================================================================

//! ## Overview
//! The configuration is a versioned root with four collections: listeners,
//! endpoints, apps, and logging settings. Loading is bounded (file size cap,
//! UTF-8 only) and the whole tree serializes back to the same TOML surface it
//! was parsed from. Validation lives in [`crate::validate`]; this module only
//! defines shape and defaults.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use firelynx_core::AppId;
use firelynx_core::Dialect;
use firelynx_core::EndpointId;
use firelynx_core::EvaluatorSource;
use firelynx_core::EvaluatorSpec;
use firelynx_core::ListenerId;
use firelynx_core::MergeMode;
use firelynx_core::StaticData;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Supported configuration version.
pub const CONFIG_VERSION: &str = "v1";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// App identifiers that exist without an `[[apps]]` entry.
pub const BUILTIN_APP_IDS: &[&str] = &["echo"];
/// Built-in MCP tool handler names.
pub const BUILTIN_TOOL_HANDLERS: &[&str] = &["echo"];

/// Default drain timeout for HTTP listeners in milliseconds.
const fn default_drain_timeout_ms() -> u64 {
    5_000
}

/// Default console logger output sink.
fn default_logger_output() -> String {
    "stdout".to_string()
}

/// Default cap on captured request/response body bytes.
const fn default_max_body_size() -> usize {
    1_024
}

// ============================================================================
// SECTION: Configuration Root
// ============================================================================

/// Firelynx configuration root.
///
/// # Invariants
/// - `version` must equal [`CONFIG_VERSION`] (enforced by validation).
/// - The tree round-trips through TOML without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration format version.
    pub version: String,
    /// Process logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Bound serving sockets.
    #[serde(default)]
    pub listeners: Vec<Listener>,
    /// Route and middleware groupings bound to listeners.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    /// Named applications referenced by routes.
    #[serde(default)]
    pub apps: Vec<AppDefinition>,
}

impl Config {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid TOML for
    /// this model.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads a configuration file from disk.
    ///
    /// The file is size-capped and must be UTF-8. The returned configuration
    /// is parsed but not yet validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading or parsing fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Serializes the configuration back to TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] when the tree cannot be rendered.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|err| ConfigError::Serialize(err.to_string()))
    }

    /// Returns the listener with the given id.
    #[must_use]
    pub fn listener(&self, id: &ListenerId) -> Option<&Listener> {
        self.listeners.iter().find(|listener| &listener.id == id)
    }

    /// Returns the app definition with the given id.
    #[must_use]
    pub fn app(&self, id: &AppId) -> Option<&AppDefinition> {
        self.apps.iter().find(|app| &app.id == id)
    }

    /// Returns the endpoints bound to the given listener, in declared order.
    #[must_use]
    pub fn endpoints_for_listener(&self, id: &ListenerId) -> Vec<&Endpoint> {
        self.endpoints.iter().filter(|endpoint| &endpoint.listener_id == id).collect()
    }
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Process log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Debug and above.
    Debug,
    /// Info and above.
    #[default]
    Info,
    /// Warnings and errors only.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns a stable label for the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Process log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable text lines.
    #[default]
    Text,
    /// JSON lines.
    Json,
}

/// Process logging settings consumed by the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level emitted.
    #[serde(default)]
    pub level: LogLevel,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

// ============================================================================
// SECTION: Listeners
// ============================================================================

/// Listener protocol tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerProtocol {
    /// Plain HTTP serving.
    #[default]
    Http,
}

/// HTTP listener options.
///
/// # Invariants
/// - All timeouts are milliseconds; `0` means no timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpListenerOptions {
    /// Read timeout in milliseconds.
    #[serde(default)]
    pub read_timeout_ms: u64,
    /// Write timeout in milliseconds.
    #[serde(default)]
    pub write_timeout_ms: u64,
    /// Idle connection timeout in milliseconds.
    #[serde(default)]
    pub idle_timeout_ms: u64,
    /// Drain window on removal or shutdown, in milliseconds.
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
}

impl Default for HttpListenerOptions {
    fn default() -> Self {
        Self {
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            idle_timeout_ms: 0,
            drain_timeout_ms: default_drain_timeout_ms(),
        }
    }
}

impl HttpListenerOptions {
    /// Returns the drain window as a duration.
    #[must_use]
    pub const fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

/// Bound serving socket definition.
///
/// # Invariants
/// - `id` is unique across listeners.
/// - `address` is interpolatable and must parse as `host:port` afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listener {
    /// Listener identifier.
    pub id: ListenerId,
    /// Bind address as `host:port`.
    pub address: String,
    /// Protocol tag.
    #[serde(rename = "type", default)]
    pub protocol: ListenerProtocol,
    /// HTTP protocol options.
    #[serde(default)]
    pub http: HttpListenerOptions,
}

// ============================================================================
// SECTION: Endpoints and Routes
// ============================================================================

/// Route match condition.
///
/// Method and host matchers are reserved extension points; only path-prefix
/// matching is defined today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteRule {
    /// Matches when the request path starts with `value`.
    PathPrefix {
        /// Path prefix; must be non-empty and begin with `/`.
        value: String,
    },
}

/// Terminal route to an app.
///
/// # Invariants
/// - `app_id` resolves in the apps collection or the built-in set.
/// - Declared order is evaluation order; first match wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Target app identifier.
    pub app_id: AppId,
    /// Match condition.
    pub rule: RouteRule,
    /// Route-level static data merged over the app's data.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub static_data: StaticData,
}

/// Header mutations applied in one middleware phase.
///
/// `set` replaces existing values, `add` appends, `remove` drops all values;
/// for the same name `set` applies before `add`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMutations {
    /// Headers replaced wholesale.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub set: BTreeMap<String, String>,
    /// Headers appended after any `set`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub add: BTreeMap<String, String>,
    /// Header names dropped entirely.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<String>,
}

impl HeaderMutations {
    /// Returns true when no mutation is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.add.is_empty() && self.remove.is_empty()
    }
}

/// Headers middleware configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadersMiddlewareConfig {
    /// Request-phase mutations.
    #[serde(default)]
    pub request: HeaderMutations,
    /// Response-phase mutations.
    #[serde(default)]
    pub response: HeaderMutations,
}

/// Console logger field presets expanded at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggerPreset {
    /// Method, path, status, duration.
    Minimal,
    /// Minimal plus client address.
    Standard,
    /// Standard plus request and response headers.
    Detailed,
}

/// Console logger record fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerFields {
    /// Log the HTTP method.
    #[serde(default)]
    pub method: bool,
    /// Log the request path.
    #[serde(default)]
    pub path: bool,
    /// Log the client address.
    #[serde(default)]
    pub client_ip: bool,
    /// Log the response status code.
    #[serde(default)]
    pub status_code: bool,
    /// Log the wall-clock duration.
    #[serde(default)]
    pub duration: bool,
    /// Log request headers.
    #[serde(default)]
    pub request_headers: bool,
    /// Log response headers.
    #[serde(default)]
    pub response_headers: bool,
    /// Log the request body up to the configured cap.
    #[serde(default)]
    pub request_body: bool,
    /// Log the response body up to the configured cap.
    #[serde(default)]
    pub response_body: bool,
}

impl LoggerFields {
    /// Applies a preset on top of the explicitly enabled fields.
    pub fn apply_preset(&mut self, preset: LoggerPreset) {
        self.method = true;
        self.path = true;
        self.status_code = true;
        self.duration = true;
        match preset {
            LoggerPreset::Minimal => {}
            LoggerPreset::Standard => {
                self.client_ip = true;
            }
            LoggerPreset::Detailed => {
                self.client_ip = true;
                self.request_headers = true;
                self.response_headers = true;
            }
        }
    }
}

/// Console logger include/exclude filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerFilters {
    /// Path prefixes logged when non-empty; everything otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_paths: Vec<String>,
    /// Path prefixes never logged.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_paths: Vec<String>,
    /// Methods logged when non-empty; everything otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_methods: Vec<String>,
    /// Methods never logged.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_methods: Vec<String>,
}

/// Console logger middleware configuration.
///
/// # Invariants
/// - `output` is `stdout`, `stderr`, or a file path (interpolatable).
/// - When `preset` is set, validation expands it into `fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleLoggerConfig {
    /// Optional field preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<LoggerPreset>,
    /// Output sink: `stdout`, `stderr`, or a file path.
    #[serde(default = "default_logger_output")]
    pub output: String,
    /// Record fields to emit.
    #[serde(default)]
    pub fields: LoggerFields,
    /// Path and method filters.
    #[serde(default)]
    pub filters: LoggerFilters,
    /// Cap on captured body bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ConsoleLoggerConfig {
    fn default() -> Self {
        Self {
            preset: None,
            output: default_logger_output(),
            fields: LoggerFields::default(),
            filters: LoggerFilters::default(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Middleware kind and configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MiddlewareKind {
    /// Request/response header mutations.
    Headers(HeadersMiddlewareConfig),
    /// Structured per-request console logging.
    ConsoleLogger(ConsoleLoggerConfig),
}

/// Named middleware entry on an endpoint.
///
/// # Invariants
/// - `id` is unique within its endpoint.
/// - Declared order is request-phase execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Middleware {
    /// Middleware identifier, unique within the endpoint.
    pub id: String,
    /// Kind and configuration.
    #[serde(flatten)]
    pub kind: MiddlewareKind,
}

/// Endpoint binding routes and middlewares to one listener.
///
/// # Invariants
/// - `listener_id` resolves; at least one route is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Endpoint identifier.
    pub id: EndpointId,
    /// Listener this endpoint serves on.
    pub listener_id: ListenerId,
    /// Ordered routes; first match wins.
    #[serde(default)]
    pub routes: Vec<Route>,
    /// Ordered middlewares; outside-in on request, inside-out on response.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middlewares: Vec<Middleware>,
}

// ============================================================================
// SECTION: Apps
// ============================================================================

/// Static data block carried by script, composite, and tool configs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticDataConfig {
    /// Data mapping merged into the per-request context.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: StaticData,
    /// Merge behavior on key collision.
    #[serde(default)]
    pub merge_mode: MergeMode,
}

/// Inline or loaded evaluator source fields shared by the inline dialects.
///
/// # Invariants
/// - Exactly one of `code` and `uri` is set (enforced by validation).
/// - `timeout_ms` of `0` disables the evaluation deadline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineEvaluatorConfig {
    /// Inline script source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// URI of a file or HTTP resource holding the source (interpolatable).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Evaluation deadline in milliseconds; `0` disables it.
    #[serde(default)]
    pub timeout_ms: u64,
}

/// Extism evaluator configuration.
///
/// # Invariants
/// - Exactly one of `code` and `uri` is set; `entrypoint` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtismEvaluatorConfig {
    /// Inline module bytes, base64 or WAT as the engine defines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// URI of the module (interpolatable).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Evaluation deadline in milliseconds; `0` disables it.
    #[serde(default)]
    pub timeout_ms: u64,
    /// Exported symbol invoked per evaluation.
    pub entrypoint: String,
}

/// Evaluator selection for a script app or script tool handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EvaluatorConfig {
    /// Risor inline scripting.
    Risor(InlineEvaluatorConfig),
    /// Starlark inline scripting.
    Starlark(InlineEvaluatorConfig),
    /// Extism WebAssembly host.
    Extism(ExtismEvaluatorConfig),
}

impl EvaluatorConfig {
    /// Returns the dialect for this evaluator.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        match self {
            Self::Risor(_) => Dialect::Risor,
            Self::Starlark(_) => Dialect::Starlark,
            Self::Extism(_) => Dialect::Extism,
        }
    }

    /// Returns the inline code, when configured.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Risor(inner) | Self::Starlark(inner) => inner.code.as_deref(),
            Self::Extism(inner) => inner.code.as_deref(),
        }
    }

    /// Returns the source URI, when configured.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::Risor(inner) | Self::Starlark(inner) => inner.uri.as_deref(),
            Self::Extism(inner) => inner.uri.as_deref(),
        }
    }

    /// Returns the configured deadline in milliseconds.
    #[must_use]
    pub const fn timeout_ms(&self) -> u64 {
        match self {
            Self::Risor(inner) | Self::Starlark(inner) => inner.timeout_ms,
            Self::Extism(inner) => inner.timeout_ms,
        }
    }

    /// Builds the runtime evaluator spec for the factory.
    ///
    /// Assumes the config validated: exactly one of code/uri is present.
    #[must_use]
    pub fn to_spec(&self) -> EvaluatorSpec {
        let source = match (self.code(), self.uri()) {
            (Some(code), _) => EvaluatorSource::Code(code.to_string()),
            (None, Some(uri)) => EvaluatorSource::Uri(uri.to_string()),
            (None, None) => EvaluatorSource::Code(String::new()),
        };
        let timeout_ms = self.timeout_ms();
        let timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));
        let entrypoint = match self {
            Self::Risor(_) | Self::Starlark(_) => None,
            Self::Extism(inner) => Some(inner.entrypoint.clone()),
        };
        EvaluatorSpec {
            dialect: self.dialect(),
            source,
            timeout,
            entrypoint,
        }
    }
}

/// Echo app configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoAppConfig {
    /// Response body (interpolatable).
    pub response: String,
}

/// Script app configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptAppConfig {
    /// App-level static data.
    #[serde(default)]
    pub static_data: StaticDataConfig,
    /// Evaluator powering this app.
    pub evaluator: EvaluatorConfig,
}

/// Composite app configuration.
///
/// # Invariants
/// - Every entry references a script app (also forecloses reference cycles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeAppConfig {
    /// Ordered script app members.
    pub script_app_ids: Vec<AppId>,
    /// Base static data each member's data merges over.
    #[serde(default)]
    pub static_data: StaticDataConfig,
}

/// MCP transport descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum McpTransport {
    /// JSON-RPC over the listener's HTTP path.
    #[default]
    Http,
}

/// MCP tool handler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum McpToolHandlerConfig {
    /// Built-in handler selected by name.
    Builtin {
        /// Built-in handler name (see [`BUILTIN_TOOL_HANDLERS`]).
        name: String,
    },
    /// Script handler reusing the evaluator machinery.
    Script {
        /// Evaluator powering the tool.
        evaluator: EvaluatorConfig,
        /// Static data exposed to the tool as `data`.
        #[serde(default)]
        static_data: StaticDataConfig,
    },
}

/// MCP tool definition.
///
/// # Invariants
/// - `name` is unique within the app.
/// - `input_schema`/`output_schema`, when present, are JSON schema objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolConfig {
    /// Tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// JSON schema validating tool call arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    /// JSON schema describing tool output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    /// Handler invoked per call.
    pub handler: McpToolHandlerConfig,
}

/// MCP prompt definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpPromptConfig {
    /// Prompt name, unique within the app.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Prompt template text.
    pub template: String,
}

/// MCP app configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpAppConfig {
    /// Server name advertised during initialize.
    pub server_name: String,
    /// Server version advertised during initialize.
    pub server_version: String,
    /// Transport descriptor.
    #[serde(default)]
    pub transport: McpTransport,
    /// Tool definitions.
    #[serde(default)]
    pub tools: Vec<McpToolConfig>,
    /// Prompt definitions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prompts: Vec<McpPromptConfig>,
    /// App-scoped middlewares.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middlewares: Vec<Middleware>,
}

/// App kind and configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppKind {
    /// Fixed-response app.
    Echo(EchoAppConfig),
    /// Script-evaluator app.
    Script(ScriptAppConfig),
    /// Chained-evaluation app.
    Composite(CompositeAppConfig),
    /// MCP tool-protocol app.
    Mcp(McpAppConfig),
}

impl AppKind {
    /// Returns a stable label for the app kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Echo(_) => "echo",
            Self::Script(_) => "script",
            Self::Composite(_) => "composite",
            Self::Mcp(_) => "mcp",
        }
    }
}

/// Named application definition.
///
/// # Invariants
/// - `id` is unique across apps and never interpolated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppDefinition {
    /// App identifier.
    pub id: AppId,
    /// Kind and configuration.
    #[serde(flatten)]
    pub config: AppKind,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data; joins every violation found.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// TOML serialization error.
    #[error("config serialize error: {0}")]
    Serialize(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
