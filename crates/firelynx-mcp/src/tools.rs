// crates/firelynx-mcp/src/tools.rs
// ============================================================================
// Module: MCP Tools
// Description: Tool specs, handlers, and call dispatch.
// Purpose: Route tool calls to built-in or script-backed handlers.
// Dependencies: firelynx-core, firelynx-engines, jsonschema
// ============================================================================

//! ## Overview
//! A tool is a name, a description, optional input/output JSON schemas, and
//! a handler. Built-in handlers are a closed set; script handlers reuse the
//! compiled-evaluator machinery with `{args, data}` as the evaluation
//! context. Input schemas compile once at service build; argument validation
//! failures are reported as invalid-params errors before any handler runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use firelynx_core::CompiledEvaluator;
use firelynx_core::EvalError;
use firelynx_core::EvalInput;
use firelynx_core::StaticData;
use jsonschema::Draft;
use jsonschema::Validator;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced while building or running the MCP service.
#[derive(Debug, Error)]
pub enum McpError {
    /// A configured tool schema did not compile.
    #[error("tool {tool} schema invalid: {message}")]
    Schema {
        /// Tool name carrying the schema.
        tool: String,
        /// Compiler message.
        message: String,
    },
    /// Two tools share a name.
    #[error("duplicate tool name {0:?}")]
    DuplicateTool(String),
}

// ============================================================================
// SECTION: Tool Specs
// ============================================================================

/// Built-in tool handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTool {
    /// Returns the call arguments unchanged.
    Echo,
}

/// Script-backed tool handler.
#[derive(Clone)]
pub struct ScriptTool {
    /// Compiled evaluator invoked per call.
    pub evaluator: Arc<dyn CompiledEvaluator>,
    /// Evaluation deadline, when configured.
    pub timeout: Option<Duration>,
    /// Static data exposed to the tool under `data`.
    pub data: StaticData,
}

/// Tool handler dispatch target.
#[derive(Clone)]
pub enum ToolHandler {
    /// Built-in handler.
    Builtin(BuiltinTool),
    /// Script handler reusing the evaluator machinery.
    Script(ScriptTool),
}

/// Tool specification registered on the service.
#[derive(Clone)]
pub struct ToolSpec {
    /// Tool name, unique within the service.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON schema validating call arguments.
    pub input_schema: Option<Value>,
    /// JSON schema describing tool output.
    pub output_schema: Option<Value>,
    /// Handler invoked per call.
    pub handler: ToolHandler,
}

/// Tool definition advertised by `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON schema validating call arguments.
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    /// JSON schema describing tool output.
    #[serde(rename = "outputSchema", skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
}

// ============================================================================
// SECTION: Tool Registry
// ============================================================================

/// Registered tool with its compiled argument validator.
pub(crate) struct ToolEntry {
    /// Tool specification.
    pub(crate) spec: ToolSpec,
    /// Compiled input schema, when configured.
    pub(crate) validator: Option<Validator>,
}

/// Tool registry keyed by name.
pub(crate) struct ToolRegistry {
    /// Registered tools in insertion order lookup form.
    entries: BTreeMap<String, ToolEntry>,
    /// Advertised definitions in registration order.
    definitions: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// Builds a registry, compiling every input schema.
    ///
    /// # Errors
    ///
    /// Returns [`McpError`] on duplicate names or invalid schemas.
    pub(crate) fn build(tools: Vec<ToolSpec>) -> Result<Self, McpError> {
        let mut entries = BTreeMap::new();
        let mut definitions = Vec::with_capacity(tools.len());
        for spec in tools {
            if entries.contains_key(&spec.name) {
                return Err(McpError::DuplicateTool(spec.name));
            }
            let validator = match &spec.input_schema {
                Some(schema) => Some(compile_schema(&spec.name, schema)?),
                None => None,
            };
            definitions.push(ToolDefinition {
                name: spec.name.clone(),
                description: spec.description.clone(),
                input_schema: spec.input_schema.clone(),
                output_schema: spec.output_schema.clone(),
            });
            entries.insert(
                spec.name.clone(),
                ToolEntry {
                    spec,
                    validator,
                },
            );
        }
        Ok(Self {
            entries,
            definitions,
        })
    }

    /// Returns the advertised tool definitions.
    pub(crate) fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Returns the entry for a tool name.
    pub(crate) fn entry(&self, name: &str) -> Option<&ToolEntry> {
        self.entries.get(name)
    }
}

/// Compiles a tool input schema for validation.
fn compile_schema(tool: &str, schema: &Value) -> Result<Validator, McpError> {
    jsonschema::options().with_draft(Draft::Draft202012).build(schema).map_err(|err| {
        McpError::Schema {
            tool: tool.to_string(),
            message: err.to_string(),
        }
    })
}

// ============================================================================
// SECTION: Call Dispatch
// ============================================================================

/// Outcome of one tool call before envelope encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ToolOutcome {
    /// Handler produced a value.
    Value(Value),
    /// Handler reported or hit an error; the message goes into the error
    /// envelope with `is_error` set.
    Error(String),
}

impl ToolEntry {
    /// Validates arguments against the compiled input schema.
    pub(crate) fn validate_args(&self, args: &Value) -> Result<(), String> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };
        let messages: Vec<String> =
            validator.iter_errors(args).map(|err| err.to_string()).collect();
        if messages.is_empty() {
            Ok(())
        } else {
            Err(messages.join("; "))
        }
    }

    /// Runs the handler for validated arguments.
    pub(crate) async fn call(&self, args: Value) -> ToolOutcome {
        match &self.spec.handler {
            ToolHandler::Builtin(BuiltinTool::Echo) => ToolOutcome::Value(args),
            ToolHandler::Script(script) => {
                let mut context = Map::new();
                context.insert("args".to_string(), args);
                let data: Map<String, Value> = script
                    .data
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                context.insert("data".to_string(), Value::Object(data));
                let input = EvalInput {
                    context: Value::Object(context),
                    deadline: script.timeout,
                };
                let result = firelynx_engines::evaluate_with_deadline(
                    Arc::clone(&script.evaluator),
                    input,
                    script.timeout,
                )
                .await;
                match result {
                    Ok(value) => match error_message(&value) {
                        Some(message) => ToolOutcome::Error(message),
                        None => ToolOutcome::Value(value),
                    },
                    Err(EvalError::Timeout) => ToolOutcome::Error("timeout".to_string()),
                    Err(EvalError::Execution(message)) => ToolOutcome::Error(message),
                }
            }
        }
    }
}

/// Extracts the `error` string from a mapping result, when present.
fn error_message(value: &Value) -> Option<String> {
    match value.get("error") {
        Some(Value::String(message)) => Some(message.clone()),
        _ => None,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
