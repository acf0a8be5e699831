// crates/firelynx-config/src/validate.rs
// ============================================================================
// Module: Firelynx Configuration Validation
// Description: Joined validation, interpolation, and cross-reference checks.
// Purpose: Surface every violation at once with its config path.
// Dependencies: crate::{interpolate, model}, firelynx-core
// ============================================================================

//! ## Overview
//! Validation runs in three passes over the typed tree: environment
//! interpolation of the fields marked interpolatable, structural checks
//! (versions, required fields, unique identifiers), and cross-reference
//! checks (endpoint→listener, route→app, composite→script-app). Violations
//! are collected, not short-circuited, and joined into a single
//! [`ConfigError::Invalid`] report. Validation also expands console-logger
//! presets into their full field sets so the runtime never sees a preset.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use firelynx_core::StaticData;
use serde_json::Value;

use crate::interpolate::interpolate;
use crate::model::BUILTIN_APP_IDS;
use crate::model::BUILTIN_TOOL_HANDLERS;
use crate::model::CONFIG_VERSION;
use crate::model::AppKind;
use crate::model::Config;
use crate::model::ConfigError;
use crate::model::EvaluatorConfig;
use crate::model::McpToolHandlerConfig;
use crate::model::Middleware;
use crate::model::MiddlewareKind;
use crate::model::RouteRule;

// ============================================================================
// SECTION: Violation Collection
// ============================================================================

/// Accumulates validation violations with their config paths.
#[derive(Debug, Default)]
struct Violations {
    /// Collected `path: message` entries in discovery order.
    entries: Vec<String>,
}

impl Violations {
    /// Records one violation at the given config path.
    fn push(&mut self, path: &str, message: impl AsRef<str>) {
        self.entries.push(format!("{path}: {}", message.as_ref()));
    }

    /// Converts the collected violations into a validation result.
    fn into_result(self) -> Result<(), ConfigError> {
        if self.entries.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(self.entries.join("; ")))
        }
    }
}

// ============================================================================
// SECTION: Validation Entry Point
// ============================================================================

impl Config {
    /// Validates the configuration for internal consistency.
    ///
    /// Interpolatable fields are rewritten from the process environment
    /// before format checks; console-logger presets are expanded into their
    /// field sets. Every violation is reported, joined into one error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing all violations found.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let mut violations = Violations::default();
        self.interpolate_tree(&mut violations);
        self.check_version(&mut violations);
        self.check_listeners(&mut violations);
        self.check_endpoints(&mut violations);
        self.check_apps(&mut violations);
        violations.into_result()
    }

    /// Checks the configuration format version.
    fn check_version(&self, violations: &mut Violations) {
        if self.version != CONFIG_VERSION {
            violations.push(
                "version",
                format!("unsupported version {:?}, expected {CONFIG_VERSION:?}", self.version),
            );
        }
    }

    /// Validates the listener collection.
    fn check_listeners(&self, violations: &mut Violations) {
        let mut seen = BTreeSet::new();
        for (index, listener) in self.listeners.iter().enumerate() {
            let path = format!("listeners[{index}]");
            if listener.id.as_str().is_empty() {
                violations.push(&path, "id must be non-empty");
            }
            if !seen.insert(listener.id.clone()) {
                violations.push(&path, format!("duplicate listener id {:?}", listener.id.as_str()));
            }
            if let Err(message) = parse_bind_address(&listener.address) {
                violations.push(&format!("{path}.address"), message);
            }
        }
    }

    /// Validates the endpoint collection and its routes and middlewares.
    fn check_endpoints(&mut self, violations: &mut Violations) {
        let listener_ids: BTreeSet<&str> =
            self.listeners.iter().map(|listener| listener.id.as_str()).collect();
        let app_ids: BTreeSet<&str> = self.apps.iter().map(|app| app.id.as_str()).collect();
        let mut seen = BTreeSet::new();
        for (index, endpoint) in self.endpoints.iter_mut().enumerate() {
            let path = format!("endpoints[{index}]");
            if endpoint.id.as_str().is_empty() {
                violations.push(&path, "id must be non-empty");
            }
            if !seen.insert(endpoint.id.clone()) {
                violations.push(&path, format!("duplicate endpoint id {:?}", endpoint.id.as_str()));
            }
            if !listener_ids.contains(endpoint.listener_id.as_str()) {
                violations.push(
                    &format!("{path}.listener_id"),
                    format!("unknown listener {:?}", endpoint.listener_id.as_str()),
                );
            }
            if endpoint.routes.is_empty() {
                violations.push(&path, "at least one route is required");
            }
            for (route_index, route) in endpoint.routes.iter().enumerate() {
                let route_path = format!("{path}.routes[{route_index}]");
                let resolves = app_ids.contains(route.app_id.as_str())
                    || BUILTIN_APP_IDS.contains(&route.app_id.as_str());
                if !resolves {
                    violations.push(
                        &format!("{route_path}.app_id"),
                        format!("unknown app {:?}", route.app_id.as_str()),
                    );
                }
                let RouteRule::PathPrefix { value } = &route.rule;
                if value.is_empty() {
                    violations.push(&format!("{route_path}.rule"), "path prefix must be non-empty");
                } else if !value.starts_with('/') {
                    violations
                        .push(&format!("{route_path}.rule"), "path prefix must begin with /");
                }
            }
            check_middlewares(&mut endpoint.middlewares, &path, violations);
        }
    }

    /// Validates the app collection.
    fn check_apps(&mut self, violations: &mut Violations) {
        let script_ids: BTreeSet<String> = self
            .apps
            .iter()
            .filter(|app| matches!(app.config, AppKind::Script(_)))
            .map(|app| app.id.as_str().to_string())
            .collect();
        let mut seen = BTreeSet::new();
        for (index, app) in self.apps.iter_mut().enumerate() {
            let path = format!("apps[{index}]");
            if app.id.as_str().is_empty() {
                violations.push(&path, "id must be non-empty");
            }
            if !seen.insert(app.id.clone()) {
                violations.push(&path, format!("duplicate app id {:?}", app.id.as_str()));
            }
            match &mut app.config {
                AppKind::Echo(echo) => {
                    if echo.response.is_empty() {
                        violations.push(&format!("{path}.response"), "response must be non-empty");
                    }
                }
                AppKind::Script(script) => {
                    check_evaluator(&script.evaluator, &format!("{path}.evaluator"), violations);
                }
                AppKind::Composite(composite) => {
                    if composite.script_app_ids.is_empty() {
                        violations
                            .push(&path, "composite requires at least one script app reference");
                    }
                    for (member_index, member) in composite.script_app_ids.iter().enumerate() {
                        let member_path = format!("{path}.script_app_ids[{member_index}]");
                        if !script_ids.contains(member.as_str()) {
                            violations.push(
                                &member_path,
                                format!("must reference a script app, {:?} is not one", member.as_str()),
                            );
                        }
                    }
                }
                AppKind::Mcp(mcp) => {
                    if mcp.server_name.is_empty() {
                        violations.push(&format!("{path}.server_name"), "must be non-empty");
                    }
                    if mcp.server_version.is_empty() {
                        violations.push(&format!("{path}.server_version"), "must be non-empty");
                    }
                    let mut tool_names = BTreeSet::new();
                    for (tool_index, tool) in mcp.tools.iter().enumerate() {
                        let tool_path = format!("{path}.tools[{tool_index}]");
                        if tool.name.is_empty() {
                            violations.push(&tool_path, "name must be non-empty");
                        }
                        if !tool_names.insert(tool.name.clone()) {
                            violations
                                .push(&tool_path, format!("duplicate tool name {:?}", tool.name));
                        }
                        check_schema_shape(tool.input_schema.as_ref(), &tool_path, "input_schema", violations);
                        check_schema_shape(tool.output_schema.as_ref(), &tool_path, "output_schema", violations);
                        match &tool.handler {
                            McpToolHandlerConfig::Builtin { name } => {
                                if !BUILTIN_TOOL_HANDLERS.contains(&name.as_str()) {
                                    violations.push(
                                        &format!("{tool_path}.handler"),
                                        format!("unknown builtin handler {name:?}"),
                                    );
                                }
                            }
                            McpToolHandlerConfig::Script { evaluator, .. } => {
                                check_evaluator(
                                    evaluator,
                                    &format!("{tool_path}.handler.evaluator"),
                                    violations,
                                );
                            }
                        }
                    }
                    let mut prompt_names = BTreeSet::new();
                    for (prompt_index, prompt) in mcp.prompts.iter().enumerate() {
                        let prompt_path = format!("{path}.prompts[{prompt_index}]");
                        if prompt.name.is_empty() {
                            violations.push(&prompt_path, "name must be non-empty");
                        }
                        if !prompt_names.insert(prompt.name.clone()) {
                            violations.push(
                                &prompt_path,
                                format!("duplicate prompt name {:?}", prompt.name),
                            );
                        }
                        if prompt.template.is_empty() {
                            violations.push(&prompt_path, "template must be non-empty");
                        }
                    }
                    check_middlewares(&mut mcp.middlewares, &path, violations);
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Section Helpers
// ============================================================================

/// Validates a middleware list and expands console-logger presets.
fn check_middlewares(middlewares: &mut [Middleware], parent: &str, violations: &mut Violations) {
    let mut seen = BTreeSet::new();
    for (index, middleware) in middlewares.iter_mut().enumerate() {
        let path = format!("{parent}.middlewares[{index}]");
        if middleware.id.is_empty() {
            violations.push(&path, "id must be non-empty");
        }
        if !seen.insert(middleware.id.clone()) {
            violations.push(&path, format!("duplicate middleware id {:?}", middleware.id));
        }
        match &mut middleware.kind {
            MiddlewareKind::Headers(headers) => {
                if headers.request.is_empty() && headers.response.is_empty() {
                    violations.push(&path, "headers middleware configures no mutation");
                }
            }
            MiddlewareKind::ConsoleLogger(logger) => {
                if logger.output.is_empty() {
                    violations.push(&format!("{path}.output"), "must be non-empty");
                }
                if let Some(preset) = logger.preset {
                    logger.fields.apply_preset(preset);
                }
            }
        }
    }
}

/// Validates an evaluator configuration.
fn check_evaluator(evaluator: &EvaluatorConfig, path: &str, violations: &mut Violations) {
    match (evaluator.code(), evaluator.uri()) {
        (Some(_), Some(_)) => {
            violations.push(path, "code and uri are mutually exclusive");
        }
        (None, None) => {
            violations.push(path, "requires code or uri");
        }
        (Some(code), None) => {
            if code.trim().is_empty() {
                violations.push(path, "code must be non-empty");
            }
        }
        (None, Some(uri)) => {
            if uri.trim().is_empty() {
                violations.push(path, "uri must be non-empty");
            }
        }
    }
    if let EvaluatorConfig::Extism(extism) = evaluator {
        if extism.entrypoint.trim().is_empty() {
            violations.push(path, "extism evaluator requires entrypoint");
        }
    }
}

/// Validates that an optional tool schema is a JSON object.
fn check_schema_shape(
    schema: Option<&Value>,
    parent: &str,
    field: &str,
    violations: &mut Violations,
) {
    if let Some(schema) = schema {
        if !schema.is_object() {
            violations.push(&format!("{parent}.{field}"), "schema must be a JSON object");
        }
    }
}

/// Checks a bind address for `host:port` shape.
fn parse_bind_address(address: &str) -> Result<(), String> {
    if address.is_empty() {
        return Err("must be non-empty".to_string());
    }
    let Some((host, port)) = address.rsplit_once(':') else {
        return Err(format!("{address:?} must be host:port"));
    };
    if host.is_empty() {
        return Err(format!("{address:?} has an empty host"));
    }
    if port.parse::<u16>().is_err() {
        return Err(format!("{address:?} has an invalid port"));
    }
    Ok(())
}

// ============================================================================
// SECTION: Interpolation Pass
// ============================================================================

impl Config {
    /// Rewrites interpolatable fields from the process environment.
    ///
    /// Identifiers and inline script code are deliberately left verbatim.
    fn interpolate_tree(&mut self, violations: &mut Violations) {
        for (index, listener) in self.listeners.iter_mut().enumerate() {
            interp_string(&mut listener.address, &format!("listeners[{index}].address"), violations);
        }
        for (index, endpoint) in self.endpoints.iter_mut().enumerate() {
            let path = format!("endpoints[{index}]");
            for (route_index, route) in endpoint.routes.iter_mut().enumerate() {
                interp_static_data(
                    &mut route.static_data,
                    &format!("{path}.routes[{route_index}].static_data"),
                    violations,
                );
            }
            interp_middlewares(&mut endpoint.middlewares, &path, violations);
        }
        for (index, app) in self.apps.iter_mut().enumerate() {
            let path = format!("apps[{index}]");
            match &mut app.config {
                AppKind::Echo(echo) => {
                    interp_string(&mut echo.response, &format!("{path}.response"), violations);
                }
                AppKind::Script(script) => {
                    interp_evaluator_uri(
                        &mut script.evaluator,
                        &format!("{path}.evaluator.uri"),
                        violations,
                    );
                    interp_static_data(
                        &mut script.static_data.data,
                        &format!("{path}.static_data.data"),
                        violations,
                    );
                }
                AppKind::Composite(composite) => {
                    interp_static_data(
                        &mut composite.static_data.data,
                        &format!("{path}.static_data.data"),
                        violations,
                    );
                }
                AppKind::Mcp(mcp) => {
                    for (tool_index, tool) in mcp.tools.iter_mut().enumerate() {
                        let tool_path = format!("{path}.tools[{tool_index}]");
                        if let McpToolHandlerConfig::Script {
                            evaluator,
                            static_data,
                        } = &mut tool.handler
                        {
                            interp_evaluator_uri(
                                evaluator,
                                &format!("{tool_path}.handler.evaluator.uri"),
                                violations,
                            );
                            interp_static_data(
                                &mut static_data.data,
                                &format!("{tool_path}.handler.static_data.data"),
                                violations,
                            );
                        }
                    }
                    interp_middlewares(&mut mcp.middlewares, &path, violations);
                }
            }
        }
    }
}

/// Interpolates middleware fields (console logger output path).
fn interp_middlewares(middlewares: &mut [Middleware], parent: &str, violations: &mut Violations) {
    for (index, middleware) in middlewares.iter_mut().enumerate() {
        if let MiddlewareKind::ConsoleLogger(logger) = &mut middleware.kind {
            interp_string(
                &mut logger.output,
                &format!("{parent}.middlewares[{index}].output"),
                violations,
            );
        }
    }
}

/// Interpolates an evaluator's URI, leaving inline code verbatim.
fn interp_evaluator_uri(evaluator: &mut EvaluatorConfig, path: &str, violations: &mut Violations) {
    let uri = match evaluator {
        EvaluatorConfig::Risor(inner) | EvaluatorConfig::Starlark(inner) => &mut inner.uri,
        EvaluatorConfig::Extism(inner) => &mut inner.uri,
    };
    if let Some(value) = uri {
        interp_string(value, path, violations);
    }
}

/// Interpolates one string field in place.
fn interp_string(target: &mut String, path: &str, violations: &mut Violations) {
    match interpolate(target) {
        Ok(replaced) => *target = replaced,
        Err(err) => violations.push(path, err.to_string()),
    }
}

/// Interpolates string leaves of a static data mapping, recursively.
fn interp_static_data(data: &mut StaticData, path: &str, violations: &mut Violations) {
    for (key, value) in data.iter_mut() {
        interp_value(value, &format!("{path}.{key}"), violations);
    }
}

/// Interpolates string leaves of a JSON value, recursively.
fn interp_value(value: &mut Value, path: &str, violations: &mut Violations) {
    match value {
        Value::String(text) => match interpolate(text) {
            Ok(replaced) => *text = replaced,
            Err(err) => violations.push(path, err.to_string()),
        },
        Value::Array(items) => {
            for (index, item) in items.iter_mut().enumerate() {
                interp_value(item, &format!("{path}[{index}]"), violations);
            }
        }
        Value::Object(map) => {
            for (key, item) in map.iter_mut() {
                interp_value(item, &format!("{path}.{key}"), violations);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
