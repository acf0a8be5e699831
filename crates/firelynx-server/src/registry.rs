// crates/firelynx-server/src/registry.rs
// ============================================================================
// Module: App Registry
// Description: Snapshot registry of app instances built per commit.
// Purpose: Resolve app ids to immutable shared instances.
// Dependencies: crate::apps, firelynx-config, firelynx-engines, firelynx-mcp
// ============================================================================

//! ## Overview
//! The registry is rebuilt from scratch on every transaction prepare and
//! published as part of the topology snapshot; it is never mutated in place.
//! Script apps compile first so composite apps can resolve their members to
//! instances, and built-in apps (`echo`) are injected into every registry so
//! routes may reference them without a config entry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use firelynx_config::AppKind;
use firelynx_config::Config;
use firelynx_config::McpToolHandlerConfig;
use firelynx_core::App;
use firelynx_core::AppId;
use firelynx_core::CompileError;
use firelynx_engines::EvaluatorFactory;
use firelynx_mcp::BuiltinTool;
use firelynx_mcp::McpError;
use firelynx_mcp::McpService;
use firelynx_mcp::PromptSpec;
use firelynx_mcp::ScriptTool;
use firelynx_mcp::ServerInfo;
use firelynx_mcp::ToolHandler;
use firelynx_mcp::ToolSpec;
use thiserror::Error;

use crate::apps::CompositeApp;
use crate::apps::EchoApp;
use crate::apps::McpApp;
use crate::apps::RequestEchoApp;
use crate::apps::ScriptApp;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced while building the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Evaluator compilation failed.
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// MCP service construction failed.
    #[error(transparent)]
    Mcp(#[from] McpError),
    /// A composite member did not resolve to a script app.
    #[error("app {0} does not resolve to a script app")]
    UnresolvedMember(AppId),
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Immutable snapshot of app instances keyed by id.
#[derive(Clone, Default)]
pub struct AppRegistry {
    /// App instances by id.
    apps: BTreeMap<AppId, Arc<dyn App>>,
}

impl AppRegistry {
    /// Builds the registry for a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when an evaluator fails to compile or an
    /// MCP service cannot be constructed.
    pub fn build(config: &Config, factory: &EvaluatorFactory) -> Result<Self, RegistryError> {
        let mut apps: BTreeMap<AppId, Arc<dyn App>> = BTreeMap::new();
        apps.insert(AppId::new("echo"), Arc::new(RequestEchoApp));

        // Script apps compile first so composites can resolve instances.
        let mut scripts: BTreeMap<AppId, Arc<ScriptApp>> = BTreeMap::new();
        for definition in &config.apps {
            if let AppKind::Script(script) = &definition.config {
                let spec = script.evaluator.to_spec();
                let evaluator = factory.compile(&spec)?;
                let app = Arc::new(ScriptApp::new(
                    evaluator,
                    script.static_data.data.clone(),
                    script.static_data.merge_mode,
                    spec.timeout,
                ));
                scripts.insert(definition.id.clone(), app);
            }
        }

        for definition in &config.apps {
            let app: Arc<dyn App> = match &definition.config {
                AppKind::Echo(echo) => Arc::new(EchoApp::new(echo.response.clone())),
                AppKind::Script(_) => match scripts.get(&definition.id) {
                    Some(script) => Arc::clone(script) as Arc<dyn App>,
                    None => return Err(RegistryError::UnresolvedMember(definition.id.clone())),
                },
                AppKind::Composite(composite) => {
                    let mut members = Vec::with_capacity(composite.script_app_ids.len());
                    for member_id in &composite.script_app_ids {
                        let member = scripts
                            .get(member_id)
                            .ok_or_else(|| RegistryError::UnresolvedMember(member_id.clone()))?;
                        members.push(Arc::clone(member));
                    }
                    Arc::new(CompositeApp::new(
                        members,
                        composite.static_data.data.clone(),
                        composite.static_data.merge_mode,
                    ))
                }
                AppKind::Mcp(mcp) => Arc::new(McpApp::new(Arc::new(build_mcp_service(
                    mcp, factory,
                )?))),
            };
            apps.insert(definition.id.clone(), app);
        }
        Ok(Self {
            apps,
        })
    }

    /// Returns the app instance for an id.
    #[must_use]
    pub fn app(&self, id: &AppId) -> Option<Arc<dyn App>> {
        self.apps.get(id).map(Arc::clone)
    }

    /// Returns the registered app ids in stable order.
    #[must_use]
    pub fn ids(&self) -> Vec<AppId> {
        self.apps.keys().cloned().collect()
    }
}

// ============================================================================
// SECTION: MCP Service Construction
// ============================================================================

/// Builds the MCP service for one configured app.
fn build_mcp_service(
    mcp: &firelynx_config::McpAppConfig,
    factory: &EvaluatorFactory,
) -> Result<McpService, RegistryError> {
    let mut tools = Vec::with_capacity(mcp.tools.len());
    for tool in &mcp.tools {
        let handler = match &tool.handler {
            McpToolHandlerConfig::Builtin { .. } => ToolHandler::Builtin(BuiltinTool::Echo),
            McpToolHandlerConfig::Script {
                evaluator,
                static_data,
            } => {
                let spec = evaluator.to_spec();
                let compiled = factory.compile(&spec)?;
                ToolHandler::Script(ScriptTool {
                    evaluator: compiled,
                    timeout: spec.timeout,
                    data: static_data.data.clone(),
                })
            }
        };
        tools.push(ToolSpec {
            name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: tool.input_schema.clone(),
            output_schema: tool.output_schema.clone(),
            handler,
        });
    }
    let prompts = mcp
        .prompts
        .iter()
        .map(|prompt| PromptSpec {
            name: prompt.name.clone(),
            description: prompt.description.clone(),
            template: prompt.template.clone(),
        })
        .collect();
    let info = ServerInfo {
        name: mcp.server_name.clone(),
        version: mcp.server_version.clone(),
    };
    Ok(McpService::new(info, tools, prompts)?)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
