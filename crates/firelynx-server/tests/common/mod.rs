//! Shared harness for the firelynx-server scenario suite.
// crates/firelynx-server/tests/common/mod.rs
// =============================================================================
// Module: Scenario Test Harness
// Description: Boot helpers and a scenario script engine for end-to-end tests.
// Purpose: Drive the full dispatch plane over real ephemeral sockets.
// =============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    dead_code,
    reason = "Test-only helpers; not every suite uses every item."
)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use firelynx_config::Config;
use firelynx_core::CompileError;
use firelynx_core::CompiledEvaluator;
use firelynx_core::Dialect;
use firelynx_core::EvalError;
use firelynx_core::EvalInput;
use firelynx_core::EvaluatorSpec;
use firelynx_core::ScriptEngine;
use firelynx_engines::EngineRegistry;
use firelynx_server::Supervisor;
use serde_json::Value;
use serde_json::json;

/// Engine resolving the scenario scripts the suite's configs reference.
///
/// Unknown script text is a compile error, which doubles as the
/// syntax-surfaces-before-commit check.
pub struct ScenarioEngine;

impl ScriptEngine for ScenarioEngine {
    fn compile(
        &self,
        source: &[u8],
        _spec: &EvaluatorSpec,
    ) -> Result<Arc<dyn CompiledEvaluator>, CompileError> {
        let text = std::str::from_utf8(source)
            .map_err(|_| CompileError::Engine("script must be utf-8".to_string()))?;
        match text {
            "scenario:risor-demo" => Ok(Arc::new(RisorDemoEvaluator)),
            "scenario:sleep-50ms" => Ok(Arc::new(SleepEvaluator {
                sleep: Duration::from_millis(50),
            })),
            "scenario:sleep-500ms" => Ok(Arc::new(SleepEvaluator {
                sleep: Duration::from_millis(500),
            })),
            other => Err(CompileError::Engine(format!("unknown scenario script {other:?}"))),
        }
    }
}

/// Evaluator producing the demo shape for the script scenario.
struct RisorDemoEvaluator;

impl CompiledEvaluator for RisorDemoEvaluator {
    fn evaluate(&self, input: &EvalInput) -> Result<Value, EvalError> {
        let data = &input.context["data"];
        let request = &input.context["request"];
        let user_agent = request["headers"]["user-agent"][0].clone();
        Ok(json!({
            "message": "Hello from Risor!",
            "service": data["service_name"],
            "version": data["version"],
            "environment": data["environment"],
            "request_info": {
                "method": request["method"],
                "path": request["url"]["path"],
                "user_agent": user_agent,
            },
            "timestamp": "2026-08-01T00:00:00Z",
        }))
    }
}

/// Evaluator sleeping for a fixed interval before returning.
struct SleepEvaluator {
    /// How long each evaluation blocks.
    sleep: Duration,
}

impl CompiledEvaluator for SleepEvaluator {
    fn evaluate(&self, _input: &EvalInput) -> Result<Value, EvalError> {
        std::thread::sleep(self.sleep);
        Ok(json!("slept"))
    }
}

/// Builds the engine registry used by every scenario.
pub fn scenario_engines() -> Arc<EngineRegistry> {
    let mut registry = EngineRegistry::new();
    registry.register(Dialect::Risor, Arc::new(ScenarioEngine));
    registry.register(Dialect::Starlark, Arc::new(ScenarioEngine));
    Arc::new(registry)
}

/// Boots a supervisor on the given config and returns the bound address.
pub async fn boot(config_toml: &str) -> (Supervisor, SocketAddr) {
    let supervisor = Supervisor::new(scenario_engines());
    let config = Config::from_toml_str(config_toml).expect("scenario config parses");
    supervisor.apply_config(config).await.expect("scenario config commits");
    let addresses = supervisor.listener_addresses().await;
    let address = *addresses.values().next().expect("one bound listener");
    (supervisor, address)
}

/// Applies a replacement config to a running supervisor.
pub async fn push(supervisor: &Supervisor, config_toml: &str) {
    let config = Config::from_toml_str(config_toml).expect("replacement config parses");
    supervisor.apply_config(config).await.expect("replacement config commits");
}

/// Picks a currently free loopback port.
///
/// The port is released before returning, so configs that must share one
/// concrete address across commits can pin it.
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("ephemeral bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}
