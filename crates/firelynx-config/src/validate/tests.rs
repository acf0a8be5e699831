// crates/firelynx-config/src/validate/tests.rs
// ============================================================================
// Module: Validation Unit Tests
// Description: Unit tests for joined validation and interpolation wiring.
// Purpose: Validate violation collection and tree mutation behavior.
// Dependencies: firelynx-config, firelynx-core, serde_json
// ============================================================================

//! ## Overview
//! Exercises the validation passes against hand-built configs: joined
//! reporting, cross references, preset expansion, and the interpolation pass.

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

use serde_json::json;

use super::*;
use crate::model::ConsoleLoggerConfig;
use crate::model::EchoAppConfig;
use crate::model::Endpoint;
use crate::model::HeadersMiddlewareConfig;
use crate::model::InlineEvaluatorConfig;
use crate::model::Listener;
use crate::model::LoggerPreset;
use crate::model::Route;
use crate::model::ScriptAppConfig;
use crate::model::AppDefinition;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn minimal_config() -> Config {
    Config {
        version: CONFIG_VERSION.to_string(),
        logging: crate::model::LoggingConfig::default(),
        listeners: vec![Listener {
            id: "main".into(),
            address: "127.0.0.1:8080".to_string(),
            protocol: crate::model::ListenerProtocol::Http,
            http: crate::model::HttpListenerOptions::default(),
        }],
        endpoints: vec![Endpoint {
            id: "web".into(),
            listener_id: "main".into(),
            routes: vec![Route {
                app_id: "greetz".into(),
                rule: RouteRule::PathPrefix {
                    value: "/".to_string(),
                },
                static_data: StaticData::new(),
            }],
            middlewares: Vec::new(),
        }],
        apps: vec![AppDefinition {
            id: "greetz".into(),
            config: AppKind::Echo(EchoAppConfig {
                response: "Hello, World!".to_string(),
            }),
        }],
    }
}

fn assert_invalid(result: Result<(), ConfigError>, needle: &str) {
    match result {
        Err(error) => {
            let message = error.to_string();
            assert!(message.contains(needle), "error {message:?} did not contain {needle:?}");
        }
        Ok(()) => panic!("expected invalid config containing {needle:?}"),
    }
}

// ============================================================================
// SECTION: Structural Checks
// ============================================================================

#[test]
fn minimal_config_validates() {
    let mut config = minimal_config();
    config.validate().expect("minimal config");
}

#[test]
fn wrong_version_is_rejected() {
    let mut config = minimal_config();
    config.version = "v2".to_string();
    assert_invalid(config.validate(), "unsupported version");
}

#[test]
fn violations_are_joined_not_short_circuited() {
    let mut config = minimal_config();
    config.version = "v0".to_string();
    config.listeners[0].address = "no-port".to_string();
    config.endpoints[0].routes[0].rule = RouteRule::PathPrefix {
        value: "nope".to_string(),
    };
    let message = config.validate().expect_err("invalid config").to_string();
    assert!(message.contains("unsupported version"), "missing version violation: {message}");
    assert!(message.contains("must be host:port"), "missing address violation: {message}");
    assert!(message.contains("must begin with /"), "missing prefix violation: {message}");
}

#[test]
fn duplicate_listener_ids_are_rejected() {
    let mut config = minimal_config();
    let mut duplicate = config.listeners[0].clone();
    duplicate.address = "127.0.0.1:8081".to_string();
    config.listeners.push(duplicate);
    assert_invalid(config.validate(), "duplicate listener id");
}

#[test]
fn endpoint_requires_known_listener_and_route() {
    let mut config = minimal_config();
    config.endpoints[0].listener_id = "ghost".into();
    config.endpoints[0].routes.clear();
    let message = config.validate().expect_err("invalid config").to_string();
    assert!(message.contains("unknown listener"), "{message}");
    assert!(message.contains("at least one route"), "{message}");
}

#[test]
fn builtin_app_reference_needs_no_definition() {
    let mut config = minimal_config();
    config.endpoints[0].routes[0].app_id = "echo".into();
    config.apps.clear();
    config.validate().expect("builtin reference");
}

#[test]
fn unknown_route_app_is_rejected() {
    let mut config = minimal_config();
    config.endpoints[0].routes[0].app_id = "ghost".into();
    assert_invalid(config.validate(), "unknown app");
}

// ============================================================================
// SECTION: App Checks
// ============================================================================

#[test]
fn evaluator_requires_exactly_one_source() {
    let mut config = minimal_config();
    config.apps.push(AppDefinition {
        id: "script".into(),
        config: AppKind::Script(ScriptAppConfig {
            static_data: crate::model::StaticDataConfig::default(),
            evaluator: EvaluatorConfig::Risor(InlineEvaluatorConfig {
                code: Some("1".to_string()),
                uri: Some("file:///tmp/script.risor".to_string()),
                timeout_ms: 0,
            }),
        }),
    });
    assert_invalid(config.validate(), "mutually exclusive");
}

#[test]
fn extism_requires_entrypoint() {
    let mut config = minimal_config();
    config.apps.push(AppDefinition {
        id: "wasm".into(),
        config: AppKind::Script(ScriptAppConfig {
            static_data: crate::model::StaticDataConfig::default(),
            evaluator: EvaluatorConfig::Extism(crate::model::ExtismEvaluatorConfig {
                code: Some("module".to_string()),
                uri: None,
                timeout_ms: 100,
                entrypoint: "  ".to_string(),
            }),
        }),
    });
    assert_invalid(config.validate(), "requires entrypoint");
}

#[test]
fn composite_must_reference_script_apps() {
    let mut config = minimal_config();
    config.apps.push(AppDefinition {
        id: "chain".into(),
        config: AppKind::Composite(crate::model::CompositeAppConfig {
            script_app_ids: vec!["greetz".into()],
            static_data: crate::model::StaticDataConfig::default(),
        }),
    });
    assert_invalid(config.validate(), "must reference a script app");
}

#[test]
fn composite_referencing_composite_is_rejected() {
    let mut config = minimal_config();
    config.apps.push(AppDefinition {
        id: "outer".into(),
        config: AppKind::Composite(crate::model::CompositeAppConfig {
            script_app_ids: vec!["inner".into()],
            static_data: crate::model::StaticDataConfig::default(),
        }),
    });
    config.apps.push(AppDefinition {
        id: "inner".into(),
        config: AppKind::Composite(crate::model::CompositeAppConfig {
            script_app_ids: vec!["outer".into()],
            static_data: crate::model::StaticDataConfig::default(),
        }),
    });
    let message = config.validate().expect_err("cycle rejected").to_string();
    assert!(message.contains("must reference a script app"), "{message}");
}

// ============================================================================
// SECTION: Middleware Checks
// ============================================================================

#[test]
fn duplicate_middleware_ids_within_endpoint_are_rejected() {
    let mut config = minimal_config();
    let middleware = Middleware {
        id: "log".to_string(),
        kind: MiddlewareKind::ConsoleLogger(ConsoleLoggerConfig::default()),
    };
    config.endpoints[0].middlewares = vec![middleware.clone(), middleware];
    assert_invalid(config.validate(), "duplicate middleware id");
}

#[test]
fn empty_headers_middleware_is_rejected() {
    let mut config = minimal_config();
    config.endpoints[0].middlewares = vec![Middleware {
        id: "noop".to_string(),
        kind: MiddlewareKind::Headers(HeadersMiddlewareConfig::default()),
    }];
    assert_invalid(config.validate(), "configures no mutation");
}

#[test]
fn logger_preset_expands_into_fields() {
    let mut config = minimal_config();
    config.endpoints[0].middlewares = vec![Middleware {
        id: "log".to_string(),
        kind: MiddlewareKind::ConsoleLogger(ConsoleLoggerConfig {
            preset: Some(LoggerPreset::Detailed),
            ..ConsoleLoggerConfig::default()
        }),
    }];
    config.validate().expect("valid config");
    let MiddlewareKind::ConsoleLogger(logger) = &config.endpoints[0].middlewares[0].kind else {
        panic!("expected console logger");
    };
    assert!(logger.fields.method);
    assert!(logger.fields.path);
    assert!(logger.fields.status_code);
    assert!(logger.fields.duration);
    assert!(logger.fields.client_ip);
    assert!(logger.fields.request_headers);
    assert!(logger.fields.response_headers);
    assert!(!logger.fields.request_body);
}

// ============================================================================
// SECTION: Interpolation Wiring
// ============================================================================

#[test]
fn echo_response_is_interpolated_with_default() {
    let mut config = minimal_config();
    config.apps[0] = AppDefinition {
        id: "greetz".into(),
        config: AppKind::Echo(EchoAppConfig {
            response: "Hello, ${FIRELYNX_TEST_UNSET_NAME:World}!".to_string(),
        }),
    };
    config.validate().expect("valid config");
    let AppKind::Echo(echo) = &config.apps[0].config else {
        panic!("expected echo app");
    };
    assert_eq!(echo.response, "Hello, World!");
}

#[test]
fn missing_variable_reports_field_path() {
    let mut config = minimal_config();
    config.apps[0] = AppDefinition {
        id: "greetz".into(),
        config: AppKind::Echo(EchoAppConfig {
            response: "${FIRELYNX_TEST_DEFINITELY_UNSET}".to_string(),
        }),
    };
    let message = config.validate().expect_err("missing variable").to_string();
    assert!(message.contains("apps[0].response"), "{message}");
    assert!(message.contains("FIRELYNX_TEST_DEFINITELY_UNSET"), "{message}");
}

#[test]
fn static_data_string_leaves_are_interpolated() {
    let mut config = minimal_config();
    config.endpoints[0].routes[0].static_data.insert(
        "region".to_string(),
        json!({"name": "${FIRELYNX_TEST_UNSET_NAME:eu-west}", "zone": 1}),
    );
    config.validate().expect("valid config");
    assert_eq!(
        config.endpoints[0].routes[0].static_data.get("region"),
        Some(&json!({"name": "eu-west", "zone": 1}))
    );
}

#[test]
fn app_ids_are_never_interpolated() {
    let mut config = minimal_config();
    config.apps[0].id = "${NOT_A_VAR}".into();
    config.endpoints[0].routes[0].app_id = "${NOT_A_VAR}".into();
    config.validate().expect("ids stay literal");
    assert_eq!(config.apps[0].id.as_str(), "${NOT_A_VAR}");
}
