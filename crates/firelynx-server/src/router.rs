// crates/firelynx-server/src/router.rs
// ============================================================================
// Module: Endpoint Router
// Description: Ordered prefix matching of request paths to routes.
// Purpose: Produce (app, route static data) for each request.
// Dependencies: crate::apps, firelynx-core
// ============================================================================

//! ## Overview
//! Each endpoint owns an ordered route list. A route matches when the request
//! path starts with its prefix; the first match wins and contributes its
//! static data to the execution context. Routers are built once per commit
//! and never mutated afterwards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use firelynx_core::App;
use firelynx_core::AppId;
use firelynx_core::StaticData;

// ============================================================================
// SECTION: Compiled Routes
// ============================================================================

/// Route with its app instance resolved at build time.
///
/// # Invariants
/// - `prefix` is non-empty and begins with `/` (enforced by validation).
#[derive(Clone)]
pub struct CompiledRoute {
    /// Target app identifier, kept for logging and diagnostics.
    pub app_id: AppId,
    /// Path prefix this route matches.
    pub prefix: String,
    /// Route-level static data merged over the app's data.
    pub static_data: StaticData,
    /// Resolved app instance.
    pub app: Arc<dyn App>,
}

impl std::fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("app_id", &self.app_id)
            .field("prefix", &self.prefix)
            .field("static_data", &self.static_data)
            .finish_non_exhaustive()
    }
}

/// Ordered route matcher for one endpoint.
#[derive(Clone, Default, Debug)]
pub struct EndpointRouter {
    /// Routes in declared order.
    routes: Vec<CompiledRoute>,
}

impl EndpointRouter {
    /// Builds a router over the given routes, preserving declared order.
    #[must_use]
    pub fn new(routes: Vec<CompiledRoute>) -> Self {
        Self {
            routes,
        }
    }

    /// Returns the first route whose prefix matches the path.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<&CompiledRoute> {
        self.routes.iter().find(|route| path.starts_with(&route.prefix))
    }

    /// Returns the number of configured routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true when no routes are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
