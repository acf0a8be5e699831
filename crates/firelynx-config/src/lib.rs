// crates/firelynx-config/src/lib.rs
// ============================================================================
// Module: Firelynx Config Library
// Description: Canonical config model, loading, and validation.
// Purpose: Single source of truth for firelynx.toml semantics.
// Dependencies: firelynx-core, serde, toml
// ============================================================================

//! ## Overview
//! `firelynx-config` defines the canonical configuration model for firelynx:
//! listeners, endpoints with routes and middlewares, named apps, and logging
//! settings. Loading is strict and fail-closed (size caps, UTF-8 only), and
//! validation joins every violation into one report so operators see the
//! whole picture instead of fixing errors one at a time. Environment
//! interpolation (`${VAR}` / `${VAR:default}`) is applied during validation
//! to the fields explicitly marked interpolatable; identifiers and inline
//! script code are never rewritten.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod interpolate;
pub mod model;
pub mod validate;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use interpolate::InterpolateError;
pub use interpolate::interpolate;
pub use interpolate::interpolate_with;
pub use model::*;
