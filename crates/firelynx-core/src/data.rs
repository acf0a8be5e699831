// crates/firelynx-core/src/data.rs
// ============================================================================
// Module: Firelynx Static Data
// Description: Static data mappings and merge semantics for app execution.
// Purpose: Compose config-time data sources into the per-request `data` key.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Static data is a config-time mapping of string keys to JSON values. Apps
//! carry their own static data, routes may overlay more, and composite apps
//! contribute a shared base. Merging is always shallow: on key collision the
//! later source wins and values are replaced wholesale, never deep-merged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Static Data
// ============================================================================

/// Static data mapping merged into the per-request context under `data`.
pub type StaticData = BTreeMap<String, Value>;

/// Merge behavior when static data sources collide on a key.
///
/// # Invariants
/// - Variants are stable for serialization and config matching.
/// - All modes merge shallowly; nested values are replaced, not combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// No mode was specified; behaves as [`MergeMode::Last`].
    #[default]
    Unspecified,
    /// The later source replaces the value on key collision.
    Last,
    /// Colliding keys are deduplicated; the later value wins.
    Unique,
}

/// Merges `overlay` onto `base` according to `mode`.
///
/// The result contains every key of both mappings; on collision the overlay
/// value replaces the base value. `Last`, `Unique`, and `Unspecified` share
/// this outcome today — `Unique` is documented as a deduplication rule and
/// never nests.
#[must_use]
pub fn merge_static_data(base: &StaticData, overlay: &StaticData, mode: MergeMode) -> StaticData {
    let mut merged = base.clone();
    match mode {
        MergeMode::Unspecified | MergeMode::Last | MergeMode::Unique => {
            for (key, value) in overlay {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}

// ============================================================================
// SECTION: Tests
// ============================================================================
