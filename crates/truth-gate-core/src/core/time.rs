// crates/truth-gate-core/src/core/time.rs
// ============================================================================
// Module: Truth Gate Time Model
// Description: Canonical timestamp representations for evidence and results.
// Purpose: Provide deterministic, replayable time values across audit records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Truth Gate embeds explicit time values in evidence items and audit results
//! to keep offline re-verification deterministic. The core engine never reads
//! wall-clock time directly; hosts supply timestamps at the invocation
//! boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used in audit requests, evidence items, and results.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Monotonic logical time value.
    Logical(u64),
}

impl Timestamp {
    /// Returns the timestamp as unix milliseconds when available.
    #[must_use]
    pub const fn as_unix_millis(&self) -> Option<i64> {
        match self {
            Self::UnixMillis(value) => Some(*value),
            Self::Logical(_) => None,
        }
    }

    /// Returns the timestamp as logical time when available.
    #[must_use]
    pub const fn as_logical(&self) -> Option<u64> {
        match self {
            Self::UnixMillis(_) => None,
            Self::Logical(value) => Some(*value),
        }
    }

    /// Returns a stable string form used as chain-hash input.
    #[must_use]
    pub fn chain_repr(&self) -> String {
        match self {
            Self::UnixMillis(value) => format!("unix_millis:{value}"),
            Self::Logical(value) => format!("logical:{value}"),
        }
    }
}
