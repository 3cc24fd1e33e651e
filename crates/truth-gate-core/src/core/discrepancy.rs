// crates/truth-gate-core/src/core/discrepancy.rs
// ============================================================================
// Module: Truth Gate Discrepancies
// Description: Detected mismatches between claimed values and observed reality.
// Purpose: Give every failed verification an itemized, severity-ranked cause.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Discrepancies are derived findings, not ledger evidence; the inputs that
//! produced them are recorded as evidence items. A discrepancy always names a
//! stable kind code so callers can match outcomes programmatically, and final
//! results deduplicate by `(kind, claim_field)`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::AgentName;
use crate::core::identifiers::ClaimField;

// ============================================================================
// SECTION: Severity
// ============================================================================

/// Discrepancy severity, ordered from least to most severe.
///
/// # Invariants
/// - Variants are stable for serialization and exit-code mapping.
/// - `Ord` ranks `Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational mismatch.
    Low,
    /// Noteworthy mismatch that does not invalidate the claim alone.
    Medium,
    /// Serious mismatch; flips per-field verdicts.
    High,
    /// Claim-invalidating mismatch; forces an unverified outcome.
    Critical,
}

impl Severity {
    /// Returns the stable string label for the severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

// ============================================================================
// SECTION: Discrepancy
// ============================================================================

/// A detected mismatch between a claimed value and observed reality.
///
/// # Invariants
/// - `kind` is a stable code such as `file-count-mismatch` or `agent-failure`.
/// - Deduplication key is `(kind, claim_field)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// Stable discrepancy kind code.
    pub kind: String,
    /// Severity of the mismatch.
    pub severity: Severity,
    /// Claim field the mismatch concerns, when field-scoped.
    pub claim_field: Option<ClaimField>,
    /// Value asserted by the claim.
    pub claimed: Option<Value>,
    /// Value observed by the agent.
    pub actual: Option<Value>,
    /// Human-readable description of the mismatch.
    pub description: String,
}

impl Discrepancy {
    /// Creates a field-scoped discrepancy.
    #[must_use]
    pub fn for_field(
        kind: impl Into<String>,
        severity: Severity,
        field: ClaimField,
        claimed: Value,
        actual: Value,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity,
            claim_field: Some(field),
            claimed: Some(claimed),
            actual: Some(actual),
            description: description.into(),
        }
    }

    /// Creates a discrepancy not tied to a single claim field.
    #[must_use]
    pub fn unscoped(
        kind: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity,
            claim_field: None,
            claimed: None,
            actual: None,
            description: description.into(),
        }
    }

    /// Creates the standard synthesized discrepancy for a failed agent.
    #[must_use]
    pub fn agent_failure(agent: AgentName, reason: impl Into<String>) -> Self {
        Self {
            kind: "agent-failure".to_string(),
            severity: Severity::High,
            claim_field: None,
            claimed: None,
            actual: None,
            description: format!("agent {agent} failed: {}", reason.into()),
        }
    }

    /// Returns the deduplication key `(kind, claim_field)`.
    #[must_use]
    pub fn dedup_key(&self) -> (String, Option<String>) {
        (
            self.kind.clone(),
            self.claim_field.as_ref().map(|field| field.as_str().to_string()),
        )
    }
}
