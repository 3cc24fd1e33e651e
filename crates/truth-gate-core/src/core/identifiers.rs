// crates/truth-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Truth Gate Identifiers
// Description: Canonical opaque identifiers and closed label enums.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical identifiers used throughout Truth Gate.
//! String-backed identifiers are opaque and serialize transparently; the
//! agent roster and pass labels are closed enums with stable string forms so
//! results, ledgers, and reports can be matched programmatically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Audit request identifier supplied by the caller.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditId(String);

impl AuditId {
    /// Creates a new audit identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for AuditId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AuditId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Evidence item identifier assigned when an agent drafts the item.
///
/// # Invariants
/// - Unique within one audit request; stable across ledger finalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceId(String);

impl EvidenceId {
    /// Creates a new evidence identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Claim field name (metric key) within a claim.
///
/// # Invariants
/// - Opaque UTF-8 string; claim validation rejects empty field names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimField(String);

impl ClaimField {
    /// Creates a new claim field name.
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self(field.into())
    }

    /// Returns the field name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClaimField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ClaimField {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ClaimField {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Agent Roster
// ============================================================================

/// Names of the fixed verification agent roster.
///
/// # Invariants
/// - Variants are stable for serialization and ledger attribution.
/// - New agents are added as new variants, never via runtime reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentName {
    /// Parses the claim and report text for internal inconsistencies.
    ReportVerifier,
    /// Counts actual files, lines, and directories under the target.
    FsScanner,
    /// Parses source for structural metrics and broken syntax.
    CodeAnalyzer,
    /// Compares the claim against version-control metadata and timestamps.
    CrossReferencer,
    /// Statistical anomaly detection over sibling agent evidence.
    DeepAnalytics,
    /// Diffs claimed deliverables against what exists on disk.
    GapScanner,
    /// Computes content hashes and folds them into the ledger.
    HashIndex,
}

impl AgentName {
    /// All roster agents in canonical order.
    pub const ALL: [Self; 7] = [
        Self::ReportVerifier,
        Self::FsScanner,
        Self::CodeAnalyzer,
        Self::CrossReferencer,
        Self::DeepAnalytics,
        Self::GapScanner,
        Self::HashIndex,
    ];

    /// Returns the stable string label for the agent.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReportVerifier => "report-verifier",
            Self::FsScanner => "fs-scanner",
            Self::CodeAnalyzer => "code-analyzer",
            Self::CrossReferencer => "cross-referencer",
            Self::DeepAnalytics => "deep-analytics",
            Self::GapScanner => "gap-scanner",
            Self::HashIndex => "hash-index",
        }
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Pass Labels
// ============================================================================

/// Verification pass labels for the triple-verification protocol.
///
/// # Invariants
/// - Passes always execute in order A, B, C with no skipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassLabel {
    /// Pass A: self-check baseline.
    A,
    /// Pass B: independent re-derivation.
    B,
    /// Pass C: adversarial challenge.
    C,
}

impl PassLabel {
    /// All passes in execution order.
    pub const ALL: [Self; 3] = [Self::A, Self::B, Self::C];

    /// Returns the stable string label for the pass.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
        }
    }
}

impl fmt::Display for PassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
