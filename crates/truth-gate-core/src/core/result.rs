// crates/truth-gate-core/src/core/result.rs
// ============================================================================
// Module: Truth Gate Results
// Description: Per-agent, per-pass, and final audit result records.
// Purpose: Capture verification outcomes with calibrated confidence scores.
// Dependencies: crate::core::{discrepancy, identifiers}, serde
// ============================================================================

//! ## Overview
//! Results flow upward: each agent produces an `AgentResult` per pass, the
//! orchestrator aggregates a pass into a `PassReport`, and the truth gate
//! folds three passes into one immutable `AuditResult`. A result always
//! explains an unverified outcome through its discrepancy list; there is no
//! bare failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::discrepancy::Discrepancy;
use crate::core::discrepancy::Severity;
use crate::core::identifiers::AgentName;
use crate::core::identifiers::AuditId;
use crate::core::identifiers::ClaimField;
use crate::core::identifiers::EvidenceId;
use crate::core::identifiers::PassLabel;

// ============================================================================
// SECTION: Agent Results
// ============================================================================

/// Result produced by one agent during one pass.
///
/// # Invariants
/// - `confidence` lies in `[0, 1]` and expresses support for the claim given
///   this agent's evidence.
/// - `checked_fields` lists the claim fields the agent actually examined; an
///   agent with nothing applicable reports an empty list and is excluded
///   from the weighted average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    /// Producing agent.
    pub agent: AgentName,
    /// Whether this agent considers the claim verified.
    pub verified: bool,
    /// Support for the claim in `[0, 1]`.
    pub confidence: f64,
    /// Mismatches found by this agent.
    pub discrepancies: Vec<Discrepancy>,
    /// Evidence items recorded by this agent.
    pub evidence_ids: Vec<EvidenceId>,
    /// Claim fields this agent examined.
    pub checked_fields: Vec<ClaimField>,
    /// Wall time the investigation took, in milliseconds.
    pub duration_ms: u64,
}

impl AgentResult {
    /// Synthesizes the standard failure result for a timed-out or crashed
    /// agent: zero confidence and one high-severity `agent-failure`
    /// discrepancy.
    #[must_use]
    pub fn failure(agent: AgentName, reason: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            agent,
            verified: false,
            confidence: 0.0,
            discrepancies: vec![Discrepancy::agent_failure(agent, reason)],
            evidence_ids: Vec::new(),
            checked_fields: Vec::new(),
            duration_ms,
        }
    }

    /// Returns true when the result was synthesized for a failed agent.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.discrepancies.iter().any(|d| d.kind == "agent-failure")
    }
}

// ============================================================================
// SECTION: Pass Reports
// ============================================================================

/// Aggregated result of one verification pass.
///
/// # Invariants
/// - `field_verdicts` holds one micro-decision per claim field: true iff no
///   discrepancy of severity high or critical names the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassReport {
    /// Pass label.
    pub pass: PassLabel,
    /// Whether the pass verified the claim.
    pub verified: bool,
    /// Weighted confidence for the pass in `[0, 1]`.
    pub confidence: f64,
    /// Merged discrepancies from all agents in the pass.
    pub discrepancies: Vec<Discrepancy>,
    /// Per-agent results in completion order.
    pub agent_results: Vec<AgentResult>,
    /// Ledger tail hash at pass finalization.
    pub evidence_tail: String,
    /// Per-claim-field micro-decisions.
    pub field_verdicts: BTreeMap<ClaimField, bool>,
}

impl PassReport {
    /// Returns true when any discrepancy reaches the given severity.
    #[must_use]
    pub fn has_severity(&self, severity: Severity) -> bool {
        self.discrepancies.iter().any(|d| d.severity >= severity)
    }

    /// Returns the number of synthesized agent failures in the pass.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.agent_results.iter().filter(|result| result.is_failure()).count()
    }

    /// Condenses the report into the summary embedded in the final result.
    #[must_use]
    pub fn summary(&self) -> PassSummary {
        PassSummary {
            pass: self.pass,
            verified: self.verified,
            confidence: self.confidence,
            discrepancy_count: self.discrepancies.len(),
            agent_failures: self.failure_count(),
            evidence_tail: self.evidence_tail.clone(),
        }
    }
}

/// Condensed per-pass summary embedded in the final audit result.
///
/// # Invariants
/// - Mirrors the pass report it was derived from; never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassSummary {
    /// Pass label.
    pub pass: PassLabel,
    /// Whether the pass verified the claim.
    pub verified: bool,
    /// Weighted confidence for the pass.
    pub confidence: f64,
    /// Number of merged discrepancies.
    pub discrepancy_count: usize,
    /// Number of synthesized agent failures.
    pub agent_failures: usize,
    /// Ledger tail hash at pass finalization.
    pub evidence_tail: String,
}

// ============================================================================
// SECTION: Audit Result
// ============================================================================

/// Final audit result returned to the caller. Immutable once emitted.
///
/// # Invariants
/// - `verified` is the conjunction of all three pass verdicts.
/// - `confidence` is the minimum of the three pass confidences.
/// - `discrepancies` is the union of all passes, deduplicated by
///   `(kind, claim_field)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    /// Audit request identifier.
    pub request_id: AuditId,
    /// Final verified decision.
    pub verified: bool,
    /// Conservative aggregate confidence.
    pub confidence: f64,
    /// Deduplicated discrepancies across all passes.
    pub discrepancies: Vec<Discrepancy>,
    /// Final ledger tail hash.
    pub evidence_ledger_hash: String,
    /// Per-pass summaries in execution order A, B, C.
    pub passes: Vec<PassSummary>,
    /// Fraction of claim fields on which passes A and B agreed.
    pub agreement_ab: f64,
    /// True when A/B agreement fell below the configured threshold.
    pub disputed: bool,
    /// Fraction of agent invocations that completed without failure.
    pub health_score: f64,
}

impl AuditResult {
    /// Returns true when any discrepancy reaches the given severity.
    #[must_use]
    pub fn has_severity(&self, severity: Severity) -> bool {
        self.discrepancies.iter().any(|d| d.severity >= severity)
    }
}
