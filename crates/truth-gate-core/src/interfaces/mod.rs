// crates/truth-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Truth Gate Interfaces
// Description: Backend-agnostic contracts for agents and strategy advisors.
// Purpose: Define the pluggable surfaces used by the audit runtime.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Two contracts drive the engine: [`VerificationAgent`], implemented by
//! every roster agent, and [`StrategyAdvisor`], implemented by the inference
//! collaborator and its deterministic fallback. Implementations must be
//! filesystem read-only, bounded, and fail closed on missing or invalid
//! data; the orchestrator downgrades agent errors to discrepancies rather
//! than letting them cross the pass boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::AuditRequest;
use crate::core::claim::Claim;
use crate::core::config::SourceClass;
use crate::core::evidence::AgentEvidenceLog;
use crate::core::evidence::EvidenceItem;
use crate::core::identifiers::AgentName;
use crate::core::identifiers::PassLabel;
use crate::core::result::AgentResult;
use crate::core::result::PassSummary;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Pass Modes and Independence
// ============================================================================

/// Investigation posture for a pass.
///
/// # Invariants
/// - Variants are stable for serialization and agent dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassMode {
    /// Pass A: establish a baseline with no constraint.
    SelfCheck,
    /// Pass B: re-derive everything without reading earlier evidence.
    Independent,
    /// Pass C: actively search for evidence contradicting earlier passes.
    Adversarial,
}

/// Constraint forbidding an agent from reading named evidence.
///
/// # Invariants
/// - Enforced by [`LedgerView`] on every read; agents never see forbidden
///   items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndependenceConstraint {
    /// Passes whose evidence is off limits.
    pub forbidden_passes: BTreeSet<PassLabel>,
    /// Agents whose evidence is off limits.
    pub forbidden_agents: BTreeSet<AgentName>,
}

impl IndependenceConstraint {
    /// Returns an unconstrained value.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns a constraint forbidding one pass's evidence.
    #[must_use]
    pub fn forbid_pass(pass: PassLabel) -> Self {
        Self {
            forbidden_passes: BTreeSet::from([pass]),
            forbidden_agents: BTreeSet::new(),
        }
    }

    /// Returns true when the item may be read under this constraint.
    #[must_use]
    pub fn permits(&self, item: &EvidenceItem) -> bool {
        if self.forbidden_agents.contains(&item.producer) {
            return false;
        }
        match item.pass {
            Some(pass) => !self.forbidden_passes.contains(&pass),
            None => true,
        }
    }
}

// ============================================================================
// SECTION: Ledger View
// ============================================================================

/// Constraint-filtered, read-only snapshot of the evidence ledger.
///
/// # Invariants
/// - The snapshot is taken at pass start; in-pass sibling evidence is never
///   visible (sub-ledgers merge only at finalization).
#[derive(Debug, Clone)]
pub struct LedgerView {
    /// Snapshot of chained items at pass start.
    items: Vec<EvidenceItem>,
    /// Active independence constraint.
    constraint: IndependenceConstraint,
}

impl LedgerView {
    /// Creates a view over a ledger snapshot under a constraint.
    #[must_use]
    pub fn new(items: Vec<EvidenceItem>, constraint: IndependenceConstraint) -> Self {
        Self {
            items,
            constraint,
        }
    }

    /// Returns the readable items in chain order.
    pub fn items(&self) -> impl Iterator<Item = &EvidenceItem> {
        self.items.iter().filter(|item| self.constraint.permits(item))
    }

    /// Returns the active constraint.
    #[must_use]
    pub const fn constraint(&self) -> &IndependenceConstraint {
        &self.constraint
    }
}

// ============================================================================
// SECTION: Agent Contract
// ============================================================================

/// Context provided to agents for one investigation.
///
/// # Invariants
/// - Values are snapshots; agents must not mutate shared state beyond their
///   own evidence log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentContext {
    /// Pass under execution.
    pub pass: PassLabel,
    /// Investigation posture for the pass.
    pub mode: PassMode,
    /// Active independence constraint (also carried by the ledger view).
    pub constraint: IndependenceConstraint,
    /// Timestamp agents use for all recorded evidence in this pass.
    pub now: Timestamp,
    /// Maximum files the agent may visit under the target.
    pub max_files_scanned: usize,
    /// Maximum bytes the agent may read from a single file.
    pub max_file_bytes: usize,
}

/// Agent-internal errors.
///
/// The orchestrator converts these into a synthesized failure
/// [`AgentResult`]; they never propagate past the pass boundary.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Target path could not be read.
    #[error("target unreadable: {0}")]
    TargetUnreadable(String),
    /// Agent-internal failure.
    #[error("agent failure: {0}")]
    Internal(String),
}

/// Contract every verification agent implements.
///
/// Implementations must be read-only on the filesystem and bounded by the
/// context limits; long-running work is cut off by the orchestrator's
/// deadline.
pub trait VerificationAgent: Send + Sync {
    /// Returns the agent's roster name.
    fn name(&self) -> AgentName;

    /// Returns the source-of-truth class used for weighting.
    fn source_class(&self) -> SourceClass;

    /// Investigates the claim, recording evidence into `log`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on internal failure; the orchestrator
    /// downgrades it to a failure result.
    fn investigate(
        &self,
        request: &AuditRequest,
        view: &LedgerView,
        log: &mut AgentEvidenceLog,
        ctx: &AgentContext,
    ) -> Result<AgentResult, AgentError>;
}

// ============================================================================
// SECTION: Strategy Advisor
// ============================================================================

/// Context handed to the strategy advisor before a pass.
///
/// # Invariants
/// - Contains summaries only; raw evidence never leaves the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyContext {
    /// Audit request identifier.
    pub request_id: String,
    /// Target path as a display string.
    pub target: String,
    /// The claim under verification.
    pub claim: Claim,
    /// Pass about to run.
    pub next_pass: PassLabel,
    /// Summaries of completed passes.
    pub prior_passes: Vec<PassSummary>,
}

/// Structured recommendation returned by an advisor.
///
/// # Invariants
/// - `recommended_weights` are multipliers in `[0, 4]` applied on top of the
///   source-class weights; missing agents default to 1.0.
/// - `risk_score` lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAdvice {
    /// Per-agent weight multipliers.
    pub recommended_weights: BTreeMap<AgentName, f64>,
    /// Estimated risk that the claim is false.
    pub risk_score: f64,
}

impl StrategyAdvice {
    /// Returns the weight multiplier for an agent (1.0 when absent).
    #[must_use]
    pub fn multiplier(&self, agent: AgentName) -> f64 {
        self.recommended_weights.get(&agent).copied().unwrap_or(1.0)
    }

    /// Returns true when all multipliers and the risk score are in range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.risk_score.is_finite()
            && (0.0 ..= 1.0).contains(&self.risk_score)
            && self
                .recommended_weights
                .values()
                .all(|weight| weight.is_finite() && (0.0 ..= 4.0).contains(weight))
    }
}

impl Default for StrategyAdvice {
    fn default() -> Self {
        Self {
            recommended_weights: BTreeMap::new(),
            risk_score: 0.5,
        }
    }
}

/// Inference collaborator errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Collaborator is unreachable or timed out.
    #[error("inference unavailable: {0}")]
    Unavailable(String),
    /// Collaborator returned a malformed or schema-violating response.
    #[error("inference response invalid: {0}")]
    InvalidResponse(String),
}

/// Strategy advisor consulted by the decision engine before each pass.
///
/// Implementations are untrusted; the decision engine validates every advice
/// value and falls back to the static strategy on any violation.
pub trait StrategyAdvisor: Send + Sync {
    /// Produces a recommendation for the next pass.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError`] when the collaborator is unavailable or
    /// its response is invalid.
    fn advise(&self, ctx: &StrategyContext) -> Result<StrategyAdvice, InferenceError>;
}
