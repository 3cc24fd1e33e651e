// crates/truth-gate-core/src/runtime/truth_gate.rs
// ============================================================================
// Module: Truth Gate Protocol
// Description: Triple-verification state machine and conservative aggregation.
// Purpose: Derive the final verified decision from passes A, B, and C.
// Dependencies: crate::{core, interfaces, runtime}, tokio
// ============================================================================

//! ## Overview
//! The truth gate always runs three passes in order with no skipping: A
//! (self-check), B (independent re-derivation, forbidden from reading A's
//! evidence), and C (adversarial challenge). The final decision is
//! conservative: verified only when every pass verified, confidence the
//! minimum over the passes, discrepancies the deduplicated union. A single
//! invocation is terminal; re-verification is a new request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;

use crate::core::AuditConfig;
use crate::core::AuditRequest;
use crate::core::AuditResult;
use crate::core::ClaimError;
use crate::core::ConfigError;
use crate::core::EvidenceLedger;
use crate::core::PassLabel;
use crate::core::discrepancy::Discrepancy;
use crate::core::result::PassReport;
use crate::interfaces::IndependenceConstraint;
use crate::interfaces::PassMode;
use crate::interfaces::StrategyContext;
use crate::runtime::orchestrator::AuditOrchestrator;
use crate::runtime::queen::DecisionEngine;

// ============================================================================
// SECTION: Audit Errors
// ============================================================================

/// Fatal audit errors. Everything else degrades into the discrepancy model.
///
/// # Invariants
/// - Variants are stable for programmatic handling and exit-code mapping.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Claim failed validation; rejected before any pass ran.
    #[error("invalid claim: {0}")]
    InvalidClaim(#[from] ClaimError),
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// Target path is unreadable.
    #[error("target unreadable: {0}")]
    TargetUnreadable(String),
    /// Evidence chain recomputation failed at finalization.
    #[error("evidence ledger tamper detected at index {index}")]
    LedgerTamper {
        /// Index of the first mismatching item.
        index: usize,
    },
}

// ============================================================================
// SECTION: Audit Run Output
// ============================================================================

/// Complete output of one truth gate invocation.
///
/// # Invariants
/// - `result` is immutable once emitted; the ledger is retained for offline
///   tamper verification and evidence export.
#[derive(Debug, Clone)]
pub struct AuditRun {
    /// Final aggregate result.
    pub result: AuditResult,
    /// Canonical evidence ledger spanning all three passes.
    pub ledger: EvidenceLedger,
    /// Full per-pass reports in execution order.
    pub pass_reports: Vec<PassReport>,
}

// ============================================================================
// SECTION: Truth Gate
// ============================================================================

/// Runs the triple-verification protocol and owns its per-pass results.
pub struct TruthGate {
    /// Pass orchestrator.
    orchestrator: AuditOrchestrator,
    /// Strategy-selection engine.
    engine: DecisionEngine,
    /// Validated audit configuration.
    config: AuditConfig,
    /// Limits concurrent full pipelines per gate instance.
    audit_permits: Arc<Semaphore>,
}

impl TruthGate {
    /// Creates a truth gate from an orchestrator and decision engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration fails validation.
    pub fn new(
        orchestrator: AuditOrchestrator,
        engine: DecisionEngine,
        config: AuditConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let audit_permits = Arc::new(Semaphore::new(config.max_concurrent_audits));
        Ok(Self {
            orchestrator,
            engine,
            config,
            audit_permits,
        })
    }

    /// Runs the full protocol for one request.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] only for fatal conditions: an invalid claim,
    /// an unreadable target, or ledger tampering detected at finalization.
    /// Agent failures and inference unavailability degrade into the result.
    pub async fn run(&self, request: &AuditRequest) -> Result<AuditRun, AuditError> {
        request.claim.validate()?;
        if let Err(err) = std::fs::metadata(&request.target) {
            return Err(AuditError::TargetUnreadable(format!(
                "{}: {err}",
                request.target.display()
            )));
        }

        // Bounds concurrent pipelines; a closed semaphore cannot occur
        // because the gate owns it for its whole lifetime.
        let _permit = self.audit_permits.acquire().await;

        let mut ledger = EvidenceLedger::new(request.id.clone());
        let mut reports: Vec<PassReport> = Vec::with_capacity(PassLabel::ALL.len());

        for pass in PassLabel::ALL {
            let (mode, constraint) = pass_plan(pass);
            let advice = self
                .engine
                .plan_pass(StrategyContext {
                    request_id: request.id.as_str().to_string(),
                    target: request.target.display().to_string(),
                    claim: request.claim.clone(),
                    next_pass: pass,
                    prior_passes: reports.iter().map(PassReport::summary).collect(),
                })
                .await;
            let report = self
                .orchestrator
                .run_pass(request, pass, mode, constraint, &advice, &mut ledger)
                .await;
            reports.push(report);
        }

        let result = finalize(request, &reports, &ledger, &self.config);
        if let Some(index) = ledger.first_tampered_index() {
            return Err(AuditError::LedgerTamper {
                index,
            });
        }

        Ok(AuditRun {
            result,
            ledger,
            pass_reports: reports,
        })
    }
}

// ============================================================================
// SECTION: Protocol Helpers
// ============================================================================

/// Returns the mode and independence constraint for a pass.
fn pass_plan(pass: PassLabel) -> (PassMode, IndependenceConstraint) {
    match pass {
        PassLabel::A => (PassMode::SelfCheck, IndependenceConstraint::none()),
        PassLabel::B => (
            PassMode::Independent,
            IndependenceConstraint::forbid_pass(PassLabel::A),
        ),
        // Pass C reads A and B to hunt for contradictions.
        PassLabel::C => (PassMode::Adversarial, IndependenceConstraint::none()),
    }
}

/// Computes the A/B agreement as the fraction of claim fields with equal
/// micro-decisions.
fn agreement(a: &PassReport, b: &PassReport) -> f64 {
    let fields: BTreeSet<_> =
        a.field_verdicts.keys().chain(b.field_verdicts.keys()).collect();
    if fields.is_empty() {
        return 1.0;
    }
    let matching = fields
        .iter()
        .filter(|field| a.field_verdicts.get(**field) == b.field_verdicts.get(**field))
        .count();
    #[allow(
        clippy::cast_precision_loss,
        reason = "Claim field counts are far below f64 integer precision."
    )]
    {
        matching as f64 / fields.len() as f64
    }
}

/// Folds the three pass reports into the final audit result.
fn finalize(
    request: &AuditRequest,
    reports: &[PassReport],
    ledger: &EvidenceLedger,
    config: &AuditConfig,
) -> AuditResult {
    let verified = reports.iter().all(|report| report.verified);
    let confidence = reports
        .iter()
        .map(|report| report.confidence)
        .fold(1.0_f64, f64::min);

    let mut seen = BTreeSet::new();
    let mut discrepancies: Vec<Discrepancy> = Vec::new();
    for report in reports {
        for discrepancy in &report.discrepancies {
            if seen.insert(discrepancy.dedup_key()) {
                discrepancies.push(discrepancy.clone());
            }
        }
    }

    let agreement_ab = match (reports.first(), reports.get(1)) {
        (Some(a), Some(b)) => agreement(a, b),
        _ => 1.0,
    };
    let disputed = agreement_ab < config.agreement_threshold;

    let total_results: usize = reports.iter().map(|report| report.agent_results.len()).sum();
    let failures: usize = reports.iter().map(PassReport::failure_count).sum();
    let health_score = if total_results > 0 {
        #[allow(
            clippy::cast_precision_loss,
            reason = "Roster sizes are far below f64 integer precision."
        )]
        {
            1.0 - failures as f64 / total_results as f64
        }
    } else {
        0.0
    };

    AuditResult {
        request_id: request.id.clone(),
        verified,
        confidence,
        discrepancies,
        evidence_ledger_hash: ledger.tail_hash(),
        passes: reports.iter().map(PassReport::summary).collect(),
        agreement_ab,
        disputed,
        health_score,
    }
}
