// crates/truth-gate-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Audit Orchestrator
// Description: Concurrent agent fan-out with deadlines and weighted aggregation.
// Purpose: Run one verification pass over the full roster and aggregate it.
// Dependencies: crate::{core, interfaces}, tokio
// ============================================================================

//! ## Overview
//! The orchestrator dispatches every roster agent concurrently on the
//! blocking pool, each under its own deadline. Partial failure is tolerated:
//! a timed-out or crashed agent contributes a zero-confidence failure result
//! and one high-severity `agent-failure` discrepancy, and never aborts the
//! pass. Per-agent evidence logs merge into the canonical ledger in
//! completion order, which keeps the chain deterministic given a fixed
//! completion order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::core::AuditConfig;
use crate::core::AuditRequest;
use crate::core::AuditTelemetry;
use crate::core::ConfigError;
use crate::core::EvidenceLedger;
use crate::core::NoopTelemetry;
use crate::core::Severity;
use crate::core::claim::Claim;
use crate::core::config::SourceClass;
use crate::core::discrepancy::Discrepancy;
use crate::core::evidence::AgentEvidenceLog;
use crate::core::identifiers::AgentName;
use crate::core::identifiers::ClaimField;
use crate::core::identifiers::PassLabel;
use crate::core::result::AgentResult;
use crate::core::result::PassReport;
use crate::interfaces::AgentContext;
use crate::interfaces::IndependenceConstraint;
use crate::interfaces::LedgerView;
use crate::interfaces::PassMode;
use crate::interfaces::StrategyAdvice;
use crate::interfaces::VerificationAgent;

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Dispatches a claim to the agent roster and aggregates one pass.
pub struct AuditOrchestrator {
    /// Agent roster; the worker pool is bounded by its size.
    roster: Vec<Arc<dyn VerificationAgent>>,
    /// Source class per roster agent, resolved at construction.
    classes: BTreeMap<AgentName, SourceClass>,
    /// Validated audit configuration.
    config: AuditConfig,
    /// Telemetry sink.
    telemetry: Arc<dyn AuditTelemetry>,
}

impl AuditOrchestrator {
    /// Creates an orchestrator over a roster.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration fails validation.
    pub fn new(
        roster: Vec<Arc<dyn VerificationAgent>>,
        config: AuditConfig,
    ) -> Result<Self, ConfigError> {
        Self::with_telemetry(roster, config, Arc::new(NoopTelemetry))
    }

    /// Creates an orchestrator with an explicit telemetry sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration fails validation.
    pub fn with_telemetry(
        roster: Vec<Arc<dyn VerificationAgent>>,
        config: AuditConfig,
        telemetry: Arc<dyn AuditTelemetry>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let classes = roster
            .iter()
            .map(|agent| (agent.name(), agent.source_class()))
            .collect();
        Ok(Self {
            roster,
            classes,
            config,
            telemetry,
        })
    }

    /// Returns the configured roster size.
    #[must_use]
    pub fn roster_len(&self) -> usize {
        self.roster.len()
    }

    /// Runs one verification pass over the full roster.
    ///
    /// Agents run concurrently; each carries its own deadline scaled by the
    /// advisor's risk score. Evidence logs merge into `ledger` in completion
    /// order.
    pub async fn run_pass(
        &self,
        request: &AuditRequest,
        pass: PassLabel,
        mode: PassMode,
        constraint: IndependenceConstraint,
        advice: &StrategyAdvice,
        ledger: &mut EvidenceLedger,
    ) -> PassReport {
        let snapshot = ledger.items().to_vec();
        let budget = scaled_budget(self.config.agent_timeout(), advice.risk_score);

        let mut join_set = JoinSet::new();
        for agent in &self.roster {
            let agent = Arc::clone(agent);
            let name = agent.name();
            let request = request.clone();
            let view = LedgerView::new(snapshot.clone(), constraint.clone());
            let ctx = AgentContext {
                pass,
                mode,
                constraint: constraint.clone(),
                now: request.created_at,
                max_files_scanned: self.config.max_files_scanned,
                max_file_bytes: self.config.max_file_bytes,
            };
            join_set.spawn(async move {
                let started = Instant::now();
                let work = tokio::task::spawn_blocking(move || {
                    let mut log = AgentEvidenceLog::new(name, pass);
                    let outcome = agent.investigate(&request, &view, &mut log, &ctx);
                    (outcome, log)
                });
                let outcome = timeout(budget, work).await;
                (name, started.elapsed(), outcome)
            });
        }

        let mut agent_results = Vec::with_capacity(self.roster.len());
        while let Some(joined) = join_set.join_next().await {
            let Ok((name, elapsed, outcome)) = joined else {
                // The outer wrapper task never panics; a join error here has
                // no agent name to attribute, so it is dropped.
                continue;
            };
            let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
            let result = match outcome {
                Ok(Ok((Ok(result), log))) => {
                    self.telemetry.agent_completed(pass, name, elapsed, true);
                    match ledger.merge_log(log) {
                        Ok(_) => sanitize(result, duration_ms),
                        Err(err) => AgentResult::failure(
                            name,
                            format!("evidence rejected: {err}"),
                            duration_ms,
                        ),
                    }
                }
                Ok(Ok((Err(err), log))) => {
                    self.telemetry.agent_completed(pass, name, elapsed, false);
                    // Partial evidence from a failed agent stays on the chain
                    // when it still canonicalizes.
                    drop(ledger.merge_log(log));
                    AgentResult::failure(name, err.to_string(), duration_ms)
                }
                Ok(Err(join_err)) => {
                    self.telemetry.agent_completed(pass, name, elapsed, false);
                    AgentResult::failure(name, format!("agent panicked: {join_err}"), duration_ms)
                }
                Err(_elapsed) => {
                    self.telemetry.agent_timed_out(pass, name);
                    AgentResult::failure(name, "deadline exceeded", duration_ms)
                }
            };
            agent_results.push(result);
        }

        let report = self.aggregate(request, pass, agent_results, advice, ledger);
        self.telemetry.pass_completed(pass, report.verified, report.confidence);
        report
    }

    /// Aggregates per-agent results into a pass report.
    fn aggregate(
        &self,
        request: &AuditRequest,
        pass: PassLabel,
        agent_results: Vec<AgentResult>,
        advice: &StrategyAdvice,
        ledger: &EvidenceLedger,
    ) -> PassReport {
        let mut weighted_sum = 0.0_f64;
        let mut weight_total = 0.0_f64;
        let mut discrepancies: Vec<Discrepancy> = Vec::new();

        for result in &agent_results {
            discrepancies.extend(result.discrepancies.iter().cloned());
            let applicable = !result.checked_fields.is_empty()
                || !result.discrepancies.is_empty()
                || result.is_failure();
            if !applicable {
                continue;
            }
            let class = self
                .classes
                .get(&result.agent)
                .copied()
                .unwrap_or(SourceClass::SelfReport);
            // Advisor multipliers are bounded in [0, 4] by advice validation.
            let weight = self.config.source_weights.weight(class) * advice.multiplier(result.agent);
            weighted_sum += weight * result.confidence.clamp(0.0, 1.0);
            weight_total += weight;
        }

        let confidence = if weight_total > 0.0 {
            (weighted_sum / weight_total).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let has_critical = discrepancies.iter().any(|d| d.severity >= Severity::Critical);
        let verified = confidence >= request.min_confidence && !has_critical;
        let field_verdicts = field_verdicts(&request.claim, &discrepancies);

        PassReport {
            pass,
            verified,
            confidence,
            discrepancies,
            agent_results,
            evidence_tail: ledger.tail_hash(),
            field_verdicts,
        }
    }
}

// ============================================================================
// SECTION: Aggregation Helpers
// ============================================================================

/// Scales the agent deadline by the advisor risk score into `[1.0, 2.0]x`.
fn scaled_budget(base: Duration, risk_score: f64) -> Duration {
    let factor = 1.0 + risk_score.clamp(0.0, 1.0);
    base.mul_f64(factor)
}

/// Clamps agent-reported confidence and stamps the measured wall time.
fn sanitize(mut result: AgentResult, duration_ms: u64) -> AgentResult {
    if !result.confidence.is_finite() {
        result.confidence = 0.0;
    }
    result.confidence = result.confidence.clamp(0.0, 1.0);
    result.duration_ms = duration_ms;
    result
}

/// Computes per-claim-field micro-decisions from merged discrepancies.
fn field_verdicts(
    claim: &Claim,
    discrepancies: &[Discrepancy],
) -> BTreeMap<ClaimField, bool> {
    claim
        .metrics
        .keys()
        .map(|field| {
            let clean = !discrepancies.iter().any(|d| {
                d.severity >= Severity::High && d.claim_field.as_ref() == Some(field)
            });
            (field.clone(), clean)
        })
        .collect()
}
