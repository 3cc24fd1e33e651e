// crates/truth-gate-agents/src/analytics.rs
// ============================================================================
// Module: Deep Analytics Agent
// Description: Cross-pass anomaly detection over sibling agent evidence.
// Purpose: Catch metric evidence that disagrees with itself across passes.
// Dependencies: crate::metrics, serde_json, truth-gate-core
// ============================================================================

//! ## Overview
//! Deep analytics never touches the target; its raw material is the metric
//! evidence other agents already chained. Ledger views snapshot at pass
//! start, so the agent first sees usable observations in the adversarial
//! pass, where both earlier passes are visible. Two observations of the same
//! metric that disagree with each other are a stronger signal than either
//! disagreeing with the claim: the evidence base itself is unstable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::json;

use truth_gate_core::AgentContext;
use truth_gate_core::AgentError;
use truth_gate_core::AgentEvidenceLog;
use truth_gate_core::AgentName;
use truth_gate_core::AgentResult;
use truth_gate_core::AuditRequest;
use truth_gate_core::ClaimField;
use truth_gate_core::Discrepancy;
use truth_gate_core::EvidenceKind;
use truth_gate_core::LedgerView;
use truth_gate_core::Severity;
use truth_gate_core::SourceClass;
use truth_gate_core::VerificationAgent;

use crate::metrics::as_f64;
use crate::metrics::support_ratio;

// ============================================================================
// SECTION: Observations
// ============================================================================

/// One claimed/actual pair extracted from a metric evidence payload.
#[derive(Debug, Clone, Copy)]
struct Observation {
    /// Value asserted by the claim at record time.
    claimed: f64,
    /// Value the producing agent observed.
    actual: f64,
}

/// Relative spread above which repeated observations count as inconsistent.
const INCONSISTENCY_SPREAD: f64 = 0.05;

/// Extracts comparison observations from visible metric evidence.
fn gather(view: &LedgerView) -> BTreeMap<String, Vec<Observation>> {
    let mut grouped: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
    for item in view.items() {
        if item.kind != EvidenceKind::Metric {
            continue;
        }
        let Some(metric) = item.payload.get("metric").and_then(|v| v.as_str()) else {
            continue;
        };
        let (Some(claimed), Some(actual)) = (
            item.payload.get("claimed").and_then(serde_json::Value::as_f64),
            item.payload.get("actual").and_then(serde_json::Value::as_f64),
        ) else {
            continue;
        };
        grouped.entry(metric.to_string()).or_default().push(Observation {
            claimed,
            actual,
        });
    }
    grouped
}

// ============================================================================
// SECTION: Agent
// ============================================================================

/// Re-derives claim support from sibling evidence and flags inconsistencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepAnalyticsAgent;

impl VerificationAgent for DeepAnalyticsAgent {
    fn name(&self) -> AgentName {
        AgentName::DeepAnalytics
    }

    fn source_class(&self) -> SourceClass {
        SourceClass::DocumentedEvidence
    }

    fn investigate(
        &self,
        request: &AuditRequest,
        view: &LedgerView,
        log: &mut AgentEvidenceLog,
        ctx: &AgentContext,
    ) -> Result<AgentResult, AgentError> {
        let grouped = gather(view);
        let observation_count: usize = grouped.values().map(Vec::len).sum();
        log.record(
            EvidenceKind::Other,
            json!({
                "metricsAnalyzed": grouped.len(),
                "observations": observation_count,
            }),
            ctx.now,
        );

        if grouped.is_empty() {
            // Nothing visible to analyze; stay out of the weighted average.
            return Ok(AgentResult {
                agent: self.name(),
                verified: true,
                confidence: 1.0,
                discrepancies: Vec::new(),
                evidence_ids: log.ids(),
                checked_fields: Vec::new(),
                duration_ms: 0,
            });
        }

        let mut checked_fields: Vec<ClaimField> = Vec::new();
        let mut discrepancies: Vec<Discrepancy> = Vec::new();
        let mut support_sum = 0.0_f64;

        for (metric, observations) in &grouped {
            let support = observations
                .iter()
                .map(|obs| support_ratio(obs.claimed, obs.actual))
                .fold(1.0_f64, f64::min);
            support_sum += support;
            if request.claim.numeric(metric).is_some() {
                checked_fields.push(ClaimField::new(metric.as_str()));
            }

            let min_actual = observations.iter().map(|obs| obs.actual).fold(f64::MAX, f64::min);
            let max_actual = observations.iter().map(|obs| obs.actual).fold(f64::MIN, f64::max);
            let spread = (max_actual - min_actual).abs() / max_actual.abs().max(1.0);
            if observations.len() > 1 && spread > INCONSISTENCY_SPREAD {
                discrepancies.push(Discrepancy::for_field(
                    "evidence-inconsistency",
                    Severity::High,
                    ClaimField::new(metric.as_str()),
                    json!(min_actual),
                    json!(max_actual),
                    format!("observations of {metric} disagree: {min_actual} vs {max_actual}"),
                ));
            }
        }

        let confidence = support_sum / as_f64(grouped.len());
        let verified = !discrepancies.iter().any(|d| d.severity >= Severity::High);
        Ok(AgentResult {
            agent: self.name(),
            verified,
            confidence,
            discrepancies,
            evidence_ids: log.ids(),
            checked_fields,
            duration_ms: 0,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
