// crates/truth-gate-cli/src/render.rs
// ============================================================================
// Module: Audit Report Rendering
// Description: Human-oriented JSON rendering of a completed audit run.
// Purpose: Produce the readable report written beside the raw result.
// Dependencies: serde_json, truth-gate-core
// ============================================================================

//! ## Overview
//! The raw `audit-result.json` is the stable machine surface; this module
//! renders the companion `audit-report.json` a reviewer reads first: a
//! headline verdict, per-pass rows, and discrepancies sorted most severe
//! first. Rendering is lossy on purpose; nothing here is meant to be parsed
//! back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

use truth_gate_core::Severity;
use truth_gate_core::runtime::AuditRun;

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Headline verdict for a completed run.
fn verdict(run: &AuditRun) -> &'static str {
    if run.result.has_severity(Severity::Critical) {
        "rejected-critical"
    } else if run.result.verified {
        "verified"
    } else {
        "not-verified"
    }
}

/// Renders the human-oriented report document.
#[must_use]
pub fn human_report(run: &AuditRun) -> Value {
    let mut discrepancies: Vec<&truth_gate_core::Discrepancy> =
        run.result.discrepancies.iter().collect();
    discrepancies.sort_by(|a, b| b.severity.cmp(&a.severity));

    json!({
        "taskId": run.result.request_id,
        "verdict": verdict(run),
        "confidence": run.result.confidence,
        "agreementAb": run.result.agreement_ab,
        "disputed": run.result.disputed,
        "healthScore": run.result.health_score,
        "evidenceLedgerHash": run.result.evidence_ledger_hash,
        "evidenceItems": run.ledger.items().len(),
        "passes": run.result.passes.iter().map(|pass| json!({
            "pass": pass.pass,
            "verified": pass.verified,
            "confidence": pass.confidence,
            "discrepancies": pass.discrepancy_count,
            "agentFailures": pass.agent_failures,
        })).collect::<Vec<_>>(),
        "discrepancies": discrepancies.iter().map(|d| json!({
            "severity": d.severity,
            "kind": d.kind,
            "field": d.claim_field,
            "claimed": d.claimed,
            "actual": d.actual,
            "description": d.description,
        })).collect::<Vec<_>>(),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::panic,
        reason = "Test-only assertions may panic on failure."
    )]

    use truth_gate_core::AuditId;
    use truth_gate_core::AuditResult;
    use truth_gate_core::Discrepancy;
    use truth_gate_core::EvidenceLedger;
    use truth_gate_core::Severity;
    use truth_gate_core::runtime::AuditRun;

    use super::human_report;

    fn run_with(discrepancies: Vec<Discrepancy>, verified: bool) -> AuditRun {
        AuditRun {
            result: AuditResult {
                request_id: AuditId::new("render-test"),
                verified,
                confidence: if verified { 1.0 } else { 0.2 },
                discrepancies,
                evidence_ledger_hash: "0".repeat(64),
                passes: Vec::new(),
                agreement_ab: 1.0,
                disputed: false,
                health_score: 1.0,
            },
            ledger: EvidenceLedger::new(AuditId::new("render-test")),
            pass_reports: Vec::new(),
        }
    }

    #[test]
    fn clean_run_renders_verified() {
        let report = human_report(&run_with(Vec::new(), true));
        assert_eq!(report["verdict"], "verified");
        assert_eq!(report["discrepancies"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn critical_discrepancy_dominates_the_verdict() {
        let report = human_report(&run_with(
            vec![
                Discrepancy::unscoped("scan-truncated", Severity::Low, "low first"),
                Discrepancy::unscoped("deliverable-gap", Severity::Critical, "critical"),
            ],
            false,
        ));
        assert_eq!(report["verdict"], "rejected-critical");
        // Most severe discrepancy renders first.
        assert_eq!(report["discrepancies"][0]["kind"], "deliverable-gap");
    }
}
