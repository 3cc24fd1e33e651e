// crates/truth-gate-agents/src/report.rs
// ============================================================================
// Module: Report Verifier Agent
// Description: Checks the claim and its backing report for self-consistency.
// Purpose: Catch claims that contradict their own report before ground truth.
// Dependencies: crate::walk, serde_json, truth-gate-core
// ============================================================================

//! ## Overview
//! The report verifier never touches the target tree; it only examines what
//! the caller asserted. When a report file backs the claim, the report must
//! exist and mention every claimed numeric metric; a missing report is a
//! high-severity discrepancy because the claim cites evidence that does not
//! exist. Self-reported material carries the lowest source weight, so this
//! agent can endorse a claim without carrying it over the line.

// ============================================================================
// SECTION: Imports
// ============================================================================

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
use truth_gate_core::core::hashing::DEFAULT_HASH_ALGORITHM;
use truth_gate_core::core::hashing::hash_bytes;

use crate::metrics::as_f64;

// ============================================================================
// SECTION: Agent
// ============================================================================

/// Verifies the internal consistency of the claim and its report reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportVerifierAgent;

impl VerificationAgent for ReportVerifierAgent {
    fn name(&self) -> AgentName {
        AgentName::ReportVerifier
    }

    fn source_class(&self) -> SourceClass {
        SourceClass::SelfReport
    }

    fn investigate(
        &self,
        request: &AuditRequest,
        _view: &LedgerView,
        log: &mut AgentEvidenceLog,
        ctx: &AgentContext,
    ) -> Result<AgentResult, AgentError> {
        let checked_fields: Vec<ClaimField> =
            request.claim.metrics.keys().cloned().collect();
        let mut discrepancies: Vec<Discrepancy> = Vec::new();
        let mut confidence = 1.0_f64;

        match &request.claim.report_ref {
            None => {
                log.record(
                    EvidenceKind::Other,
                    json!({ "report": null, "claimedMetrics": checked_fields.len() }),
                    ctx.now,
                );
            }
            Some(path) => match crate::walk::read_text(path, ctx.max_file_bytes) {
                None => {
                    log.record(
                        EvidenceKind::FileExistence,
                        json!({ "report": path.display().to_string(), "readable": false }),
                        ctx.now,
                    );
                    discrepancies.push(Discrepancy::unscoped(
                        "report-missing",
                        Severity::High,
                        format!("claimed report {} is missing or unreadable", path.display()),
                    ));
                    confidence = 0.0;
                }
                Some(text) => {
                    let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, text.as_bytes());
                    log.record(
                        EvidenceKind::FileContent,
                        json!({
                            "report": path.display().to_string(),
                            "bytes": text.len(),
                            "sha256": digest.value,
                        }),
                        ctx.now,
                    );
                    let numeric: Vec<&ClaimField> = request
                        .claim
                        .metrics
                        .keys()
                        .filter(|field| request.claim.numeric(field.as_str()).is_some())
                        .collect();
                    let mut mentioned = 0_usize;
                    for field in &numeric {
                        let Some(value) = request.claim.numeric(field.as_str()) else {
                            continue;
                        };
                        if text.contains(&value.to_string()) {
                            mentioned += 1;
                        } else {
                            discrepancies.push(Discrepancy::for_field(
                                "report-omits-metric",
                                Severity::Low,
                                (*field).clone(),
                                json!(value),
                                json!(null),
                                format!("report never states claimed {field} {value}"),
                            ));
                        }
                    }
                    if !numeric.is_empty() {
                        confidence = as_f64(mentioned) / as_f64(numeric.len());
                    }
                }
            },
        }

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

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::panic,
        reason = "Test-only assertions may panic on failure."
    )]

    use std::collections::BTreeMap;
    use std::fs;

    use serde_json::json;

    use truth_gate_core::AgentContext;
    use truth_gate_core::AgentEvidenceLog;
    use truth_gate_core::AgentName;
    use truth_gate_core::AuditId;
    use truth_gate_core::AuditRequest;
    use truth_gate_core::Claim;
    use truth_gate_core::ClaimField;
    use truth_gate_core::IndependenceConstraint;
    use truth_gate_core::LedgerView;
    use truth_gate_core::PassLabel;
    use truth_gate_core::PassMode;
    use truth_gate_core::Severity;
    use truth_gate_core::Timestamp;
    use truth_gate_core::VerificationAgent;

    use super::ReportVerifierAgent;

    fn context() -> AgentContext {
        AgentContext {
            pass: PassLabel::A,
            mode: PassMode::SelfCheck,
            constraint: IndependenceConstraint::none(),
            now: Timestamp::Logical(1),
            max_files_scanned: 1_000,
            max_file_bytes: 1 << 20,
        }
    }

    #[test]
    fn claim_without_report_is_fully_consistent() {
        let dir = tempfile::tempdir().unwrap();
        let request = AuditRequest::new(
            AuditId::new("rv-test"),
            dir.path().to_path_buf(),
            Claim::new(BTreeMap::from([(ClaimField::new("filesCreated"), json!(5))])),
            0.95,
            Timestamp::Logical(1),
        )
        .unwrap();
        let mut log = AgentEvidenceLog::new(AgentName::ReportVerifier, PassLabel::A);
        let view = LedgerView::new(Vec::new(), IndependenceConstraint::none());
        let result = ReportVerifierAgent
            .investigate(&request, &view, &mut log, &context())
            .unwrap();
        assert!(result.verified);
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);
        assert_eq!(result.checked_fields.len(), 1);
    }

    #[test]
    fn missing_report_is_high_severity() {
        let dir = tempfile::tempdir().unwrap();
        let mut claim =
            Claim::new(BTreeMap::from([(ClaimField::new("filesCreated"), json!(5))]));
        claim.report_ref = Some(dir.path().join("no-such-report.md"));
        let request = AuditRequest::new(
            AuditId::new("rv-test"),
            dir.path().to_path_buf(),
            claim,
            0.95,
            Timestamp::Logical(1),
        )
        .unwrap();
        let mut log = AgentEvidenceLog::new(AgentName::ReportVerifier, PassLabel::A);
        let view = LedgerView::new(Vec::new(), IndependenceConstraint::none());
        let result = ReportVerifierAgent
            .investigate(&request, &view, &mut log, &context())
            .unwrap();
        assert!(!result.verified);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.discrepancies[0].kind, "report-missing");
        assert_eq!(result.discrepancies[0].severity, Severity::High);
    }

    #[test]
    fn report_mentioning_all_metrics_passes() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("report.md");
        fs::write(&report, "Created 5 files totalling 120 lines.").unwrap();
        let mut claim = Claim::new(BTreeMap::from([
            (ClaimField::new("filesCreated"), json!(5)),
            (ClaimField::new("linesOfCode"), json!(120)),
        ]));
        claim.report_ref = Some(report);
        let request = AuditRequest::new(
            AuditId::new("rv-test"),
            dir.path().to_path_buf(),
            claim,
            0.95,
            Timestamp::Logical(1),
        )
        .unwrap();
        let mut log = AgentEvidenceLog::new(AgentName::ReportVerifier, PassLabel::A);
        let view = LedgerView::new(Vec::new(), IndependenceConstraint::none());
        let result = ReportVerifierAgent
            .investigate(&request, &view, &mut log, &context())
            .unwrap();
        assert!(result.verified);
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);
        assert!(result.discrepancies.is_empty());
    }
}
