// crates/truth-gate-agents/src/gap.rs
// ============================================================================
// Module: Gap Scanner Agent
// Description: Diffs claimed deliverables against what exists on disk.
// Purpose: Turn missing deliverables into explicit, severity-ranked gaps.
// Dependencies: crate::{metrics, walk}, serde_json, truth-gate-core
// ============================================================================

//! ## Overview
//! The gap scanner frames verification as subtraction: everything the claim
//! promises minus everything that exists is the gap. It resolves the
//! `deliverables` listing path by path and treats a `filesCreated` count as
//! a promised inventory size. Severity follows the missing fraction, so a
//! claim missing most of its deliverables is critical on this axis alone.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

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

// ============================================================================
// SECTION: Agent
// ============================================================================

/// Maximum missing paths embedded in the gap evidence payload.
const MISSING_SAMPLE: usize = 32;

/// Diffs the `deliverables` listing and `filesCreated` count against disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct GapScannerAgent;

/// Maps a missing fraction to gap severity.
fn gap_severity(missing_fraction: f64) -> Severity {
    if missing_fraction >= 0.5 {
        Severity::Critical
    } else if missing_fraction >= 0.2 {
        Severity::High
    } else {
        Severity::Medium
    }
}

impl VerificationAgent for GapScannerAgent {
    fn name(&self) -> AgentName {
        AgentName::GapScanner
    }

    fn source_class(&self) -> SourceClass {
        SourceClass::DocumentedEvidence
    }

    fn investigate(
        &self,
        request: &AuditRequest,
        _view: &LedgerView,
        log: &mut AgentEvidenceLog,
        ctx: &AgentContext,
    ) -> Result<AgentResult, AgentError> {
        let scan = crate::walk::walk_target(&request.target, ctx.max_files_scanned)?;
        let on_disk: BTreeSet<String> = scan
            .files
            .iter()
            .map(|path| {
                path.strip_prefix(&request.target)
                    .unwrap_or(path)
                    .display()
                    .to_string()
            })
            .collect();

        let mut checked_fields: Vec<ClaimField> = Vec::new();
        let mut discrepancies: Vec<Discrepancy> = Vec::new();
        let mut confidence = 1.0_f64;

        if let Some(listing) = request
            .claim
            .metrics
            .get(&ClaimField::new("deliverables"))
            .and_then(serde_json::Value::as_array)
        {
            let promised: Vec<String> = listing
                .iter()
                .filter_map(serde_json::Value::as_str)
                .map(str::to_string)
                .collect();
            let missing: Vec<&String> = promised
                .iter()
                .filter(|path| !on_disk.contains(*path))
                .collect();
            checked_fields.push(ClaimField::new("deliverables"));
            log.record(
                EvidenceKind::FileExistence,
                json!({
                    "promised": promised.len(),
                    "missing": missing.len(),
                    "missingSample": missing.iter().take(MISSING_SAMPLE).collect::<Vec<_>>(),
                }),
                ctx.now,
            );
            if !promised.is_empty() && !missing.is_empty() {
                let fraction = as_f64(missing.len()) / as_f64(promised.len());
                confidence = confidence.min(1.0 - fraction);
                discrepancies.push(Discrepancy::for_field(
                    "deliverable-gap",
                    gap_severity(fraction),
                    ClaimField::new("deliverables"),
                    json!(promised.len()),
                    json!(promised.len() - missing.len()),
                    format!("{} of {} claimed deliverables missing", missing.len(), promised.len()),
                ));
            }
        }

        if let Some(claimed) = request.claim.numeric("filesCreated") {
            checked_fields.push(ClaimField::new("filesCreated"));
            let found = as_f64(on_disk.len());
            log.record(
                EvidenceKind::Other,
                json!({ "expectedFiles": claimed, "foundFiles": on_disk.len() }),
                ctx.now,
            );
            if found < claimed && claimed > 0.0 {
                let fraction = (claimed - found) / claimed;
                confidence = confidence.min(found / claimed);
                discrepancies.push(Discrepancy::for_field(
                    "deliverable-gap",
                    gap_severity(fraction),
                    ClaimField::new("filesCreated"),
                    json!(claimed),
                    json!(on_disk.len()),
                    format!("claimed {claimed} files but only {} discoverable", on_disk.len()),
                ));
            }
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

    use super::GapScannerAgent;

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
    fn complete_deliverables_verify() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        fs::write(dir.path().join("b.txt"), "b\n").unwrap();
        let request = AuditRequest::new(
            AuditId::new("gs-test"),
            dir.path().to_path_buf(),
            Claim::new(BTreeMap::from([(
                ClaimField::new("deliverables"),
                json!(["a.txt", "b.txt"]),
            )])),
            0.95,
            Timestamp::Logical(1),
        )
        .unwrap();
        let mut log = AgentEvidenceLog::new(AgentName::GapScanner, PassLabel::A);
        let view = LedgerView::new(Vec::new(), IndependenceConstraint::none());
        let result = GapScannerAgent
            .investigate(&request, &view, &mut log, &context())
            .unwrap();
        assert!(result.verified);
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn mostly_missing_deliverables_are_critical() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        let request = AuditRequest::new(
            AuditId::new("gs-test"),
            dir.path().to_path_buf(),
            Claim::new(BTreeMap::from([(
                ClaimField::new("deliverables"),
                json!(["a.txt", "b.txt", "c.txt", "d.txt"]),
            )])),
            0.95,
            Timestamp::Logical(1),
        )
        .unwrap();
        let mut log = AgentEvidenceLog::new(AgentName::GapScanner, PassLabel::A);
        let view = LedgerView::new(Vec::new(), IndependenceConstraint::none());
        let result = GapScannerAgent
            .investigate(&request, &view, &mut log, &context())
            .unwrap();
        assert!(!result.verified);
        assert_eq!(result.discrepancies[0].kind, "deliverable-gap");
        assert_eq!(result.discrepancies[0].severity, Severity::Critical);
        assert!(result.confidence <= 0.25);
    }

    #[test]
    fn file_count_shortfall_is_a_gap() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        let request = AuditRequest::new(
            AuditId::new("gs-test"),
            dir.path().to_path_buf(),
            Claim::new(BTreeMap::from([(ClaimField::new("filesCreated"), json!(10))])),
            0.95,
            Timestamp::Logical(1),
        )
        .unwrap();
        let mut log = AgentEvidenceLog::new(AgentName::GapScanner, PassLabel::A);
        let view = LedgerView::new(Vec::new(), IndependenceConstraint::none());
        let result = GapScannerAgent
            .investigate(&request, &view, &mut log, &context())
            .unwrap();
        assert!(!result.verified);
        assert_eq!(result.discrepancies[0].severity, Severity::Critical);
        assert!((result.confidence - 0.1).abs() < 1e-9);
    }
}
