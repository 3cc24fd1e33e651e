// crates/truth-gate-core/tests/truth_gate.rs
// ============================================================================
// Module: Truth Gate Protocol Tests
// Description: Verifies the triple-pass protocol and conservative aggregation.
// ============================================================================
//! ## Overview
//! Ensures the gate always runs passes A, B, and C in order, takes the
//! minimum pass confidence, requires unanimity for a verified outcome,
//! deduplicates discrepancies across passes, enforces pass B independence,
//! and rejects invalid claims and unreadable targets before any pass runs.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;

use truth_gate_core::AgentContext;
use truth_gate_core::AgentError;
use truth_gate_core::AgentEvidenceLog;
use truth_gate_core::AgentName;
use truth_gate_core::AgentResult;
use truth_gate_core::AuditConfig;
use truth_gate_core::AuditError;
use truth_gate_core::AuditId;
use truth_gate_core::AuditOrchestrator;
use truth_gate_core::AuditRequest;
use truth_gate_core::Claim;
use truth_gate_core::ClaimField;
use truth_gate_core::DecisionEngine;
use truth_gate_core::Discrepancy;
use truth_gate_core::EvidenceKind;
use truth_gate_core::EvidenceLedger;
use truth_gate_core::InferenceError;
use truth_gate_core::LedgerView;
use truth_gate_core::PassLabel;
use truth_gate_core::Severity;
use truth_gate_core::SourceClass;
use truth_gate_core::StrategyAdvice;
use truth_gate_core::StrategyAdvisor;
use truth_gate_core::StrategyContext;
use truth_gate_core::Timestamp;
use truth_gate_core::TruthGate;
use truth_gate_core::VerificationAgent;

/// Advisor stub returning the neutral default advice.
struct NeutralAdvisor;

impl StrategyAdvisor for NeutralAdvisor {
    fn advise(&self, _ctx: &StrategyContext) -> Result<StrategyAdvice, InferenceError> {
        Ok(StrategyAdvice::default())
    }
}

/// Agent returning a scripted confidence per pass.
struct ScriptedAgent {
    /// Confidence returned for passes A, B, and C in order.
    confidences: [f64; 3],
    /// Discrepancies emitted per pass, keyed by label.
    discrepancies: BTreeMap<PassLabel, Vec<Discrepancy>>,
}

impl ScriptedAgent {
    /// Builds an agent with per-pass confidences and no discrepancies.
    fn clean(confidences: [f64; 3]) -> Self {
        Self {
            confidences,
            discrepancies: BTreeMap::new(),
        }
    }
}

impl VerificationAgent for ScriptedAgent {
    fn name(&self) -> AgentName {
        AgentName::FsScanner
    }

    fn source_class(&self) -> SourceClass {
        SourceClass::Filesystem
    }

    fn investigate(
        &self,
        _request: &AuditRequest,
        _view: &LedgerView,
        log: &mut AgentEvidenceLog,
        ctx: &AgentContext,
    ) -> Result<AgentResult, AgentError> {
        log.record(EvidenceKind::Metric, json!({ "pass": ctx.pass }), ctx.now);
        let index = match ctx.pass {
            PassLabel::A => 0,
            PassLabel::B => 1,
            PassLabel::C => 2,
        };
        let discrepancies =
            self.discrepancies.get(&ctx.pass).cloned().unwrap_or_default();
        Ok(AgentResult {
            agent: AgentName::FsScanner,
            verified: discrepancies.is_empty(),
            confidence: self.confidences[index],
            discrepancies,
            evidence_ids: log.ids(),
            checked_fields: vec![ClaimField::new("filesCreated")],
            duration_ms: 0,
        })
    }
}

/// Agent recording how many ledger items its view exposes.
struct SpyAgent;

impl VerificationAgent for SpyAgent {
    fn name(&self) -> AgentName {
        AgentName::CrossReferencer
    }

    fn source_class(&self) -> SourceClass {
        SourceClass::VersionControl
    }

    fn investigate(
        &self,
        _request: &AuditRequest,
        view: &LedgerView,
        log: &mut AgentEvidenceLog,
        ctx: &AgentContext,
    ) -> Result<AgentResult, AgentError> {
        log.record(
            EvidenceKind::Other,
            json!({ "visible": view.items().count() }),
            ctx.now,
        );
        Ok(AgentResult {
            agent: AgentName::CrossReferencer,
            verified: true,
            confidence: 1.0,
            discrepancies: Vec::new(),
            evidence_ids: log.ids(),
            checked_fields: vec![ClaimField::new("filesCreated")],
            duration_ms: 0,
        })
    }
}

/// Builds a gate over the given roster with default configuration.
fn gate(roster: Vec<Arc<dyn VerificationAgent>>) -> TruthGate {
    let config = AuditConfig::default();
    let orchestrator = AuditOrchestrator::new(roster, config.clone()).unwrap();
    let engine = DecisionEngine::new(Arc::new(NeutralAdvisor), config.inference_timeout());
    TruthGate::new(orchestrator, engine, config).unwrap()
}

/// Returns a request against the current directory with one claimed metric.
fn request() -> AuditRequest {
    AuditRequest::new(
        AuditId::new("gate-test"),
        PathBuf::from("."),
        Claim::new(BTreeMap::from([(ClaimField::new("filesCreated"), json!(1))])),
        0.95,
        Timestamp::Logical(1),
    )
    .unwrap()
}

#[tokio::test]
async fn final_confidence_is_the_minimum_pass_confidence() {
    let roster: Vec<Arc<dyn VerificationAgent>> =
        vec![Arc::new(ScriptedAgent::clean([1.0, 0.6, 1.0]))];
    let run = gate(roster).run(&request()).await.unwrap();

    assert_eq!(run.result.passes.len(), 3);
    assert!((run.result.confidence - 0.6).abs() < 1e-9);
    // Unanimity is required; the dissenting pass B vetoes the verdict.
    assert!(!run.result.verified);
    assert!(run.result.passes[0].verified);
    assert!(!run.result.passes[1].verified);
    assert!((run.result.health_score - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn unanimous_clean_passes_verify_the_claim() {
    let roster: Vec<Arc<dyn VerificationAgent>> =
        vec![Arc::new(ScriptedAgent::clean([1.0, 1.0, 1.0]))];
    let run = gate(roster).run(&request()).await.unwrap();

    assert!(run.result.verified);
    assert!((run.result.confidence - 1.0).abs() < f64::EPSILON);
    assert!((run.result.agreement_ab - 1.0).abs() < f64::EPSILON);
    assert!(!run.result.disputed);
    assert_eq!(
        run.result.passes.iter().map(|p| p.pass).collect::<Vec<_>>(),
        vec![PassLabel::A, PassLabel::B, PassLabel::C],
    );
    assert_eq!(run.result.evidence_ledger_hash, run.ledger.tail_hash());
    assert!(run.ledger.verify_integrity());
}

#[tokio::test]
async fn critical_discrepancy_forces_an_unverified_outcome() {
    let critical = Discrepancy::for_field(
        "file-count-mismatch",
        Severity::Critical,
        ClaimField::new("filesCreated"),
        json!(1),
        json!(0),
        "claimed 1 file, found 0",
    );
    let roster: Vec<Arc<dyn VerificationAgent>> = vec![Arc::new(ScriptedAgent {
        confidences: [1.0, 1.0, 1.0],
        discrepancies: BTreeMap::from([(PassLabel::C, vec![critical])]),
    })];
    let run = gate(roster).run(&request()).await.unwrap();

    assert!(!run.result.verified);
    assert!(run.result.has_severity(Severity::Critical));
    // Passes A and B stayed clean.
    assert!(run.result.passes[0].verified);
    assert!(run.result.passes[1].verified);
    assert!(!run.result.passes[2].verified);
}

#[tokio::test]
async fn repeated_discrepancies_deduplicate_across_passes() {
    let finding = Discrepancy::for_field(
        "loc-mismatch",
        Severity::High,
        ClaimField::new("filesCreated"),
        json!(1),
        json!(0),
        "repeated finding",
    );
    let roster: Vec<Arc<dyn VerificationAgent>> = vec![Arc::new(ScriptedAgent {
        confidences: [0.1, 0.1, 0.1],
        discrepancies: BTreeMap::from([
            (PassLabel::A, vec![finding.clone()]),
            (PassLabel::B, vec![finding.clone()]),
            (PassLabel::C, vec![finding]),
        ]),
    })];
    let run = gate(roster).run(&request()).await.unwrap();

    assert_eq!(run.result.discrepancies.len(), 1);
    assert_eq!(run.result.discrepancies[0].kind, "loc-mismatch");
}

#[tokio::test]
async fn pass_disagreement_on_a_field_marks_the_result_disputed() {
    let finding = Discrepancy::for_field(
        "file-count-mismatch",
        Severity::High,
        ClaimField::new("filesCreated"),
        json!(1),
        json!(0),
        "only pass B finds this",
    );
    let roster: Vec<Arc<dyn VerificationAgent>> = vec![Arc::new(ScriptedAgent {
        confidences: [1.0, 1.0, 1.0],
        discrepancies: BTreeMap::from([(PassLabel::B, vec![finding])]),
    })];
    let run = gate(roster).run(&request()).await.unwrap();

    // One claim field, opposite micro-decisions in A and B.
    assert!((run.result.agreement_ab - 0.0).abs() < f64::EPSILON);
    assert!(run.result.disputed);
}

#[tokio::test]
async fn invalid_claim_is_rejected_before_any_pass() {
    let invalid = AuditRequest {
        id: AuditId::new("gate-test"),
        target: PathBuf::from("."),
        claim: Claim::new(BTreeMap::new()),
        min_confidence: 0.95,
        created_at: Timestamp::Logical(1),
    };
    let roster: Vec<Arc<dyn VerificationAgent>> =
        vec![Arc::new(ScriptedAgent::clean([1.0, 1.0, 1.0]))];
    let err = gate(roster).run(&invalid).await.unwrap_err();
    assert!(matches!(err, AuditError::InvalidClaim(_)));
}

#[tokio::test]
async fn unreadable_target_is_rejected_before_any_pass() {
    let mut request = request();
    request.target = PathBuf::from("/nonexistent/truth-gate-target");
    let roster: Vec<Arc<dyn VerificationAgent>> =
        vec![Arc::new(ScriptedAgent::clean([1.0, 1.0, 1.0]))];
    let err = gate(roster).run(&request).await.unwrap_err();
    assert!(matches!(err, AuditError::TargetUnreadable(_)));
}

#[tokio::test]
async fn pass_b_cannot_read_pass_a_evidence() {
    let roster: Vec<Arc<dyn VerificationAgent>> = vec![Arc::new(SpyAgent)];
    let run = gate(roster).run(&request()).await.unwrap();

    let visible_in = |pass: PassLabel| {
        run.ledger
            .items()
            .iter()
            .find(|item| item.pass == Some(pass))
            .and_then(|item| item.payload["visible"].as_u64())
            .unwrap()
    };
    // Pass A starts from an empty ledger; B is constrained away from A's
    // item; C reads both earlier passes.
    assert_eq!(visible_in(PassLabel::A), 0);
    assert_eq!(visible_in(PassLabel::B), 0);
    assert_eq!(visible_in(PassLabel::C), 2);
}

#[tokio::test]
async fn identical_requests_reproduce_the_evidence_chain() {
    // A single-agent roster fixes the merge order, making the chain a pure
    // function of the request.
    let request = request();
    let first = gate(vec![Arc::new(ScriptedAgent::clean([1.0, 1.0, 1.0]))])
        .run(&request)
        .await
        .unwrap();
    let second = gate(vec![Arc::new(ScriptedAgent::clean([1.0, 1.0, 1.0]))])
        .run(&request)
        .await
        .unwrap();

    assert_eq!(first.result.evidence_ledger_hash, second.result.evidence_ledger_hash);
    assert!((first.result.confidence - second.result.confidence).abs() < f64::EPSILON);
    assert_eq!(first.result.verified, second.result.verified);
}

#[tokio::test]
async fn exported_ledger_still_detects_tampering() {
    let roster: Vec<Arc<dyn VerificationAgent>> =
        vec![Arc::new(ScriptedAgent::clean([1.0, 1.0, 1.0]))];
    let run = gate(roster).run(&request()).await.unwrap();

    let mut value = serde_json::to_value(&run.ledger).unwrap();
    value["items"][1]["payload"]["pass"] = json!("forged");
    let tampered: EvidenceLedger = serde_json::from_value(value).unwrap();
    assert_eq!(tampered.first_tampered_index(), Some(1));
    // The untouched export still verifies.
    assert!(run.ledger.verify_integrity());
}
