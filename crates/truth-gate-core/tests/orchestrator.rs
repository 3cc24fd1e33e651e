// crates/truth-gate-core/tests/orchestrator.rs
// ============================================================================
// Module: Audit Orchestrator Tests
// Description: Verifies fan-out, deadlines, and weighted pass aggregation.
// ============================================================================
//! ## Overview
//! Ensures a pass tolerates failing and hanging agents, excludes
//! non-applicable agents from the weighted average, merges evidence into the
//! canonical chain, and applies advisor weight multipliers.

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
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use truth_gate_core::AgentContext;
use truth_gate_core::AgentError;
use truth_gate_core::AgentEvidenceLog;
use truth_gate_core::AgentName;
use truth_gate_core::AgentResult;
use truth_gate_core::AuditConfig;
use truth_gate_core::AuditId;
use truth_gate_core::AuditOrchestrator;
use truth_gate_core::AuditRequest;
use truth_gate_core::Claim;
use truth_gate_core::ClaimField;
use truth_gate_core::EvidenceKind;
use truth_gate_core::EvidenceLedger;
use truth_gate_core::IndependenceConstraint;
use truth_gate_core::LedgerView;
use truth_gate_core::PassLabel;
use truth_gate_core::PassMode;
use truth_gate_core::Severity;
use truth_gate_core::SourceClass;
use truth_gate_core::StrategyAdvice;
use truth_gate_core::Timestamp;
use truth_gate_core::VerificationAgent;

/// Stub agent with a fixed confidence and source class.
struct FixedAgent {
    /// Roster identity to report.
    name: AgentName,
    /// Source class to report.
    class: SourceClass,
    /// Confidence to return.
    confidence: f64,
    /// Whether to claim an examined field.
    applicable: bool,
}

impl VerificationAgent for FixedAgent {
    fn name(&self) -> AgentName {
        self.name
    }

    fn source_class(&self) -> SourceClass {
        self.class
    }

    fn investigate(
        &self,
        _request: &AuditRequest,
        _view: &LedgerView,
        log: &mut AgentEvidenceLog,
        ctx: &AgentContext,
    ) -> Result<AgentResult, AgentError> {
        log.record(EvidenceKind::Metric, json!({ "stub": true }), ctx.now);
        let checked_fields = if self.applicable {
            vec![ClaimField::new("filesCreated")]
        } else {
            Vec::new()
        };
        Ok(AgentResult {
            agent: self.name,
            verified: true,
            confidence: self.confidence,
            discrepancies: Vec::new(),
            evidence_ids: log.ids(),
            checked_fields,
            duration_ms: 0,
        })
    }
}

/// Stub agent that always errors.
struct BrokenAgent;

impl VerificationAgent for BrokenAgent {
    fn name(&self) -> AgentName {
        AgentName::CodeAnalyzer
    }

    fn source_class(&self) -> SourceClass {
        SourceClass::StaticAnalysis
    }

    fn investigate(
        &self,
        _request: &AuditRequest,
        _view: &LedgerView,
        _log: &mut AgentEvidenceLog,
        _ctx: &AgentContext,
    ) -> Result<AgentResult, AgentError> {
        Err(AgentError::Internal("stub breakage".to_string()))
    }
}

/// Stub agent that sleeps past any reasonable deadline.
struct HangingAgent;

impl VerificationAgent for HangingAgent {
    fn name(&self) -> AgentName {
        AgentName::DeepAnalytics
    }

    fn source_class(&self) -> SourceClass {
        SourceClass::DocumentedEvidence
    }

    fn investigate(
        &self,
        _request: &AuditRequest,
        _view: &LedgerView,
        _log: &mut AgentEvidenceLog,
        _ctx: &AgentContext,
    ) -> Result<AgentResult, AgentError> {
        std::thread::sleep(Duration::from_secs(2));
        Err(AgentError::Internal("never reached".to_string()))
    }
}

/// Returns a request claiming one metric.
fn request() -> AuditRequest {
    AuditRequest::new(
        AuditId::new("orchestrator-test"),
        std::path::PathBuf::from("."),
        Claim::new(BTreeMap::from([(ClaimField::new("filesCreated"), json!(1))])),
        0.95,
        Timestamp::Logical(1),
    )
    .unwrap()
}

/// Returns a config with short deadlines for timeout tests.
fn short_config() -> AuditConfig {
    AuditConfig {
        agent_timeout_ms: 250,
        inference_timeout_ms: 50,
        ..AuditConfig::default()
    }
}

#[tokio::test]
async fn weighted_average_excludes_inapplicable_agents() {
    let roster: Vec<Arc<dyn VerificationAgent>> = vec![
        Arc::new(FixedAgent {
            name: AgentName::FsScanner,
            class: SourceClass::Filesystem,
            confidence: 0.5,
            applicable: true,
        }),
        Arc::new(FixedAgent {
            name: AgentName::ReportVerifier,
            class: SourceClass::SelfReport,
            confidence: 1.0,
            applicable: true,
        }),
        // Would drag the average to 0 if wrongly included.
        Arc::new(FixedAgent {
            name: AgentName::HashIndex,
            class: SourceClass::Filesystem,
            confidence: 0.0,
            applicable: false,
        }),
    ];
    let orchestrator = AuditOrchestrator::new(roster, AuditConfig::default()).unwrap();
    let mut ledger = EvidenceLedger::new(AuditId::new("orchestrator-test"));
    let report = orchestrator
        .run_pass(
            &request(),
            PassLabel::A,
            PassMode::SelfCheck,
            IndependenceConstraint::none(),
            &StrategyAdvice::default(),
            &mut ledger,
        )
        .await;

    // (0.30 * 0.5 + 0.05 * 1.0) / 0.35
    let expected = (0.30_f64 * 0.5 + 0.05) / 0.35;
    assert!((report.confidence - expected).abs() < 1e-9);
    assert_eq!(report.agent_results.len(), 3);
    // All three agents merged their evidence even though one was excluded.
    assert_eq!(ledger.items().len(), 3);
    assert!(ledger.verify_integrity());
}

#[tokio::test]
async fn advisor_multipliers_shift_the_weighting() {
    let roster: Vec<Arc<dyn VerificationAgent>> = vec![
        Arc::new(FixedAgent {
            name: AgentName::FsScanner,
            class: SourceClass::Filesystem,
            confidence: 0.0,
            applicable: true,
        }),
        Arc::new(FixedAgent {
            name: AgentName::ReportVerifier,
            class: SourceClass::SelfReport,
            confidence: 1.0,
            applicable: true,
        }),
    ];
    let orchestrator = AuditOrchestrator::new(roster, AuditConfig::default()).unwrap();
    let mut ledger = EvidenceLedger::new(AuditId::new("orchestrator-test"));
    let advice = StrategyAdvice {
        recommended_weights: BTreeMap::from([(AgentName::FsScanner, 4.0)]),
        risk_score: 0.5,
    };
    let report = orchestrator
        .run_pass(
            &request(),
            PassLabel::A,
            PassMode::SelfCheck,
            IndependenceConstraint::none(),
            &advice,
            &mut ledger,
        )
        .await;

    // Boosting the zero-confidence scanner drags the pass down further than
    // the unboosted (0.30 * 0 + 0.05 * 1) / 0.35 baseline.
    let baseline = 0.05_f64 / 0.35;
    assert!(report.confidence < baseline);
}

#[tokio::test]
async fn failing_agent_degrades_but_never_aborts_the_pass() {
    let roster: Vec<Arc<dyn VerificationAgent>> = vec![
        Arc::new(FixedAgent {
            name: AgentName::FsScanner,
            class: SourceClass::Filesystem,
            confidence: 1.0,
            applicable: true,
        }),
        Arc::new(BrokenAgent),
    ];
    let orchestrator = AuditOrchestrator::new(roster, AuditConfig::default()).unwrap();
    let mut ledger = EvidenceLedger::new(AuditId::new("orchestrator-test"));
    let report = orchestrator
        .run_pass(
            &request(),
            PassLabel::A,
            PassMode::SelfCheck,
            IndependenceConstraint::none(),
            &StrategyAdvice::default(),
            &mut ledger,
        )
        .await;

    assert_eq!(report.failure_count(), 1);
    assert!(report.has_severity(Severity::High));
    // (0.30 * 1.0 + 0.15 * 0.0) / 0.45
    let expected = 0.30_f64 / 0.45;
    assert!((report.confidence - expected).abs() < 1e-9);
    assert!(!report.verified);
}

#[tokio::test]
async fn hanging_agent_is_cut_off_at_the_deadline() {
    let roster: Vec<Arc<dyn VerificationAgent>> = vec![
        Arc::new(FixedAgent {
            name: AgentName::FsScanner,
            class: SourceClass::Filesystem,
            confidence: 1.0,
            applicable: true,
        }),
        Arc::new(HangingAgent),
    ];
    let orchestrator = AuditOrchestrator::new(roster, short_config()).unwrap();
    let mut ledger = EvidenceLedger::new(AuditId::new("orchestrator-test"));
    let report = orchestrator
        .run_pass(
            &request(),
            PassLabel::A,
            PassMode::SelfCheck,
            IndependenceConstraint::none(),
            &StrategyAdvice::default(),
            &mut ledger,
        )
        .await;

    assert_eq!(report.agent_results.len(), 2);
    assert_eq!(report.failure_count(), 1);
    let failure = report
        .agent_results
        .iter()
        .find(|result| result.is_failure())
        .unwrap();
    assert_eq!(failure.agent, AgentName::DeepAnalytics);
    assert!(failure.discrepancies[0].description.contains("deadline exceeded"));
}

#[tokio::test]
async fn out_of_range_confidence_is_clamped() {
    let roster: Vec<Arc<dyn VerificationAgent>> = vec![Arc::new(FixedAgent {
        name: AgentName::FsScanner,
        class: SourceClass::Filesystem,
        confidence: 42.0,
        applicable: true,
    })];
    let orchestrator = AuditOrchestrator::new(roster, AuditConfig::default()).unwrap();
    let mut ledger = EvidenceLedger::new(AuditId::new("orchestrator-test"));
    let report = orchestrator
        .run_pass(
            &request(),
            PassLabel::A,
            PassMode::SelfCheck,
            IndependenceConstraint::none(),
            &StrategyAdvice::default(),
            &mut ledger,
        )
        .await;
    assert!((report.confidence - 1.0).abs() < f64::EPSILON);
    assert!((report.agent_results[0].confidence - 1.0).abs() < f64::EPSILON);
}
