// crates/truth-gate-core/tests/properties.rs
// ============================================================================
// Module: Protocol Property Tests
// Description: Property-based checks for chain integrity and aggregation.
// ============================================================================
//! ## Overview
//! Randomized checks over the two load-bearing guarantees: any single-item
//! mutation of a serialized ledger is detected at or before the mutated
//! index, and the final audit confidence is always the minimum of the three
//! pass confidences.

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

use proptest::prelude::ProptestConfig;
use proptest::prelude::prop;
use proptest::prelude::prop_assert;
use proptest::prelude::prop_assert_eq;
use proptest::prelude::proptest;
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
use truth_gate_core::runtime::AuditRun;

/// Advisor stub returning the neutral default advice.
struct NeutralAdvisor;

impl StrategyAdvisor for NeutralAdvisor {
    fn advise(&self, _ctx: &StrategyContext) -> Result<StrategyAdvice, InferenceError> {
        Ok(StrategyAdvice::default())
    }
}

/// Agent returning a fixed confidence per pass.
struct ScriptedAgent {
    /// Confidence returned for passes A, B, and C in order.
    confidences: [f64; 3],
    /// Whether to raise a critical mismatch in the adversarial pass.
    critical_in_c: bool,
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
        let discrepancies = if self.critical_in_c && ctx.pass == PassLabel::C {
            vec![Discrepancy::for_field(
                "file-count-mismatch",
                Severity::Critical,
                ClaimField::new("filesCreated"),
                json!(1),
                json!(0),
                "scripted critical mismatch",
            )]
        } else {
            Vec::new()
        };
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

/// Builds a ledger from arbitrary payload values.
fn ledger_from(values: &[u64]) -> EvidenceLedger {
    let mut ledger = EvidenceLedger::new(AuditId::new("property-test"));
    for (index, value) in values.iter().enumerate() {
        ledger
            .append(
                AgentName::FsScanner,
                EvidenceKind::Metric,
                json!({ "value": value }),
                Timestamp::Logical(u64::try_from(index).unwrap()),
            )
            .unwrap();
    }
    ledger
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_honestly_built_chain_verifies(values in prop::collection::vec(0_u64 .. 1_000_000, 1 .. 32)) {
        let ledger = ledger_from(&values);
        prop_assert!(ledger.verify_integrity());
        prop_assert!(ledger.first_tampered_index().is_none());
    }

    #[test]
    fn any_payload_mutation_is_detected(
        values in prop::collection::vec(0_u64 .. 1_000_000, 2 .. 16),
        index_seed in 0_usize .. 16,
    ) {
        let ledger = ledger_from(&values);
        let index = index_seed % values.len();
        let mut exported = serde_json::to_value(&ledger).unwrap();
        // Push the payload outside the value domain so the mutation is real.
        exported["items"][index]["payload"]["value"] = json!(2_000_000);
        let tampered: EvidenceLedger = serde_json::from_value(exported).unwrap();
        prop_assert!(!tampered.verify_integrity());
        prop_assert_eq!(tampered.first_tampered_index(), Some(index));
    }
}

/// Runs the full protocol with one scripted agent on a fresh runtime.
fn run_protocol(confidences: [f64; 3], critical_in_c: bool) -> AuditRun {
    let config = AuditConfig::default();
    let roster: Vec<Arc<dyn VerificationAgent>> = vec![Arc::new(ScriptedAgent {
        confidences,
        critical_in_c,
    })];
    let orchestrator = AuditOrchestrator::new(roster, config.clone()).unwrap();
    let engine = DecisionEngine::new(Arc::new(NeutralAdvisor), config.inference_timeout());
    let gate = TruthGate::new(orchestrator, engine, config).unwrap();
    let request = AuditRequest::new(
        AuditId::new("property-test"),
        PathBuf::from("."),
        Claim::new(BTreeMap::from([(ClaimField::new("filesCreated"), json!(1))])),
        0.95,
        Timestamp::Logical(1),
    )
    .unwrap();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    runtime.block_on(gate.run(&request)).unwrap()
}

proptest! {
    // Each case spins a runtime and runs the full protocol; keep cases low.
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn final_confidence_is_the_minimum_over_passes(
        a in 0.0_f64 ..= 1.0,
        b in 0.0_f64 ..= 1.0,
        c in 0.0_f64 ..= 1.0,
    ) {
        let run = run_protocol([a, b, c], false);

        let expected = a.min(b).min(c);
        prop_assert!((run.result.confidence - expected).abs() < 1e-9);
        prop_assert_eq!(run.result.verified, expected >= 0.95);
        prop_assert!(run.ledger.verify_integrity());
    }

    #[test]
    fn a_critical_discrepancy_never_improves_the_outcome(
        a in 0.0_f64 ..= 1.0,
        b in 0.0_f64 ..= 1.0,
        c in 0.0_f64 ..= 1.0,
    ) {
        let clean = run_protocol([a, b, c], false);
        let flagged = run_protocol([a, b, c], true);

        prop_assert!(!flagged.result.verified);
        prop_assert!(flagged.result.confidence <= clean.result.confidence + 1e-9);
        prop_assert!(
            flagged
                .result
                .discrepancies
                .iter()
                .any(|d| d.kind == "file-count-mismatch")
        );
    }
}
