// crates/truth-gate-inference/src/static_strategy.rs
// ============================================================================
// Module: Static Strategy Advisor
// Description: Deterministic, infallible strategy advice.
// Purpose: Keep audits fully specified when no inference endpoint exists.
// Dependencies: truth-gate-core
// ============================================================================

//! ## Overview
//! The static strategy derives advice from the strategy context alone: risk
//! starts at the neutral midpoint, rises when earlier passes found
//! discrepancies or failed agents, and falls when earlier passes verified
//! cleanly. In the adversarial pass it boosts the ground-truth agents so the
//! challenge round digs where claims are most often inflated. It never
//! errs, which makes it the terminal fallback of the advice chain.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use truth_gate_core::AgentName;
use truth_gate_core::InferenceError;
use truth_gate_core::PassLabel;
use truth_gate_core::StrategyAdvice;
use truth_gate_core::StrategyAdvisor;
use truth_gate_core::StrategyContext;

// ============================================================================
// SECTION: Advisor
// ============================================================================

/// Weight boost applied to ground-truth agents in the adversarial pass.
const ADVERSARIAL_BOOST: f64 = 1.5;

/// Deterministic advisor requiring no external service.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticStrategy;

impl StrategyAdvisor for StaticStrategy {
    fn advise(&self, ctx: &StrategyContext) -> Result<StrategyAdvice, InferenceError> {
        let mut risk = 0.5_f64;
        for pass in &ctx.prior_passes {
            if pass.discrepancy_count > 0 || pass.agent_failures > 0 {
                risk += 0.2;
            } else if pass.verified {
                risk -= 0.15;
            }
        }

        let mut weights: BTreeMap<AgentName, f64> = BTreeMap::new();
        if ctx.next_pass == PassLabel::C {
            weights.insert(AgentName::FsScanner, ADVERSARIAL_BOOST);
            weights.insert(AgentName::GapScanner, ADVERSARIAL_BOOST);
        }

        Ok(StrategyAdvice {
            recommended_weights: weights,
            risk_score: risk.clamp(0.0, 1.0),
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
