// crates/truth-gate-core/src/runtime/queen.rs
// ============================================================================
// Module: Decision Engine
// Description: Strategy selection with a mandatory deterministic fallback.
// Purpose: Consult the inference collaborator without ever blocking a pass.
// Dependencies: crate::{core, interfaces}, tokio
// ============================================================================

//! ## Overview
//! Before each pass the decision engine ("queen") may consult an external
//! strategy advisor for agent weighting and a risk estimate. The
//! consultation runs under its own deadline, configured strictly tighter
//! than the agent deadline, and every failure mode (unreachable, timeout,
//! schema violation, out-of-range advice) falls back to the static default
//! strategy. The engine never touches evidence; it only influences
//! orchestrator weighting and timeout budgets for the next pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::core::AuditTelemetry;
use crate::core::NoopTelemetry;
use crate::interfaces::StrategyAdvice;
use crate::interfaces::StrategyAdvisor;
use crate::interfaces::StrategyContext;

// ============================================================================
// SECTION: Decision Engine
// ============================================================================

/// Strategy-selection layer over a pluggable advisor.
pub struct DecisionEngine {
    /// Advisor implementation (inference-backed or static).
    advisor: Arc<dyn StrategyAdvisor>,
    /// Consultation deadline; tighter than the agent deadline by config
    /// validation.
    deadline: Duration,
    /// Telemetry sink.
    telemetry: Arc<dyn AuditTelemetry>,
}

impl DecisionEngine {
    /// Creates a decision engine over an advisor.
    #[must_use]
    pub fn new(advisor: Arc<dyn StrategyAdvisor>, deadline: Duration) -> Self {
        Self::with_telemetry(advisor, deadline, Arc::new(NoopTelemetry))
    }

    /// Creates a decision engine with an explicit telemetry sink.
    #[must_use]
    pub fn with_telemetry(
        advisor: Arc<dyn StrategyAdvisor>,
        deadline: Duration,
        telemetry: Arc<dyn AuditTelemetry>,
    ) -> Self {
        Self {
            advisor,
            deadline,
            telemetry,
        }
    }

    /// Produces advice for the next pass, falling back on any failure.
    ///
    /// This call is bounded by the engine deadline and cannot fail; the
    /// fallback is the static default strategy.
    pub async fn plan_pass(&self, ctx: StrategyContext) -> StrategyAdvice {
        let pass = ctx.next_pass;
        let advisor = Arc::clone(&self.advisor);
        let work = tokio::task::spawn_blocking(move || advisor.advise(&ctx));
        match timeout(self.deadline, work).await {
            Ok(Ok(Ok(advice))) => {
                if advice.is_valid() {
                    advice
                } else {
                    self.telemetry.inference_fallback(pass, "advice out of range");
                    StrategyAdvice::default()
                }
            }
            Ok(Ok(Err(err))) => {
                self.telemetry.inference_fallback(pass, &err.to_string());
                StrategyAdvice::default()
            }
            Ok(Err(join_err)) => {
                self.telemetry.inference_fallback(pass, &join_err.to_string());
                StrategyAdvice::default()
            }
            Err(_elapsed) => {
                self.telemetry.inference_fallback(pass, "deadline exceeded");
                StrategyAdvice::default()
            }
        }
    }
}
