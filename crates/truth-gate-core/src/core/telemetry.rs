// crates/truth-gate-core/src/core/telemetry.rs
// ============================================================================
// Module: Truth Gate Telemetry
// Description: Observability hooks for passes, agents, and inference calls.
// Purpose: Provide audit events and latency signals without hard deps.
// Dependencies: crate::core::identifiers
// ============================================================================

//! ## Overview
//! This module exposes a thin telemetry interface for audit events: pass
//! outcomes, agent durations and timeouts, and decision-engine fallbacks. It
//! is intentionally dependency-light so downstream deployments can plug in
//! Prometheus or OpenTelemetry without redesign. Security posture: telemetry
//! must avoid leaking raw evidence payloads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use crate::core::identifiers::AgentName;
use crate::core::identifiers::PassLabel;

// ============================================================================
// SECTION: Telemetry Hook
// ============================================================================

/// Telemetry sink for audit pipeline events.
///
/// All methods have no-op defaults; implementations override what they need.
pub trait AuditTelemetry: Send + Sync {
    /// Records one agent invocation outcome.
    fn agent_completed(&self, pass: PassLabel, agent: AgentName, duration: Duration, ok: bool) {
        let _ = (pass, agent, duration, ok);
    }

    /// Records an agent deadline expiry.
    fn agent_timed_out(&self, pass: PassLabel, agent: AgentName) {
        let _ = (pass, agent);
    }

    /// Records a completed pass with its weighted confidence.
    fn pass_completed(&self, pass: PassLabel, verified: bool, confidence: f64) {
        let _ = (pass, verified, confidence);
    }

    /// Records a decision-engine fallback to the static strategy.
    fn inference_fallback(&self, pass: PassLabel, reason: &str) {
        let _ = (pass, reason);
    }
}

/// Telemetry sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl AuditTelemetry for NoopTelemetry {}
