// crates/truth-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Truth Gate Runtime
// Description: Audit orchestration, decision engine, and the truth gate.
// Purpose: Execute the triple-verification protocol over the agent roster.
// Dependencies: crate::{core, interfaces}, tokio
// ============================================================================

//! ## Overview
//! The runtime fans agents out on a bounded blocking pool, enforces per-agent
//! deadlines, merges per-agent evidence into the canonical ledger, and runs
//! the A/B/C pass protocol with conservative aggregation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod orchestrator;
pub mod queen;
pub mod truth_gate;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use orchestrator::AuditOrchestrator;
pub use queen::DecisionEngine;
pub use truth_gate::AuditError;
pub use truth_gate::AuditRun;
pub use truth_gate::TruthGate;
