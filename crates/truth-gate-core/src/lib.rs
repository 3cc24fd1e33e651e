// crates/truth-gate-core/src/lib.rs
// ============================================================================
// Module: Truth Gate Core Library
// Description: Public API surface for the Truth Gate core.
// Purpose: Expose claim, evidence, interface, and runtime types.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Truth Gate core provides tamper-evident claim verification: a hash-chained
//! evidence ledger, a fixed agent contract, a concurrent audit orchestrator,
//! and a triple-pass truth gate that aggregates conservative confidence
//! scores. It is backend-agnostic and integrates through explicit interfaces
//! rather than embedding into agent frameworks.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AgentContext;
pub use interfaces::AgentError;
pub use interfaces::IndependenceConstraint;
pub use interfaces::InferenceError;
pub use interfaces::LedgerView;
pub use interfaces::PassMode;
pub use interfaces::StrategyAdvice;
pub use interfaces::StrategyAdvisor;
pub use interfaces::StrategyContext;
pub use interfaces::VerificationAgent;
pub use runtime::AuditError;
pub use runtime::AuditOrchestrator;
pub use runtime::DecisionEngine;
pub use runtime::TruthGate;
