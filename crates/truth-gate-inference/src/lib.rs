// crates/truth-gate-inference/src/lib.rs
// ============================================================================
// Module: Truth Gate Inference Library
// Description: Strategy advisors backing the decision engine.
// Purpose: Provide the HTTP inference client and its deterministic fallback.
// Dependencies: truth-gate-core
// ============================================================================

//! ## Overview
//! Two [`truth_gate_core::StrategyAdvisor`] implementations live here: an
//! HTTP client for an external inference endpoint, and a deterministic
//! static strategy used standalone or as the fallback the decision engine
//! applies when inference is unavailable, late, or out of range. Advice is
//! advisory only; nothing in this crate can widen what the audit verifies.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod http;
pub mod static_strategy;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use http::HttpAdvisor;
pub use http::HttpAdvisorConfig;
pub use static_strategy::StaticStrategy;
