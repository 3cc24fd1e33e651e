// crates/truth-gate-agents/src/lib.rs
// ============================================================================
// Module: Truth Gate Agents Library
// Description: The default verification agent roster and registry.
// Purpose: Provide ground-truth investigation behind the fixed agent contract.
// Dependencies: truth-gate-core
// ============================================================================

//! ## Overview
//! Seven specialized agents implement the core
//! [`truth_gate_core::VerificationAgent`] contract: claim self-consistency,
//! filesystem scanning, source-structure analysis, version-control
//! cross-referencing, cross-agent analytics, deliverable gap scanning, and
//! content-hash indexing. All agents are read-only on the target and bounded
//! by the context limits. Heuristics are intentionally modest; each agent is
//! a pluggable strategy behind the fixed contract.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod analytics;
pub mod code;
pub mod fs_scan;
pub mod gap;
pub mod hash_index;
mod metrics;
pub mod registry;
pub mod report;
pub mod vcs;
mod walk;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use analytics::DeepAnalyticsAgent;
pub use code::CodeAnalyzerAgent;
pub use fs_scan::FsScannerAgent;
pub use gap::GapScannerAgent;
pub use hash_index::HashIndexAgent;
pub use registry::AgentRegistry;
pub use report::ReportVerifierAgent;
pub use vcs::CrossReferencerAgent;
