// crates/truth-gate-agents/src/registry.rs
// ============================================================================
// Module: Agent Registry
// Description: Roster assembly for the verification agents.
// Purpose: Build and hand the orchestrator a complete, deduplicated roster.
// Dependencies: crate::*, truth-gate-core
// ============================================================================

//! ## Overview
//! The registry owns the mapping from roster name to agent implementation.
//! Registration replaces any previous agent under the same name, so hosts
//! can swap a single default agent without rebuilding the roster by hand.
//! [`AgentRegistry::default_roster`] yields the full seven-agent roster in
//! canonical order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use truth_gate_core::AgentName;
use truth_gate_core::VerificationAgent;

use crate::analytics::DeepAnalyticsAgent;
use crate::code::CodeAnalyzerAgent;
use crate::fs_scan::FsScannerAgent;
use crate::gap::GapScannerAgent;
use crate::hash_index::HashIndexAgent;
use crate::report::ReportVerifierAgent;
use crate::vcs::CrossReferencerAgent;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Roster registry keyed by agent name.
#[derive(Default)]
pub struct AgentRegistry {
    /// Registered agents in canonical name order.
    agents: BTreeMap<AgentName, Arc<dyn VerificationAgent>>,
}

impl AgentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry populated with the default seven-agent roster.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ReportVerifierAgent));
        registry.register(Arc::new(FsScannerAgent));
        registry.register(Arc::new(CodeAnalyzerAgent::default()));
        registry.register(Arc::new(CrossReferencerAgent));
        registry.register(Arc::new(DeepAnalyticsAgent));
        registry.register(Arc::new(GapScannerAgent));
        registry.register(Arc::new(HashIndexAgent));
        registry
    }

    /// Registers an agent, replacing any existing agent with the same name.
    pub fn register(&mut self, agent: Arc<dyn VerificationAgent>) {
        self.agents.insert(agent.name(), agent);
    }

    /// Looks up an agent by roster name.
    #[must_use]
    pub fn get(&self, name: AgentName) -> Option<&Arc<dyn VerificationAgent>> {
        self.agents.get(&name)
    }

    /// Returns the number of registered agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Returns true when no agents are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Consumes the registry into an orchestrator roster in canonical order.
    #[must_use]
    pub fn into_roster(self) -> Vec<Arc<dyn VerificationAgent>> {
        self.agents.into_values().collect()
    }

    /// Returns the full default roster in canonical order.
    #[must_use]
    pub fn default_roster() -> Vec<Arc<dyn VerificationAgent>> {
        Self::with_defaults().into_roster()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
