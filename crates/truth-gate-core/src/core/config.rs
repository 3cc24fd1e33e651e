// crates/truth-gate-core/src/core/config.rs
// ============================================================================
// Module: Truth Gate Configuration
// Description: Explicit audit configuration threaded through constructors.
// Purpose: Replace global mutable configuration with validated, local state.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! `AuditConfig` carries all tunables: the confidence floor, the A/B
//! agreement threshold, agent and inference deadlines, concurrency caps,
//! read bounds for agents, and the source-of-truth weight table. The config
//! is validated once and passed by reference; there is no process-wide
//! mutable state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Source Classes
// ============================================================================

/// Source-of-truth classes, ordered by documented priority.
///
/// Filesystem outranks version-control history, which outranks executed
/// tests, static analysis, documented evidence, and agent self-reports.
///
/// # Invariants
/// - Variants are stable for serialization and weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceClass {
    /// Direct filesystem observation.
    Filesystem,
    /// Version-control history and metadata.
    VersionControl,
    /// Executed test or check results.
    TestExecution,
    /// Static analysis of source structure.
    StaticAnalysis,
    /// Documented evidence (hashes, indices, reports on disk).
    DocumentedEvidence,
    /// Agent or claim self-reports.
    SelfReport,
}

/// Weight table for source classes.
///
/// # Invariants
/// - Weights are finite and non-negative; validation rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceWeights {
    /// Weight for direct filesystem observation.
    pub filesystem: f64,
    /// Weight for version-control history.
    pub version_control: f64,
    /// Weight for executed test results.
    pub test_execution: f64,
    /// Weight for static analysis.
    pub static_analysis: f64,
    /// Weight for documented evidence.
    pub documented_evidence: f64,
    /// Weight for self-reports.
    pub self_report: f64,
}

impl SourceWeights {
    /// Returns the weight for a source class.
    #[must_use]
    pub const fn weight(&self, class: SourceClass) -> f64 {
        match class {
            SourceClass::Filesystem => self.filesystem,
            SourceClass::VersionControl => self.version_control,
            SourceClass::TestExecution => self.test_execution,
            SourceClass::StaticAnalysis => self.static_analysis,
            SourceClass::DocumentedEvidence => self.documented_evidence,
            SourceClass::SelfReport => self.self_report,
        }
    }

    /// Returns all weights for validation.
    const fn all(&self) -> [f64; 6] {
        [
            self.filesystem,
            self.version_control,
            self.test_execution,
            self.static_analysis,
            self.documented_evidence,
            self.self_report,
        ]
    }
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            filesystem: 0.30,
            version_control: 0.25,
            test_execution: 0.20,
            static_analysis: 0.15,
            documented_evidence: 0.10,
            self_report: 0.05,
        }
    }
}

// ============================================================================
// SECTION: Configuration Errors
// ============================================================================

/// Configuration validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Confidence floor outside the unit interval.
    #[error("min confidence {value} outside [0, 1]")]
    InvalidMinConfidence {
        /// Offending value.
        value: f64,
    },
    /// Agreement threshold outside the unit interval.
    #[error("agreement threshold {value} outside [0, 1]")]
    InvalidAgreementThreshold {
        /// Offending value.
        value: f64,
    },
    /// Inference deadline is not tighter than the agent deadline.
    #[error("inference timeout {inference_ms}ms must be tighter than agent timeout {agent_ms}ms")]
    InferenceDeadlineTooLoose {
        /// Configured inference timeout in milliseconds.
        inference_ms: u64,
        /// Configured agent timeout in milliseconds.
        agent_ms: u64,
    },
    /// A source weight is negative or non-finite.
    #[error("source weights must be finite and non-negative")]
    InvalidSourceWeights,
    /// Concurrency cap of zero.
    #[error("max concurrent audits must be at least 1")]
    ZeroConcurrency,
}

// ============================================================================
// SECTION: Audit Configuration
// ============================================================================

/// Audit configuration threaded through the truth gate constructor.
///
/// # Invariants
/// - `inference_timeout_ms < agent_timeout_ms` so the decision engine
///   fallback can never stall a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Default confidence floor for requests that do not set one.
    pub min_confidence: f64,
    /// Pass A/B agreement threshold below which a claim is flagged disputed.
    pub agreement_threshold: f64,
    /// Per-agent deadline in milliseconds.
    pub agent_timeout_ms: u64,
    /// Decision-engine inference deadline in milliseconds.
    pub inference_timeout_ms: u64,
    /// Maximum number of full audit pipelines a host may run in parallel.
    pub max_concurrent_audits: usize,
    /// Maximum files an agent may visit under the target.
    pub max_files_scanned: usize,
    /// Maximum bytes an agent may read from a single file.
    pub max_file_bytes: usize,
    /// Source-of-truth weight table.
    pub source_weights: SourceWeights,
}

impl AuditConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for out-of-range thresholds, weights, or
    /// deadline ordering violations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0 ..= 1.0).contains(&self.min_confidence) {
            return Err(ConfigError::InvalidMinConfidence {
                value: self.min_confidence,
            });
        }
        if !(0.0 ..= 1.0).contains(&self.agreement_threshold) {
            return Err(ConfigError::InvalidAgreementThreshold {
                value: self.agreement_threshold,
            });
        }
        if self.inference_timeout_ms >= self.agent_timeout_ms {
            return Err(ConfigError::InferenceDeadlineTooLoose {
                inference_ms: self.inference_timeout_ms,
                agent_ms: self.agent_timeout_ms,
            });
        }
        if self
            .source_weights
            .all()
            .iter()
            .any(|weight| !weight.is_finite() || *weight < 0.0)
        {
            return Err(ConfigError::InvalidSourceWeights);
        }
        if self.max_concurrent_audits == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }

    /// Returns the agent deadline as a [`Duration`].
    #[must_use]
    pub const fn agent_timeout(&self) -> Duration {
        Duration::from_millis(self.agent_timeout_ms)
    }

    /// Returns the inference deadline as a [`Duration`].
    #[must_use]
    pub const fn inference_timeout(&self) -> Duration {
        Duration::from_millis(self.inference_timeout_ms)
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.95,
            agreement_threshold: 0.80,
            agent_timeout_ms: 10_000,
            inference_timeout_ms: 2_000,
            max_concurrent_audits: 4,
            max_files_scanned: 50_000,
            max_file_bytes: 4 * 1024 * 1024,
            source_weights: SourceWeights::default(),
        }
    }
}
