// crates/truth-gate-core/src/core/claim.rs
// ============================================================================
// Module: Truth Gate Claims
// Description: Claims about completed work and the audit request envelope.
// Purpose: Validate caller-asserted metrics before any verification pass runs.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A claim maps named metrics to claimed values plus an optional free-text
//! report reference. Claims are immutable once submitted and validated
//! eagerly: a malformed claim rejects the whole request before any pass
//! runs. Security posture: claims are untrusted caller input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::AuditId;
use crate::core::identifiers::ClaimField;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Claim Errors
// ============================================================================

/// Claim validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Claim contains no metrics.
    #[error("claim has no metrics")]
    Empty,
    /// Claim field name is empty.
    #[error("claim field name is empty")]
    EmptyFieldName,
    /// Claim metric value is not a finite, non-negative number.
    #[error("claim metric {field} is not a finite non-negative number")]
    InvalidMetric {
        /// Offending claim field.
        field: String,
    },
    /// Minimum confidence is outside the unit interval.
    #[error("min confidence {value} outside [0, 1]")]
    InvalidMinConfidence {
        /// Offending confidence value.
        value: f64,
    },
}

// ============================================================================
// SECTION: Claim
// ============================================================================

/// Caller-asserted metrics about completed work.
///
/// # Invariants
/// - Immutable once submitted; validation happens at request construction.
/// - Metric values are JSON numbers (counts) or arrays/strings for
///   deliverable listings; numeric metrics must be finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Named metrics, e.g. `filesCreated: 89`.
    pub metrics: BTreeMap<ClaimField, Value>,
    /// Optional path to a free-text report backing the claim.
    pub report_ref: Option<PathBuf>,
}

impl Claim {
    /// Creates a claim from metrics with no report reference.
    #[must_use]
    pub const fn new(metrics: BTreeMap<ClaimField, Value>) -> Self {
        Self {
            metrics,
            report_ref: None,
        }
    }

    /// Returns the claimed numeric value for a field, if present and numeric.
    #[must_use]
    pub fn numeric(&self, field: &str) -> Option<f64> {
        self.metrics.get(&ClaimField::new(field)).and_then(Value::as_f64)
    }

    /// Validates the claim structure.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError`] when the claim is empty or a metric is
    /// malformed.
    pub fn validate(&self) -> Result<(), ClaimError> {
        if self.metrics.is_empty() {
            return Err(ClaimError::Empty);
        }
        for (field, value) in &self.metrics {
            if field.as_str().is_empty() {
                return Err(ClaimError::EmptyFieldName);
            }
            if let Some(number) = value.as_f64() {
                if !number.is_finite() || number < 0.0 {
                    return Err(ClaimError::InvalidMetric {
                        field: field.as_str().to_string(),
                    });
                }
            } else if !(value.is_array() || value.is_string()) {
                return Err(ClaimError::InvalidMetric {
                    field: field.as_str().to_string(),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit Request
// ============================================================================

/// Audit request binding a claim to a target path and confidence floor.
///
/// # Invariants
/// - Created per invocation; never mutated.
/// - `min_confidence` lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRequest {
    /// Request identifier.
    pub id: AuditId,
    /// Filesystem path the claim is checked against. Read-only for agents.
    pub target: PathBuf,
    /// The claim under verification.
    pub claim: Claim,
    /// Confidence threshold required for a verified outcome.
    pub min_confidence: f64,
    /// Request creation time supplied by the host.
    pub created_at: Timestamp,
}

impl AuditRequest {
    /// Creates a validated audit request.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError`] when the claim is malformed or the confidence
    /// floor is outside the unit interval.
    pub fn new(
        id: AuditId,
        target: PathBuf,
        claim: Claim,
        min_confidence: f64,
        created_at: Timestamp,
    ) -> Result<Self, ClaimError> {
        claim.validate()?;
        if !(0.0 ..= 1.0).contains(&min_confidence) {
            return Err(ClaimError::InvalidMinConfidence {
                value: min_confidence,
            });
        }
        Ok(Self {
            id,
            target,
            claim,
            min_confidence,
            created_at,
        })
    }
}
