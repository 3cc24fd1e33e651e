// crates/truth-gate-core/src/core/mod.rs
// ============================================================================
// Module: Truth Gate Core Types
// Description: Claims, evidence, discrepancies, results, and configuration.
// Purpose: Group the data model shared by interfaces and runtime.
// Dependencies: crate::core::*
// ============================================================================

//! ## Overview
//! The core module owns the audit data model. All records are plain serde
//! types with stable wire forms; mutation is confined to the evidence ledger
//! tail and everything else is immutable once constructed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod claim;
pub mod config;
pub mod discrepancy;
pub mod evidence;
pub mod hashing;
pub mod identifiers;
pub mod result;
pub mod telemetry;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use claim::AuditRequest;
pub use claim::Claim;
pub use claim::ClaimError;
pub use config::AuditConfig;
pub use config::ConfigError;
pub use config::SourceClass;
pub use config::SourceWeights;
pub use discrepancy::Discrepancy;
pub use discrepancy::Severity;
pub use evidence::AgentEvidenceLog;
pub use evidence::EvidenceItem;
pub use evidence::EvidenceKind;
pub use evidence::EvidenceLedger;
pub use evidence::GENESIS_PREV_HASH;
pub use evidence::LedgerError;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use identifiers::AgentName;
pub use identifiers::AuditId;
pub use identifiers::ClaimField;
pub use identifiers::EvidenceId;
pub use identifiers::PassLabel;
pub use result::AgentResult;
pub use result::AuditResult;
pub use result::PassReport;
pub use result::PassSummary;
pub use telemetry::AuditTelemetry;
pub use telemetry::NoopTelemetry;
pub use time::Timestamp;
