// crates/truth-gate-core/src/core/evidence.rs
// ============================================================================
// Module: Truth Gate Evidence Ledger
// Description: Hash-chained, append-only evidence records per audit request.
// Purpose: Make every gathered fact tamper-evident under offline recomputation.
// Dependencies: crate::core::{hashing, identifiers, time}, serde, serde_json
// ============================================================================

//! ## Overview
//! The evidence ledger is a single-writer, hash-chained append log: each item
//! binds its payload to the previous item's hash, its timestamp, and its
//! producing agent. Concurrent agents never contend on the chain; they record
//! drafts into per-agent sub-ledgers that are merged into the canonical chain
//! at pass finalization. Tampering with any stored byte is detectable by
//! recomputing the chain. This is a Merkle-chain on a single writer, not a
//! distributed blockchain; no cross-machine consensus is involved.
//!
//! Security posture: persisted ledgers are untrusted on load and must be
//! re-verified before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::chain_hash;
use crate::core::identifiers::AgentName;
use crate::core::identifiers::AuditId;
use crate::core::identifiers::EvidenceId;
use crate::core::identifiers::PassLabel;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed genesis predecessor hash for the first item in every ledger.
pub const GENESIS_PREV_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

// ============================================================================
// SECTION: Evidence Kinds
// ============================================================================

/// Classification of evidence payloads.
///
/// # Invariants
/// - Variants are stable for serialization and report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvidenceKind {
    /// A file or directory existence observation.
    FileExistence,
    /// A file content observation.
    FileContent,
    /// A measured metric (counts, sizes, ratios).
    Metric,
    /// An executed test or check outcome.
    TestResult,
    /// A content hash observation.
    Hash,
    /// Anything else.
    Other,
}

// ============================================================================
// SECTION: Evidence Items
// ============================================================================

/// One hash-chained, immutable fact gathered by an agent.
///
/// # Invariants
/// - `hash` equals the chain hash of `(payload, prev_hash, recorded_at, producer)`.
/// - Appended once; never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Draft-time identifier, unique within one audit request.
    pub id: EvidenceId,
    /// Evidence classification.
    pub kind: EvidenceKind,
    /// Agent that produced the evidence.
    pub producer: AgentName,
    /// Pass the evidence was gathered in, when agent-produced.
    pub pass: Option<PassLabel>,
    /// Evidence payload as canonicalizable JSON.
    pub payload: Value,
    /// Time the evidence was recorded.
    pub recorded_at: Timestamp,
    /// Hash of the previous chain item (genesis constant for the first).
    pub prev_hash: String,
    /// Chain hash of this item.
    pub hash: HashDigest,
}

/// Draft evidence recorded by an agent before chain finalization.
///
/// # Invariants
/// - Drafts carry the identifier the final chained item will keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceDraft {
    /// Draft identifier, stable through finalization.
    pub id: EvidenceId,
    /// Evidence classification.
    pub kind: EvidenceKind,
    /// Pass the draft was gathered in.
    pub pass: Option<PassLabel>,
    /// Evidence payload.
    pub payload: Value,
    /// Time the evidence was recorded.
    pub recorded_at: Timestamp,
}

// ============================================================================
// SECTION: Per-Agent Sub-Ledger
// ============================================================================

/// Append-only draft log owned by one agent during one pass.
///
/// Agents write here without any cross-agent locking; the orchestrator merges
/// completed logs into the canonical chain in completion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEvidenceLog {
    /// Producing agent.
    producer: AgentName,
    /// Pass the log belongs to.
    pass: PassLabel,
    /// Recorded drafts in append order.
    drafts: Vec<EvidenceDraft>,
}

impl AgentEvidenceLog {
    /// Creates an empty log for one agent and pass.
    #[must_use]
    pub const fn new(producer: AgentName, pass: PassLabel) -> Self {
        Self {
            producer,
            pass,
            drafts: Vec::new(),
        }
    }

    /// Records a draft and returns its identifier.
    pub fn record(
        &mut self,
        kind: EvidenceKind,
        payload: Value,
        recorded_at: Timestamp,
    ) -> EvidenceId {
        let id = EvidenceId::new(format!(
            "{}/{}/{}",
            self.pass,
            self.producer,
            self.drafts.len()
        ));
        self.drafts.push(EvidenceDraft {
            id: id.clone(),
            kind,
            pass: Some(self.pass),
            payload,
            recorded_at,
        });
        id
    }

    /// Returns the producing agent.
    #[must_use]
    pub const fn producer(&self) -> AgentName {
        self.producer
    }

    /// Returns the identifiers of all recorded drafts.
    #[must_use]
    pub fn ids(&self) -> Vec<EvidenceId> {
        self.drafts.iter().map(|draft| draft.id.clone()).collect()
    }

    /// Returns the number of recorded drafts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    /// Returns true when no drafts were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Consumes the log and returns its drafts in append order.
    #[must_use]
    pub fn into_drafts(self) -> Vec<EvidenceDraft> {
        self.drafts
    }
}

// ============================================================================
// SECTION: Ledger Errors
// ============================================================================

/// Evidence ledger errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Payload canonicalization failed during append.
    #[error("evidence serialization failure: {0}")]
    Serialization(#[from] HashError),
    /// Chain recomputation found a mismatch.
    #[error("evidence ledger tamper detected at index {index}")]
    TamperDetected {
        /// Index of the first mismatching item.
        index: usize,
    },
}

// ============================================================================
// SECTION: Evidence Ledger
// ============================================================================

/// Ordered, tamper-evident sequence of evidence items for one audit request.
///
/// # Invariants
/// - Single writer: appends are serialized per ledger instance.
/// - For every item `i > 0`, `items[i].prev_hash == items[i-1].hash.value`.
/// - Items are never reordered after append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceLedger {
    /// Audit request the ledger belongs to.
    request_id: AuditId,
    /// Chain hash algorithm.
    algorithm: HashAlgorithm,
    /// Canonical chained items in append order.
    items: Vec<EvidenceItem>,
}

impl EvidenceLedger {
    /// Creates an empty ledger for one audit request.
    #[must_use]
    pub const fn new(request_id: AuditId) -> Self {
        Self {
            request_id,
            algorithm: DEFAULT_HASH_ALGORITHM,
            items: Vec::new(),
        }
    }

    /// Returns the owning audit request identifier.
    #[must_use]
    pub const fn request_id(&self) -> &AuditId {
        &self.request_id
    }

    /// Appends a single item to the canonical chain.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Serialization`] when the payload cannot be
    /// canonicalized. Append never fails for any other reason.
    pub fn append(
        &mut self,
        producer: AgentName,
        kind: EvidenceKind,
        payload: Value,
        recorded_at: Timestamp,
    ) -> Result<EvidenceItem, LedgerError> {
        let id = EvidenceId::new(format!("ledger/{}/{}", producer, self.items.len()));
        self.append_draft(
            EvidenceDraft {
                id,
                kind,
                pass: None,
                payload,
                recorded_at,
            },
            producer,
        )
    }

    /// Merges a completed per-agent sub-ledger into the canonical chain.
    ///
    /// Drafts keep their identifiers and append order; the chain hash is
    /// computed at merge time from the current tail.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Serialization`] when a payload cannot be
    /// canonicalized.
    pub fn merge_log(&mut self, log: AgentEvidenceLog) -> Result<Vec<EvidenceId>, LedgerError> {
        let producer = log.producer();
        let drafts = log.into_drafts();
        let mut ids = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let item = self.append_draft(draft, producer)?;
            ids.push(item.id);
        }
        Ok(ids)
    }

    /// Chains one draft onto the tail.
    fn append_draft(
        &mut self,
        draft: EvidenceDraft,
        producer: AgentName,
    ) -> Result<EvidenceItem, LedgerError> {
        let prev_hash = self.tail_hash();
        let hash = chain_hash(
            self.algorithm,
            &draft.payload,
            &prev_hash,
            draft.recorded_at,
            producer,
        )?;
        let item = EvidenceItem {
            id: draft.id,
            kind: draft.kind,
            producer,
            pass: draft.pass,
            payload: draft.payload,
            recorded_at: draft.recorded_at,
            prev_hash,
            hash,
        };
        self.items.push(item.clone());
        Ok(item)
    }

    /// Returns the current tail hash (genesis constant for an empty ledger).
    #[must_use]
    pub fn tail_hash(&self) -> String {
        self.items
            .last()
            .map_or_else(|| GENESIS_PREV_HASH.to_string(), |item| item.hash.value.clone())
    }

    /// Returns all items in chain order.
    #[must_use]
    pub fn items(&self) -> &[EvidenceItem] {
        &self.items
    }

    /// Looks up an item by identifier.
    #[must_use]
    pub fn get(&self, id: &EvidenceId) -> Option<&EvidenceItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Recomputes the whole chain and reports integrity.
    ///
    /// Returns false on any recomputation mismatch (tamper or corruption)
    /// and on any payload that no longer canonicalizes.
    #[must_use]
    pub fn verify_integrity(&self) -> bool {
        self.first_tampered_index().is_none()
    }

    /// Returns the index of the first mismatching item, when any.
    #[must_use]
    pub fn first_tampered_index(&self) -> Option<usize> {
        let mut prev = GENESIS_PREV_HASH.to_string();
        for (index, item) in self.items.iter().enumerate() {
            if item.prev_hash != prev {
                return Some(index);
            }
            let Ok(expected) = chain_hash(
                self.algorithm,
                &item.payload,
                &item.prev_hash,
                item.recorded_at,
                item.producer,
            ) else {
                return Some(index);
            };
            if expected != item.hash {
                return Some(index);
            }
            prev = item.hash.value.clone();
        }
        None
    }
}
