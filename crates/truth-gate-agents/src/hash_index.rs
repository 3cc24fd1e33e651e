// crates/truth-gate-agents/src/hash_index.rs
// ============================================================================
// Module: Hash Index Agent
// Description: Content hashing of target files into the evidence chain.
// Purpose: Pin observed file content so later tampering is provable.
// Dependencies: crate::walk, serde_json, truth-gate-core
// ============================================================================

//! ## Overview
//! The hash index does not judge the claim; it anchors the target's observed
//! content in the ledger. Each hashed file becomes a chained evidence item,
//! so a target mutated after the audit can be diffed against what was
//! actually seen. Duplicate content across many files is flagged as a
//! low-severity signal of padded deliverables.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;

use serde_json::json;

use truth_gate_core::AgentContext;
use truth_gate_core::AgentError;
use truth_gate_core::AgentEvidenceLog;
use truth_gate_core::AgentName;
use truth_gate_core::AgentResult;
use truth_gate_core::AuditRequest;
use truth_gate_core::Discrepancy;
use truth_gate_core::EvidenceKind;
use truth_gate_core::LedgerView;
use truth_gate_core::Severity;
use truth_gate_core::SourceClass;
use truth_gate_core::VerificationAgent;
use truth_gate_core::core::hashing::DEFAULT_HASH_ALGORITHM;
use truth_gate_core::core::hashing::hash_bytes;

use crate::metrics::as_f64;

// ============================================================================
// SECTION: Agent
// ============================================================================

/// Maximum files hashed into the ledger per pass.
const MAX_HASHED_FILES: usize = 64;

/// Hashes target file content into chained evidence items.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashIndexAgent;

impl VerificationAgent for HashIndexAgent {
    fn name(&self) -> AgentName {
        AgentName::HashIndex
    }

    fn source_class(&self) -> SourceClass {
        SourceClass::Filesystem
    }

    fn investigate(
        &self,
        request: &AuditRequest,
        _view: &LedgerView,
        log: &mut AgentEvidenceLog,
        ctx: &AgentContext,
    ) -> Result<AgentResult, AgentError> {
        let scan = crate::walk::walk_target(&request.target, ctx.max_files_scanned)?;
        let mut seen: BTreeMap<String, usize> = BTreeMap::new();
        let mut hashed = 0_usize;
        for path in scan.files.iter().take(MAX_HASHED_FILES) {
            let Ok(metadata) = fs::metadata(path) else {
                continue;
            };
            if metadata.len() > u64::try_from(ctx.max_file_bytes).unwrap_or(u64::MAX) {
                continue;
            }
            let Ok(bytes) = fs::read(path) else {
                continue;
            };
            let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes);
            let relative = path
                .strip_prefix(&request.target)
                .unwrap_or(path)
                .display()
                .to_string();
            log.record(
                EvidenceKind::Hash,
                json!({ "path": relative, "sha256": digest.value }),
                ctx.now,
            );
            *seen.entry(digest.value).or_insert(0) += 1;
            hashed += 1;
        }

        let distinct = seen.len();
        log.record(
            EvidenceKind::Other,
            json!({
                "filesHashed": hashed,
                "distinctHashes": distinct,
                "truncated": scan.truncated || scan.files.len() > MAX_HASHED_FILES,
            }),
            ctx.now,
        );

        let duplicates = hashed.saturating_sub(distinct);
        let mut discrepancies: Vec<Discrepancy> = Vec::new();
        let mut confidence = 1.0_f64;
        if duplicates > 0 {
            confidence = as_f64(distinct) / as_f64(hashed);
            discrepancies.push(Discrepancy::unscoped(
                "duplicate-content",
                Severity::Low,
                format!("{duplicates} of {hashed} hashed files duplicate other content"),
            ));
        }

        Ok(AgentResult {
            agent: self.name(),
            verified: true,
            confidence,
            discrepancies,
            evidence_ids: log.ids(),
            // Hash evidence anchors content; it does not check claim fields.
            checked_fields: Vec::new(),
            duration_ms: 0,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
