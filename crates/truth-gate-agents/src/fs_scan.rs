// crates/truth-gate-agents/src/fs_scan.rs
// ============================================================================
// Module: Filesystem Scanner Agent
// Description: Counts actual files, lines, and directories under the target.
// Purpose: Ground file-count and line-count claims in observed filesystem state.
// Dependencies: crate::{metrics, walk}, serde_json, truth-gate-core
// ============================================================================

//! ## Overview
//! The filesystem scanner is the primary ground-truth agent: it walks the
//! target tree once and compares the observed file, line, and directory
//! counts against the corresponding claim fields. Confidence is the worst
//! support ratio over the checked fields, so one badly inflated count drags
//! the whole result down instead of averaging away.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::json;

use truth_gate_core::AgentContext;
use truth_gate_core::AgentError;
use truth_gate_core::AgentEvidenceLog;
use truth_gate_core::AgentName;
use truth_gate_core::AgentResult;
use truth_gate_core::AuditRequest;
use truth_gate_core::ClaimField;
use truth_gate_core::Discrepancy;
use truth_gate_core::EvidenceKind;
use truth_gate_core::LedgerView;
use truth_gate_core::Severity;
use truth_gate_core::SourceClass;
use truth_gate_core::VerificationAgent;

use crate::metrics::as_f64;
use crate::metrics::mismatch_severity;
use crate::metrics::support_ratio;

// ============================================================================
// SECTION: Agent
// ============================================================================

/// Maximum file paths embedded in the scan-summary evidence payload.
const SAMPLE_PATHS: usize = 16;

/// Walks the target and checks `filesCreated`, `linesOfCode`, and
/// `directoriesCreated` against observed counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsScannerAgent;

impl VerificationAgent for FsScannerAgent {
    fn name(&self) -> AgentName {
        AgentName::FsScanner
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
        let file_count = scan.files.len();
        let line_count: usize = scan
            .files
            .iter()
            .map(|path| crate::walk::count_lines(path, ctx.max_file_bytes))
            .sum();

        let sample: Vec<String> = scan
            .files
            .iter()
            .take(SAMPLE_PATHS)
            .map(|path| {
                path.strip_prefix(&request.target)
                    .unwrap_or(path)
                    .display()
                    .to_string()
            })
            .collect();
        log.record(
            EvidenceKind::FileExistence,
            json!({
                "observedFiles": file_count,
                "observedLines": line_count,
                "observedDirectories": scan.dirs,
                "truncated": scan.truncated,
                "sample": sample,
            }),
            ctx.now,
        );

        let mut checked_fields: Vec<ClaimField> = Vec::new();
        let mut discrepancies: Vec<Discrepancy> = Vec::new();
        let mut confidence = 1.0_f64;

        let observations = [
            ("filesCreated", "file-count-mismatch", file_count),
            ("linesOfCode", "loc-mismatch", line_count),
            ("directoriesCreated", "directory-count-mismatch", scan.dirs),
        ];
        for (field, kind, observed) in observations {
            let Some(claimed) = request.claim.numeric(field) else {
                continue;
            };
            let actual = as_f64(observed);
            checked_fields.push(ClaimField::new(field));
            log.record(
                EvidenceKind::Metric,
                json!({ "metric": field, "claimed": claimed, "actual": observed }),
                ctx.now,
            );
            confidence = confidence.min(support_ratio(claimed, actual));
            if let Some(severity) = mismatch_severity(claimed, actual) {
                discrepancies.push(Discrepancy::for_field(
                    kind,
                    severity,
                    ClaimField::new(field),
                    json!(claimed),
                    json!(observed),
                    format!("claimed {field} {claimed} but observed {observed}"),
                ));
            }
        }

        if scan.truncated {
            discrepancies.push(Discrepancy::unscoped(
                "scan-truncated",
                Severity::Low,
                format!("file limit {} reached; counts are lower bounds", ctx.max_files_scanned),
            ));
        }

        let verified = !discrepancies.iter().any(|d| d.severity >= Severity::High);
        Ok(AgentResult {
            agent: self.name(),
            verified,
            confidence,
            discrepancies,
            evidence_ids: log.ids(),
            checked_fields,
            duration_ms: 0,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
