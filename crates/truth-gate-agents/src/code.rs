// crates/truth-gate-agents/src/code.rs
// ============================================================================
// Module: Code Analyzer Agent
// Description: Structural source analysis and incomplete-work detection.
// Purpose: Check source-file claims and surface unfinished implementations.
// Dependencies: crate::{metrics, walk}, serde, serde_json, truth-gate-core
// ============================================================================

//! ## Overview
//! The code analyzer restricts itself to recognized source files, counts
//! them, and scans their content for incomplete-work markers. It checks the
//! `sourceFiles` and `sourceLines` claim fields when present; a target with
//! no such claims and no markers contributes evidence but stays out of the
//! weighted average.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
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
// SECTION: Configuration
// ============================================================================

/// File extensions treated as source code.
const SOURCE_EXTENSIONS: &[&str] = &[
    "c", "cpp", "go", "h", "hpp", "java", "js", "py", "rb", "rs", "sh", "ts", "tsx",
];

/// Code analyzer configuration.
///
/// # Invariants
/// - Marker matching is plain substring search on file content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAnalyzerConfig {
    /// Substrings that mark a source file as incomplete.
    pub incomplete_markers: Vec<String>,
}

impl Default for CodeAnalyzerConfig {
    fn default() -> Self {
        Self {
            incomplete_markers: vec![
                "TODO".to_string(),
                "FIXME".to_string(),
                "unimplemented!".to_string(),
                "NotImplementedError".to_string(),
            ],
        }
    }
}

// ============================================================================
// SECTION: Agent
// ============================================================================

/// Analyzes source structure and checks `sourceFiles` / `sourceLines` claims.
#[derive(Debug, Clone, Default)]
pub struct CodeAnalyzerAgent {
    /// Marker configuration.
    config: CodeAnalyzerConfig,
}

impl CodeAnalyzerAgent {
    /// Creates an analyzer with explicit configuration.
    #[must_use]
    pub const fn new(config: CodeAnalyzerConfig) -> Self {
        Self {
            config,
        }
    }

    /// Returns true when the path has a recognized source extension.
    fn is_source(path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
    }
}

impl VerificationAgent for CodeAnalyzerAgent {
    fn name(&self) -> AgentName {
        AgentName::CodeAnalyzer
    }

    fn source_class(&self) -> SourceClass {
        SourceClass::StaticAnalysis
    }

    fn investigate(
        &self,
        request: &AuditRequest,
        _view: &LedgerView,
        log: &mut AgentEvidenceLog,
        ctx: &AgentContext,
    ) -> Result<AgentResult, AgentError> {
        let scan = crate::walk::walk_target(&request.target, ctx.max_files_scanned)?;
        let mut source_files = 0_usize;
        let mut source_lines = 0_usize;
        let mut marker_files = 0_usize;
        for path in &scan.files {
            if !Self::is_source(path) {
                continue;
            }
            source_files += 1;
            let Some(text) = crate::walk::read_text(path, ctx.max_file_bytes) else {
                continue;
            };
            source_lines += text.lines().count();
            if self
                .config
                .incomplete_markers
                .iter()
                .any(|marker| text.contains(marker.as_str()))
            {
                marker_files += 1;
            }
        }

        log.record(
            EvidenceKind::Metric,
            json!({
                "sourceFiles": source_files,
                "sourceLines": source_lines,
                "incompleteMarkerFiles": marker_files,
            }),
            ctx.now,
        );

        let mut checked_fields: Vec<ClaimField> = Vec::new();
        let mut discrepancies: Vec<Discrepancy> = Vec::new();
        let mut confidence = 1.0_f64;

        let observations = [
            ("sourceFiles", "source-file-count-mismatch", source_files),
            ("sourceLines", "source-line-count-mismatch", source_lines),
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

        if marker_files > 0 {
            discrepancies.push(Discrepancy::unscoped(
                "incomplete-marker",
                Severity::Medium,
                format!("{marker_files} source file(s) contain incomplete-work markers"),
            ));
            confidence = (confidence * 0.75).max(0.0);
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

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::panic,
        reason = "Test-only assertions may panic on failure."
    )]

    use std::collections::BTreeMap;
    use std::fs;

    use serde_json::json;

    use truth_gate_core::AgentContext;
    use truth_gate_core::AgentEvidenceLog;
    use truth_gate_core::AgentName;
    use truth_gate_core::AuditId;
    use truth_gate_core::AuditRequest;
    use truth_gate_core::Claim;
    use truth_gate_core::ClaimField;
    use truth_gate_core::IndependenceConstraint;
    use truth_gate_core::LedgerView;
    use truth_gate_core::PassLabel;
    use truth_gate_core::PassMode;
    use truth_gate_core::Timestamp;
    use truth_gate_core::VerificationAgent;

    use super::CodeAnalyzerAgent;

    fn context() -> AgentContext {
        AgentContext {
            pass: PassLabel::A,
            mode: PassMode::SelfCheck,
            constraint: IndependenceConstraint::none(),
            now: Timestamp::Logical(1),
            max_files_scanned: 1_000,
            max_file_bytes: 1 << 20,
        }
    }

    #[test]
    fn matching_source_count_verifies() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn a() {}\n").unwrap();
        fs::write(dir.path().join("b.rs"), "fn b() {}\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "not source\n").unwrap();
        let request = AuditRequest::new(
            AuditId::new("ca-test"),
            dir.path().to_path_buf(),
            Claim::new(BTreeMap::from([(ClaimField::new("sourceFiles"), json!(2))])),
            0.95,
            Timestamp::Logical(1),
        )
        .unwrap();
        let mut log = AgentEvidenceLog::new(AgentName::CodeAnalyzer, PassLabel::A);
        let view = LedgerView::new(Vec::new(), IndependenceConstraint::none());
        let result = CodeAnalyzerAgent::default()
            .investigate(&request, &view, &mut log, &context())
            .unwrap();
        assert!(result.verified);
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn incomplete_markers_degrade_confidence() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn a() { /* TODO finish */ }\n").unwrap();
        let request = AuditRequest::new(
            AuditId::new("ca-test"),
            dir.path().to_path_buf(),
            Claim::new(BTreeMap::from([(ClaimField::new("sourceFiles"), json!(1))])),
            0.95,
            Timestamp::Logical(1),
        )
        .unwrap();
        let mut log = AgentEvidenceLog::new(AgentName::CodeAnalyzer, PassLabel::A);
        let view = LedgerView::new(Vec::new(), IndependenceConstraint::none());
        let result = CodeAnalyzerAgent::default()
            .investigate(&request, &view, &mut log, &context())
            .unwrap();
        assert!(result.confidence < 1.0);
        assert_eq!(result.discrepancies[0].kind, "incomplete-marker");
    }

    #[test]
    fn no_source_claims_and_no_markers_is_inapplicable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.csv"), "a,b\n1,2\n").unwrap();
        let request = AuditRequest::new(
            AuditId::new("ca-test"),
            dir.path().to_path_buf(),
            Claim::new(BTreeMap::from([(ClaimField::new("filesCreated"), json!(1))])),
            0.95,
            Timestamp::Logical(1),
        )
        .unwrap();
        let mut log = AgentEvidenceLog::new(AgentName::CodeAnalyzer, PassLabel::A);
        let view = LedgerView::new(Vec::new(), IndependenceConstraint::none());
        let result = CodeAnalyzerAgent::default()
            .investigate(&request, &view, &mut log, &context())
            .unwrap();
        assert!(result.checked_fields.is_empty());
        assert!(result.discrepancies.is_empty());
    }
}
