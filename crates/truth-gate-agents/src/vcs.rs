// crates/truth-gate-agents/src/vcs.rs
// ============================================================================
// Module: Cross Referencer Agent
// Description: Corroborates claims against version-control metadata.
// Purpose: Check commit and branch claims against the target's git state.
// Dependencies: crate::{metrics, walk}, serde_json, truth-gate-core
// ============================================================================

//! ## Overview
//! The cross referencer reads git metadata directly from `.git` without
//! invoking any external tool: `HEAD` for the current branch and
//! `logs/HEAD` for an append-count of recorded commits. It also compares
//! the newest file modification time under the target against the claim's
//! wall-clock timestamp; files rewritten well after the claim was made put
//! its evidence in doubt. A target without version control cannot be
//! corroborated; the agent records that fact as evidence and reports
//! itself inapplicable rather than guessing.

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

/// Slack allowed between the claim timestamp and newer file mtimes.
const MTIME_WINDOW_MS: i64 = 60 * 60 * 1000;

/// Checks `commitsMade` and `branch` claims against git metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossReferencerAgent;

impl CrossReferencerAgent {
    /// Extracts the branch name from a symbolic `HEAD` line.
    fn branch_of(head: &str) -> Option<&str> {
        head.trim().strip_prefix("ref: refs/heads/")
    }

    /// Returns the newest file modification time under the target in unix
    /// milliseconds, skipping files whose mtime cannot be read.
    fn newest_mtime_ms(request: &AuditRequest, ctx: &AgentContext) -> Option<i64> {
        let outcome = crate::walk::walk_target(&request.target, ctx.max_files_scanned).ok()?;
        let mut newest: Option<i64> = None;
        for path in &outcome.files {
            let Ok(metadata) = std::fs::metadata(path) else {
                continue;
            };
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            let Ok(elapsed) = modified.duration_since(std::time::UNIX_EPOCH) else {
                continue;
            };
            let millis = i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX);
            newest = Some(newest.map_or(millis, |current| current.max(millis)));
        }
        newest
    }
}

impl VerificationAgent for CrossReferencerAgent {
    fn name(&self) -> AgentName {
        AgentName::CrossReferencer
    }

    fn source_class(&self) -> SourceClass {
        SourceClass::VersionControl
    }

    fn investigate(
        &self,
        request: &AuditRequest,
        _view: &LedgerView,
        log: &mut AgentEvidenceLog,
        ctx: &AgentContext,
    ) -> Result<AgentResult, AgentError> {
        let mut checked_fields: Vec<ClaimField> = Vec::new();
        let mut discrepancies: Vec<Discrepancy> = Vec::new();
        let mut confidence = 1.0_f64;

        // Mtime plausibility applies to wall-clock claims only; logical time
        // has no filesystem analogue to compare against.
        if let Some(created_ms) = request.created_at.as_unix_millis()
            && let Some(newest_ms) = Self::newest_mtime_ms(request, ctx)
        {
            log.record(
                EvidenceKind::Other,
                json!({ "newestMtimeMs": newest_ms, "claimCreatedAtMs": created_ms }),
                ctx.now,
            );
            if newest_ms > created_ms.saturating_add(MTIME_WINDOW_MS) {
                confidence = confidence.min(0.5);
                discrepancies.push(Discrepancy::unscoped(
                    "target-modified-after-claim",
                    Severity::Medium,
                    format!(
                        "newest file mtime {newest_ms}ms postdates the claim \
                         timestamp {created_ms}ms beyond the plausibility window"
                    ),
                ));
            }
        }

        let git_dir = request.target.join(".git");
        let head = crate::walk::read_text(&git_dir.join("HEAD"), ctx.max_file_bytes);

        let Some(head) = head else {
            log.record(EvidenceKind::Other, json!({ "vcs": "absent" }), ctx.now);
            let verified = !discrepancies.iter().any(|d| d.severity >= Severity::High);
            return Ok(AgentResult {
                agent: self.name(),
                verified,
                confidence,
                discrepancies,
                evidence_ids: log.ids(),
                checked_fields,
                duration_ms: 0,
            });
        };

        let branch = Self::branch_of(&head).map(str::to_string);
        log.record(
            EvidenceKind::Other,
            json!({ "vcs": "git", "head": head.trim(), "branch": branch }),
            ctx.now,
        );

        // One reflog line per recorded commit on HEAD; an approximation that
        // holds for linear histories created in place.
        let reflog = crate::walk::read_text(&git_dir.join("logs/HEAD"), ctx.max_file_bytes);
        if let (Some(claimed), Some(reflog)) = (request.claim.numeric("commitsMade"), reflog) {
            let commits = reflog
                .lines()
                .filter(|line| line.contains("commit"))
                .count();
            checked_fields.push(ClaimField::new("commitsMade"));
            log.record(
                EvidenceKind::Metric,
                json!({ "metric": "commitsMade", "claimed": claimed, "actual": commits }),
                ctx.now,
            );
            let actual = as_f64(commits);
            confidence = confidence.min(support_ratio(claimed, actual));
            if let Some(severity) = mismatch_severity(claimed, actual) {
                discrepancies.push(Discrepancy::for_field(
                    "commit-count-mismatch",
                    severity,
                    ClaimField::new("commitsMade"),
                    json!(claimed),
                    json!(commits),
                    format!("claimed commitsMade {claimed} but reflog records {commits}"),
                ));
            }
        }

        if let Some(claimed_branch) = request
            .claim
            .metrics
            .get(&ClaimField::new("branch"))
            .and_then(serde_json::Value::as_str)
        {
            checked_fields.push(ClaimField::new("branch"));
            if branch.as_deref() != Some(claimed_branch) {
                confidence = 0.0;
                discrepancies.push(Discrepancy::for_field(
                    "branch-mismatch",
                    Severity::High,
                    ClaimField::new("branch"),
                    json!(claimed_branch),
                    json!(branch),
                    format!("claimed branch {claimed_branch} but HEAD disagrees"),
                ));
            }
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
