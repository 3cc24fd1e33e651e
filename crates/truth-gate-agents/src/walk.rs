// crates/truth-gate-agents/src/walk.rs
// ============================================================================
// Module: Bounded Target Walker
// Description: Shared read-only directory traversal with hard limits.
// Purpose: Give every agent the same bounded view of the target tree.
// Dependencies: std::fs, truth-gate-core
// ============================================================================

//! ## Overview
//! Agents walk the target with the same bounded, deterministic traversal:
//! breadth-limited by `max_files_scanned`, entries sorted by name so repeat
//! runs visit files in the same order, and version-control internals
//! (`.git`) skipped. The walker never follows the target boundary upward and
//! never writes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use truth_gate_core::AgentError;

// ============================================================================
// SECTION: Scan Outcome
// ============================================================================

/// Result of one bounded traversal.
#[derive(Debug, Clone)]
pub(crate) struct ScanOutcome {
    /// Regular files in deterministic (sorted, depth-first) order.
    pub files: Vec<PathBuf>,
    /// Number of directories visited.
    pub dirs: usize,
    /// True when the file limit cut the traversal short.
    pub truncated: bool,
}

// ============================================================================
// SECTION: Traversal
// ============================================================================

/// Walks the target tree depth-first, bounded by `max_files`.
///
/// # Errors
///
/// Returns [`AgentError::TargetUnreadable`] when the root cannot be read.
pub(crate) fn walk_target(root: &Path, max_files: usize) -> Result<ScanOutcome, AgentError> {
    let mut outcome = ScanOutcome {
        files: Vec::new(),
        dirs: 0,
        truncated: false,
    };
    let mut stack = vec![root.to_path_buf()];
    let mut first = true;
    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if first => {
                return Err(AgentError::TargetUnreadable(format!(
                    "{}: {err}",
                    dir.display()
                )));
            }
            // Unreadable subdirectories are skipped, not fatal.
            Err(_) => continue,
        };
        first = false;
        outcome.dirs += 1;
        let mut names: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .collect();
        names.sort();
        for path in names {
            // Symlinks are skipped entirely; following them could escape the
            // target or cycle.
            let Ok(meta) = fs::symlink_metadata(&path) else {
                continue;
            };
            if meta.is_dir() {
                if path.file_name().is_some_and(|name| name == ".git") {
                    continue;
                }
                stack.push(path);
            } else if meta.is_file() {
                if outcome.files.len() >= max_files {
                    outcome.truncated = true;
                    return Ok(outcome);
                }
                outcome.files.push(path);
            }
        }
    }
    // Root itself is not counted as a created directory.
    outcome.dirs = outcome.dirs.saturating_sub(1);
    Ok(outcome)
}

/// Reads a file as UTF-8 text, bounded by `max_bytes`.
///
/// Returns `None` for unreadable, oversized, or non-text files.
pub(crate) fn read_text(path: &Path, max_bytes: usize) -> Option<String> {
    let metadata = fs::metadata(path).ok()?;
    if metadata.len() > u64::try_from(max_bytes).unwrap_or(u64::MAX) {
        return None;
    }
    let bytes = fs::read(path).ok()?;
    String::from_utf8(bytes).ok()
}

/// Counts lines in a file, treating non-text files as zero lines.
pub(crate) fn count_lines(path: &Path, max_bytes: usize) -> usize {
    read_text(path, max_bytes).map_or(0, |text| text.lines().count())
}
