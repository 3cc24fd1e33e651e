// crates/truth-gate-agents/src/metrics.rs
// ============================================================================
// Module: Claim Metric Comparison
// Description: Shared support-ratio and severity mapping for count checks.
// Purpose: Keep claimed-vs-observed grading identical across agents.
// Dependencies: truth-gate-core
// ============================================================================

//! ## Overview
//! Count comparisons grade on relative error: the support ratio is the
//! smaller value over the larger (1.0 for a perfect match), and severity
//! scales with relative error so an 89-claimed / 10-observed mismatch lands
//! critical while an off-by-one on a large count stays low.

// ============================================================================
// SECTION: Imports
// ============================================================================

use truth_gate_core::Severity;

// ============================================================================
// SECTION: Conversions
// ============================================================================

/// Converts an observed count to `f64` for ratio math.
#[allow(
    clippy::cast_precision_loss,
    reason = "Observed counts are far below f64 integer precision."
)]
pub(crate) const fn as_f64(value: usize) -> f64 {
    value as f64
}

// ============================================================================
// SECTION: Grading
// ============================================================================

/// Returns the support ratio `min/max` in `[0, 1]` for two counts.
pub(crate) fn support_ratio(claimed: f64, actual: f64) -> f64 {
    if claimed <= 0.0 && actual <= 0.0 {
        return 1.0;
    }
    let low = claimed.min(actual).max(0.0);
    let high = claimed.max(actual);
    if high <= 0.0 {
        return 1.0;
    }
    (low / high).clamp(0.0, 1.0)
}

/// Maps a claimed/actual pair to a mismatch severity, `None` on a match.
pub(crate) fn mismatch_severity(claimed: f64, actual: f64) -> Option<Severity> {
    let spread = (claimed - actual).abs();
    if spread == 0.0 {
        return None;
    }
    let relative = spread / claimed.max(actual).max(1.0);
    if relative >= 0.5 {
        Some(Severity::Critical)
    } else if relative >= 0.2 {
        Some(Severity::High)
    } else if relative >= 0.05 {
        Some(Severity::Medium)
    } else {
        Some(Severity::Low)
    }
}
