//! # Display Progress Derivation
//!
//! Maps a persisted dispute's timestamps and status onto a single display
//! ordinal (0..=7) for the dashboard progress bar. The derivation is a
//! priority cascade — the highest-priority condition wins, evaluated
//! top-down; it is NOT cumulative, and it does not validate that the
//! persisted status agrees with the timestamps. A record whose status was
//! set to `RESOLVED` by hand derives 7 even with sparse timestamps.
//!
//! ## The gap at ordinal 2
//!
//! Ordinal 2 ("Printed & Ready") has no persisted trigger: no field records
//! the print event, so the cascade can never produce it. The label table
//! keeps all eight entries because dashboard clients key off these exact
//! ordinals. Closing the gap would mean adding a persisted printed flag and
//! renumbering nothing — until then the gap is intentional and documented,
//! not a bug.

use dflow_core::{Dispute, DisputeStatus};

/// Labels for the eight display ordinals, indexed by ordinal.
pub const PROGRESS_LABELS: [&str; 8] = [
    "Draft",
    "Letter Generated",
    "Printed & Ready",
    "Tracking Added",
    "Mailed",
    "Delivered",
    "Response Received",
    "Complete",
];

/// Derive the display-progress ordinal for a dispute.
///
/// Priority cascade, highest first:
///
/// 1. status `RESOLVED` or `ESCALATED` → 7
/// 2. `response_received_at` set → 6
/// 3. `delivered_at` set → 5
/// 4. `mailed_at` set → 4
/// 5. `tracking_number` set → 3
/// 6. `letter_content` set → 1
/// 7. otherwise → 0
///
/// Ordinal 2 is unreachable here by design (see module docs).
pub fn progress_stage(dispute: &Dispute) -> u8 {
    if matches!(
        dispute.status,
        DisputeStatus::Resolved | DisputeStatus::Escalated
    ) {
        return 7;
    }
    if dispute.response_received_at.is_some() {
        return 6;
    }
    if dispute.delivered_at.is_some() {
        return 5;
    }
    if dispute.mailed_at.is_some() {
        return 4;
    }
    if dispute.tracking_number.is_some() {
        return 3;
    }
    if dispute.letter_content.is_some() {
        return 1;
    }
    0
}

/// The display label for a progress ordinal, `"Unknown"` out of range.
pub fn progress_label(ordinal: u8) -> &'static str {
    PROGRESS_LABELS
        .get(ordinal as usize)
        .copied()
        .unwrap_or("Unknown")
}
