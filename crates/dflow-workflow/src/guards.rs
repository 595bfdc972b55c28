//! # Eligibility Guards
//!
//! Three independent, stateless predicates gating user actions. Each takes
//! its complete input as parameters; the counter computations (trailing
//! 30-day windows, totals) are the caller's responsibility — see the store
//! views in `dflow-api`.
//!
//! The checked variants (`check_creation`, `check_escalation`) wrap the
//! predicates in structured errors for callers that want a 409-style
//! rejection rather than a boolean.

use thiserror::Error;

use dflow_core::{Bureau, DisputeStatus};

/// Maximum disputes a consumer may open against a single bureau within the
/// rolling creation window. Filing more dilutes each dispute's weight and
/// invites a frivolousness determination under FCRA § 1681i(a)(3).
pub const MAX_DISPUTES_PER_BUREAU: usize = 3;

/// The rolling creation window, in days.
pub const CREATION_WINDOW_DAYS: i64 = 30;

/// Days before a response deadline at which a notice turns urgent.
pub const DUE_SOON_DAYS: i64 = 5;

/// Guard rejections, for callers that want structured errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GuardError {
    /// The per-bureau creation throttle rejected a new dispute.
    #[error(
        "{count} disputes already opened against {bureau} in the last {CREATION_WINDOW_DAYS} days (limit {MAX_DISPUTES_PER_BUREAU})"
    )]
    CreationThrottled {
        /// The bureau the new dispute targets.
        bureau: Bureau,
        /// Disputes already opened against that bureau inside the window.
        count: usize,
    },

    /// The dispute's status does not permit escalation.
    #[error("escalation requires a VERIFIED or NO_RESPONSE investigation outcome, not {status}")]
    EscalationNotAllowed {
        /// The status the dispute is currently in.
        status: DisputeStatus,
    },
}

/// Whether a new dispute may be created, given the number of disputes the
/// consumer already opened against the target bureau inside the rolling
/// window.
pub fn can_create_dispute(recent_for_bureau: usize) -> bool {
    recent_for_bureau < MAX_DISPUTES_PER_BUREAU
}

/// Whether this would be the consumer's first dispute ever. Drives
/// onboarding guidance, nothing else.
pub fn is_first_dispute(total_disputes: usize) -> bool {
    total_disputes == 0
}

/// Whether a dispute may move to the AI-escalation stage: only once the
/// bureau has verified the item (refused to remove it) or failed to respond
/// within the investigation window.
pub fn escalation_allowed(status: DisputeStatus) -> bool {
    matches!(status, DisputeStatus::Verified | DisputeStatus::NoResponse)
}

/// [`can_create_dispute`] as a structured rejection.
pub fn check_creation(bureau: Bureau, recent_for_bureau: usize) -> Result<(), GuardError> {
    if can_create_dispute(recent_for_bureau) {
        Ok(())
    } else {
        Err(GuardError::CreationThrottled {
            bureau,
            count: recent_for_bureau,
        })
    }
}

/// [`escalation_allowed`] as a structured rejection.
pub fn check_escalation(status: DisputeStatus) -> Result<(), GuardError> {
    if escalation_allowed(status) {
        Ok(())
    } else {
        Err(GuardError::EscalationNotAllowed { status })
    }
}
