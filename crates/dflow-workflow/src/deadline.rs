//! # Response Deadlines & Notices
//!
//! Pure views over the dispute collection that power deadline
//! notifications: when is each bureau response due, and which disputes
//! need the consumer's attention.
//!
//! The deadline anchor is the delivery confirmation when one exists (the
//! statutory window runs from receipt), falling back to the mail date.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use dflow_core::{Bureau, Dispute, DisputeId};

use crate::guards::DUE_SOON_DAYS;
use crate::stage::TemplateStage;

/// Compute the bureau-response deadline for a letter of the given stage,
/// anchored at `anchor` (delivery date, or mail date when delivery is
/// unconfirmed).
pub fn response_deadline(stage: TemplateStage, anchor: DateTime<Utc>) -> DateTime<Utc> {
    anchor + Duration::days(i64::from(stage.descriptor().wait_days))
}

/// Urgency classification of a deadline notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeadlineUrgency {
    /// Deadline is comfortably in the future.
    Upcoming,
    /// Deadline is within the due-soon window.
    DueSoon,
    /// Deadline has passed without a recorded response.
    Overdue,
}

/// One deadline notification for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineNotice {
    /// The dispute the deadline belongs to.
    pub dispute_id: DisputeId,
    /// Creditor under dispute, for display.
    pub creditor_name: String,
    /// Target bureau, for display.
    pub bureau: Bureau,
    /// When the bureau's response is due.
    pub deadline: DateTime<Utc>,
    /// Whole days until the deadline; negative once it has passed.
    pub days_remaining: i64,
    /// Urgency classification of this notice.
    pub urgency: DeadlineUrgency,
}

/// Build deadline notices for every dispute still awaiting a bureau
/// response, ordered soonest-first.
///
/// A dispute qualifies while it is active (not soft-deleted or closed),
/// carries a response deadline, and has no recorded outcome yet.
pub fn deadline_notices(disputes: &[Dispute], now: DateTime<Utc>) -> Vec<DeadlineNotice> {
    let mut notices: Vec<DeadlineNotice> = disputes
        .iter()
        .filter(|d| d.is_active() && d.response_received_at.is_none())
        .filter_map(|d| {
            let deadline = d.response_deadline?;
            let days_remaining = (deadline - now).num_days();
            let urgency = if deadline < now {
                DeadlineUrgency::Overdue
            } else if days_remaining <= DUE_SOON_DAYS {
                DeadlineUrgency::DueSoon
            } else {
                DeadlineUrgency::Upcoming
            };
            Some(DeadlineNotice {
                dispute_id: d.id,
                creditor_name: d.creditor_name.clone(),
                bureau: d.bureau,
                deadline,
                days_remaining,
                urgency,
            })
        })
        .collect();
    notices.sort_by_key(|n| n.deadline);
    notices
}
