//! # Notification Routes
//!
//! Deadline notices for the dashboard: which bureau responses are due,
//! how soon, and which have gone overdue. The listing is a pure view over
//! the caller's disputes — nothing is stored or scheduled.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use dflow_core::Dispute;
use dflow_workflow::deadline_notices;

use crate::auth::Caller;
use crate::state::AppState;

/// One deadline notice in API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NoticeResponse {
    /// The dispute the deadline belongs to.
    pub dispute_id: Uuid,
    /// Creditor under dispute.
    pub creditor_name: String,
    /// Target bureau code.
    pub bureau: String,
    /// When the bureau's response is due.
    pub deadline: DateTime<Utc>,
    /// Whole days until the deadline; negative once it has passed.
    pub days_remaining: i64,
    /// `UPCOMING`, `DUE_SOON`, or `OVERDUE`.
    pub urgency: String,
}

/// Build the notification router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/notifications/deadlines", get(list_deadlines))
}

/// GET /v1/notifications/deadlines — Deadline notices, soonest first.
#[utoipa::path(
    get,
    path = "/v1/notifications/deadlines",
    responses(
        (status = 200, description = "Deadline notices for the caller's disputes", body = Vec<NoticeResponse>),
        (status = 401, description = "Missing bearer token"),
    ),
    tag = "notifications"
)]
pub(crate) async fn list_deadlines(
    State(state): State<AppState>,
    caller: Caller,
) -> Json<Vec<NoticeResponse>> {
    let disputes: Vec<Dispute> = state
        .disputes
        .list()
        .into_iter()
        .filter(|d| caller.user_filter().map_or(true, |u| d.user_id == u))
        .collect();

    let notices = deadline_notices(&disputes, Utc::now())
        .into_iter()
        .map(|n| NoticeResponse {
            dispute_id: *n.dispute_id.as_uuid(),
            creditor_name: n.creditor_name,
            bureau: n.bureau.as_str().to_string(),
            deadline: n.deadline,
            days_remaining: n.days_remaining,
            urgency: match n.urgency {
                dflow_workflow::DeadlineUrgency::Upcoming => "UPCOMING".to_string(),
                dflow_workflow::DeadlineUrgency::DueSoon => "DUE_SOON".to_string(),
                dflow_workflow::DeadlineUrgency::Overdue => "OVERDUE".to_string(),
            },
        })
        .collect();
    Json(notices)
}
