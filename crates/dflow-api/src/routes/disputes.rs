//! # Dispute Lifecycle Routes
//!
//! Authenticated dispute management: creation behind the per-bureau
//! throttle, letter generation, mailing/delivery/response tracking,
//! escalation behind the eligibility guard, soft delete, and the derived
//! display progress.
//!
//! Every transition runs inside [`Store::try_update`] so the ownership
//! check, the guard, and the mutation happen under one write lock — a
//! concurrent second escalation of the same dispute loses cleanly with a
//! 409 instead of racing.
//!
//! [`Store::try_update`]: crate::state::Store::try_update

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use dflow_core::{Bureau, Dispute, InvestigationOutcome};
use dflow_workflow::guards::{check_creation, check_escalation, is_first_dispute};
use dflow_workflow::{
    progress_label, progress_stage, render_letter, response_deadline, LetterData, TemplateStage,
};

use crate::auth::Caller;
use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request to open a new dispute.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDisputeRequest {
    /// Creditor or furnisher being disputed.
    pub creditor_name: String,
    /// Account number with the creditor, if known.
    pub account_number: Option<String>,
    /// Target bureau code (`EXPERIAN`, `EQUIFAX`, `TRANSUNION`, or `ALL`).
    pub bureau: String,
    /// The selected dispute reason.
    pub reason: String,
    /// Free-text elaboration, if any.
    pub custom_reason: Option<String>,
}

/// Request to render and store a letter on a dispute.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateLetterRequest {
    /// Canonical name of the stage to render.
    pub template_stage: String,
    /// Consumer-supplied letter parameters.
    #[schema(value_type = Object)]
    pub user_data: LetterData,
}

/// Request recording the mailing event.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MailRequest {
    /// Carrier tracking number.
    pub tracking_number: String,
    /// The stage of the letter that went out — sets the response window.
    pub template_stage: String,
}

/// Request recording carrier-confirmed delivery.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeliveredRequest {
    /// The stage of the delivered letter — re-anchors the response window.
    pub template_stage: String,
}

/// Request recording how the investigation concluded.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OutcomeRequest {
    /// `REMOVED`, `CORRECTED`, `VERIFIED`, or `NO_RESPONSE`.
    pub outcome: String,
}

/// A dispute in API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DisputeResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub creditor_name: String,
    pub account_number: Option<String>,
    pub bureau: String,
    pub status: String,
    pub reason: String,
    pub custom_reason: Option<String>,
    pub letter_content: Option<String>,
    pub mailed_at: Option<DateTime<Utc>>,
    pub tracking_number: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub response_deadline: Option<DateTime<Utc>>,
    pub response_received_at: Option<DateTime<Utc>>,
    pub dv_sent: bool,
    pub dv_response_received: bool,
    pub cra_dispute_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Derived display-progress ordinal (0-7).
    pub progress: u8,
    /// Display label for the progress ordinal.
    pub progress_label: String,
}

/// Creation response: the new dispute plus onboarding context.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateDisputeResponse {
    /// The newly created dispute.
    pub dispute: DisputeResponse,
    /// Whether this is the consumer's first dispute ever — the dashboard
    /// shows first-time guidance when set.
    pub first_dispute: bool,
}

/// Derived display progress for one dispute.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProgressResponse {
    /// Display-progress ordinal (0-7).
    pub stage: u8,
    /// Display label for the ordinal.
    pub label: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the dispute lifecycle router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/disputes", post(create_dispute).get(list_disputes))
        .route("/v1/disputes/:id", get(get_dispute).delete(delete_dispute))
        .route("/v1/disputes/:id/letter", post(generate_letter))
        .route("/v1/disputes/:id/mail", post(record_mailing))
        .route("/v1/disputes/:id/delivered", post(record_delivery))
        .route("/v1/disputes/:id/response", post(record_outcome))
        .route("/v1/disputes/:id/escalate", post(escalate))
        .route("/v1/disputes/:id/progress", get(get_progress))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dispute_response(d: &Dispute) -> DisputeResponse {
    let progress = progress_stage(d);
    DisputeResponse {
        id: *d.id.as_uuid(),
        user_id: *d.user_id.as_uuid(),
        creditor_name: d.creditor_name.clone(),
        account_number: d.account_number.clone(),
        bureau: d.bureau.as_str().to_string(),
        status: d.status.as_str().to_string(),
        reason: d.reason.clone(),
        custom_reason: d.custom_reason.clone(),
        letter_content: d.letter_content.clone(),
        mailed_at: d.mailed_at,
        tracking_number: d.tracking_number.clone(),
        delivered_at: d.delivered_at,
        response_deadline: d.response_deadline,
        response_received_at: d.response_received_at,
        dv_sent: d.dv_sent,
        dv_response_received: d.dv_response_received,
        cra_dispute_sent: d.cra_dispute_sent,
        created_at: d.created_at,
        updated_at: d.updated_at,
        progress,
        progress_label: progress_label(progress).to_string(),
    }
}

fn parse_stage(s: &str) -> Result<TemplateStage, AppError> {
    TemplateStage::parse(s)
        .ok_or_else(|| AppError::BadRequest(format!("unrecognized template stage: '{s}'")))
}

/// Unwrap a `try_update` outcome: missing record → 404, closure error →
/// that error, success → the closure's value.
fn updated<R>(result: Option<Result<R, AppError>>, id: Uuid) -> Result<R, AppError> {
    match result {
        None => Err(AppError::NotFound(format!("no dispute with id {id}"))),
        Some(inner) => inner,
    }
}

fn require_access(caller: Caller, dispute: &Dispute) -> Result<(), AppError> {
    if caller.can_access(dispute) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "dispute belongs to another user".into(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/disputes — Open a new dispute.
#[utoipa::path(
    post,
    path = "/v1/disputes",
    request_body = CreateDisputeRequest,
    responses(
        (status = 201, description = "Dispute created", body = CreateDisputeResponse),
        (status = 401, description = "Missing bearer token"),
        (status = 409, description = "Per-bureau creation limit reached"),
        (status = 422, description = "Validation error"),
    ),
    tag = "disputes"
)]
pub(crate) async fn create_dispute(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateDisputeRequest>,
) -> Result<(StatusCode, Json<CreateDisputeResponse>), AppError> {
    let Caller::User(user_id) = caller else {
        return Err(AppError::Forbidden(
            "a consumer token is required to create disputes".into(),
        ));
    };

    if req.creditor_name.trim().is_empty() {
        return Err(AppError::Validation("creditor_name must not be empty".into()));
    }
    if req.reason.trim().is_empty() {
        return Err(AppError::Validation("reason must not be empty".into()));
    }
    let bureau = Bureau::parse(&req.bureau)
        .ok_or_else(|| AppError::Validation(format!("unknown bureau code: '{}'", req.bureau)))?;

    let now = Utc::now();
    let recent = state.recent_disputes_for_bureau(user_id, bureau, now);
    check_creation(bureau, recent)?;
    let first_dispute = is_first_dispute(state.total_disputes(user_id));

    let account_number = req
        .account_number
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string());
    let dispute = Dispute::new(
        user_id,
        req.creditor_name.trim(),
        account_number,
        bureau,
        req.reason.trim(),
        req.custom_reason.filter(|s| !s.trim().is_empty()),
        now,
    );

    tracing::info!(dispute = %dispute.id, %bureau, "dispute created");
    let response = CreateDisputeResponse {
        dispute: dispute_response(&dispute),
        first_dispute,
    };
    state.disputes.insert(*dispute.id.as_uuid(), dispute);

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /v1/disputes — List the caller's disputes.
#[utoipa::path(
    get,
    path = "/v1/disputes",
    responses(
        (status = 200, description = "Disputes, newest first; soft-deleted records excluded", body = Vec<DisputeResponse>),
        (status = 401, description = "Missing bearer token"),
    ),
    tag = "disputes"
)]
pub(crate) async fn list_disputes(
    State(state): State<AppState>,
    caller: Caller,
) -> Json<Vec<DisputeResponse>> {
    let mut disputes: Vec<Dispute> = state
        .disputes
        .list()
        .into_iter()
        .filter(|d| d.is_active())
        .filter(|d| caller.user_filter().map_or(true, |u| d.user_id == u))
        .collect();
    disputes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(disputes.iter().map(dispute_response).collect())
}

/// GET /v1/disputes/:id — Fetch one dispute.
#[utoipa::path(
    get,
    path = "/v1/disputes/{id}",
    params(("id" = Uuid, Path, description = "Dispute UUID")),
    responses(
        (status = 200, description = "The dispute", body = DisputeResponse),
        (status = 403, description = "Dispute belongs to another user"),
        (status = 404, description = "No such dispute"),
    ),
    tag = "disputes"
)]
pub(crate) async fn get_dispute(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<DisputeResponse>, AppError> {
    let dispute = state
        .disputes
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("no dispute with id {id}")))?;
    require_access(caller, &dispute)?;
    Ok(Json(dispute_response(&dispute)))
}

/// POST /v1/disputes/:id/letter — Render and store a letter.
#[utoipa::path(
    post,
    path = "/v1/disputes/{id}/letter",
    params(("id" = Uuid, Path, description = "Dispute UUID")),
    request_body = GenerateLetterRequest,
    responses(
        (status = 200, description = "Letter stored; status is GENERATED", body = DisputeResponse),
        (status = 400, description = "Unrecognized stage"),
        (status = 409, description = "Dispute is closed or deleted"),
        (status = 422, description = "Missing required fields, or the stage is generated out-of-band"),
    ),
    tag = "disputes"
)]
pub(crate) async fn generate_letter(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<GenerateLetterRequest>,
) -> Result<Json<DisputeResponse>, AppError> {
    let stage = parse_stage(&req.template_stage)?;
    super::templates::validate_letter_data(&req.user_data)?;
    // Rendering is pure; do it outside the store lock.
    let letter = render_letter(stage, &req.user_data, Utc::now().date_naive())?;

    let now = Utc::now();
    let result = state.disputes.try_update(&id, |d| {
        require_access(caller, d)?;
        d.attach_letter(letter.clone(), now)?;
        Ok(dispute_response(d))
    });
    updated(result, id).map(Json)
}

/// POST /v1/disputes/:id/mail — Record the mailing event.
#[utoipa::path(
    post,
    path = "/v1/disputes/{id}/mail",
    params(("id" = Uuid, Path, description = "Dispute UUID")),
    request_body = MailRequest,
    responses(
        (status = 200, description = "Mailing recorded; status is MAILED", body = DisputeResponse),
        (status = 400, description = "Unrecognized stage"),
        (status = 409, description = "Dispute is closed or deleted"),
        (status = 422, description = "Validation error"),
    ),
    tag = "disputes"
)]
pub(crate) async fn record_mailing(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<MailRequest>,
) -> Result<Json<DisputeResponse>, AppError> {
    if req.tracking_number.trim().is_empty() {
        return Err(AppError::Validation("tracking_number must not be empty".into()));
    }
    let stage = parse_stage(&req.template_stage)?;
    let now = Utc::now();
    let deadline = response_deadline(stage, now);

    let result = state.disputes.try_update(&id, |d| {
        require_access(caller, d)?;
        d.record_mailing(req.tracking_number.trim(), now, deadline)?;
        // Collection sub-workflow bookkeeping: a validation letter opens
        // it, and a later bureau letter after the collector answered
        // records the follow-up dispute.
        if stage == TemplateStage::ValidationOfDebt {
            d.dv_sent = true;
        } else if d.dv_response_received {
            d.cra_dispute_sent = true;
        }
        Ok(dispute_response(d))
    });
    updated(result, id).map(Json)
}

/// POST /v1/disputes/:id/delivered — Record carrier-confirmed delivery.
#[utoipa::path(
    post,
    path = "/v1/disputes/{id}/delivered",
    params(("id" = Uuid, Path, description = "Dispute UUID")),
    request_body = DeliveredRequest,
    responses(
        (status = 200, description = "Delivery recorded; status is IN_INVESTIGATION", body = DisputeResponse),
        (status = 400, description = "Unrecognized stage"),
        (status = 409, description = "Dispute is closed or deleted"),
    ),
    tag = "disputes"
)]
pub(crate) async fn record_delivery(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<DeliveredRequest>,
) -> Result<Json<DisputeResponse>, AppError> {
    let stage = parse_stage(&req.template_stage)?;
    let now = Utc::now();
    let deadline = response_deadline(stage, now);

    let result = state.disputes.try_update(&id, |d| {
        require_access(caller, d)?;
        d.record_delivery(now, deadline)?;
        Ok(dispute_response(d))
    });
    updated(result, id).map(Json)
}

/// POST /v1/disputes/:id/response — Record the investigation outcome.
#[utoipa::path(
    post,
    path = "/v1/disputes/{id}/response",
    params(("id" = Uuid, Path, description = "Dispute UUID")),
    request_body = OutcomeRequest,
    responses(
        (status = 200, description = "Outcome recorded", body = DisputeResponse),
        (status = 409, description = "Dispute is closed or deleted"),
        (status = 422, description = "Unknown outcome"),
    ),
    tag = "disputes"
)]
pub(crate) async fn record_outcome(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<OutcomeRequest>,
) -> Result<Json<DisputeResponse>, AppError> {
    let outcome = InvestigationOutcome::parse(&req.outcome).ok_or_else(|| {
        AppError::Validation(format!("unknown investigation outcome: '{}'", req.outcome))
    })?;
    let now = Utc::now();

    let result = state.disputes.try_update(&id, |d| {
        require_access(caller, d)?;
        d.record_outcome(outcome, now)?;
        if d.dv_sent {
            d.dv_response_received = true;
        }
        Ok(dispute_response(d))
    });
    updated(result, id).map(Json)
}

/// POST /v1/disputes/:id/escalate — Move to the AI-escalation workflow.
#[utoipa::path(
    post,
    path = "/v1/disputes/{id}/escalate",
    params(("id" = Uuid, Path, description = "Dispute UUID")),
    responses(
        (status = 200, description = "Dispute escalated", body = DisputeResponse),
        (status = 409, description = "Not eligible for escalation"),
    ),
    tag = "disputes"
)]
pub(crate) async fn escalate(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<DisputeResponse>, AppError> {
    let now = Utc::now();
    let result = state.disputes.try_update(&id, |d| {
        require_access(caller, d)?;
        check_escalation(d.status)?;
        d.mark_escalated(now)?;
        tracing::info!(dispute = %d.id, "dispute escalated");
        Ok(dispute_response(d))
    });
    updated(result, id).map(Json)
}

/// DELETE /v1/disputes/:id — Soft-delete a dispute.
#[utoipa::path(
    delete,
    path = "/v1/disputes/{id}",
    params(("id" = Uuid, Path, description = "Dispute UUID")),
    responses(
        (status = 204, description = "Dispute soft-deleted"),
        (status = 404, description = "No such dispute"),
        (status = 409, description = "Dispute already closed or deleted"),
    ),
    tag = "disputes"
)]
pub(crate) async fn delete_dispute(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let now = Utc::now();
    let result = state.disputes.try_update(&id, |d| {
        require_access(caller, d)?;
        d.soft_delete(now)?;
        Ok(())
    });
    updated(result, id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/disputes/:id/progress — Derived display progress.
#[utoipa::path(
    get,
    path = "/v1/disputes/{id}/progress",
    params(("id" = Uuid, Path, description = "Dispute UUID")),
    responses(
        (status = 200, description = "Display progress", body = ProgressResponse),
        (status = 404, description = "No such dispute"),
    ),
    tag = "disputes"
)]
pub(crate) async fn get_progress(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ProgressResponse>, AppError> {
    let dispute = state
        .disputes
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("no dispute with id {id}")))?;
    require_access(caller, &dispute)?;
    let stage = progress_stage(&dispute);
    Ok(Json(ProgressResponse {
        stage,
        label: progress_label(stage).to_string(),
    }))
}
