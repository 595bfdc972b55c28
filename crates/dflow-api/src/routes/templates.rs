//! # Letter-Template Routes
//!
//! The public workflow surface the letter wizard consumes: stage
//! advancement, letter rendering, and the static stage table.
//!
//! Rendering the escalation stage is the one identity-sensitive spot:
//! an unauthenticated request is rejected with 401 *before* the renderer
//! is reached; an authenticated one still gets a 422, because escalation
//! letters are produced out-of-band by the escalation service.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use dflow_workflow::{render_letter, LetterData, TemplateStage};

use crate::auth::MaybeCaller;
use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request to advance from the current workflow stage.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NextStageRequest {
    /// Canonical name of the caller's current stage.
    pub current_stage: String,
}

/// The next stage and its descriptor.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NextStageResponse {
    /// Canonical name of the next stage.
    pub next_stage: String,
    /// Display title of the next stage.
    pub title: String,
    /// One-sentence description of the next stage.
    pub description: String,
    /// Advised bureau-response wait for the next stage, in days.
    pub wait_days: u32,
    /// Ladder completion once the next stage is reached, 0-100.
    pub progress_percent: u8,
}

/// Request to render a letter.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RenderRequest {
    /// Canonical name of the stage to render.
    pub template_stage: String,
    /// Consumer-supplied letter parameters.
    #[schema(value_type = Object)]
    pub user_data: LetterData,
}

/// A rendered letter.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RenderResponse {
    /// The stage that was rendered.
    pub template_stage: String,
    /// The full plain-text letter body.
    pub letter: String,
}

/// One row of the static stage table.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StageInfo {
    /// Canonical stage name.
    pub stage: String,
    /// Display title.
    pub title: String,
    /// One-sentence description.
    pub description: String,
    /// Advised bureau-response wait, in days.
    pub wait_days: u32,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the template workflow router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/templates/next-stage", post(next_stage))
        .route("/v1/templates/render", post(render))
        .route("/v1/templates/stages", get(list_stages))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a canonical stage name, failing closed into a 400.
fn parse_stage(s: &str) -> Result<TemplateStage, AppError> {
    TemplateStage::parse(s)
        .ok_or_else(|| AppError::BadRequest(format!("unrecognized template stage: '{s}'")))
}

/// Reject letter data whose required fields are empty. Optional fields
/// degrade inside the renderer; the required four do not.
pub(crate) fn validate_letter_data(data: &LetterData) -> Result<(), AppError> {
    let required = [
        ("full_name", &data.full_name),
        ("creditor_name", &data.creditor_name),
        ("bureau", &data.bureau),
        ("dispute_reason", &data.dispute_reason),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} must not be empty")));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/templates/next-stage — Advance the workflow by one stage.
#[utoipa::path(
    post,
    path = "/v1/templates/next-stage",
    request_body = NextStageRequest,
    responses(
        (status = 200, description = "The next stage and its descriptor", body = NextStageResponse),
        (status = 400, description = "Unrecognized or terminal stage"),
    ),
    tag = "templates"
)]
pub(crate) async fn next_stage(
    Json(req): Json<NextStageRequest>,
) -> Result<Json<NextStageResponse>, AppError> {
    let current = parse_stage(&req.current_stage)?;
    let next = current.next().ok_or_else(|| {
        AppError::BadRequest(format!(
            "{current} is the final stage; there is nothing to advance to"
        ))
    })?;
    let descriptor = next.descriptor();
    Ok(Json(NextStageResponse {
        next_stage: next.as_str().to_string(),
        title: descriptor.title.to_string(),
        description: descriptor.description.to_string(),
        wait_days: descriptor.wait_days,
        progress_percent: next.completion_percent(),
    }))
}

/// POST /v1/templates/render — Render a letter for a stage.
#[utoipa::path(
    post,
    path = "/v1/templates/render",
    request_body = RenderRequest,
    responses(
        (status = 200, description = "The rendered letter", body = RenderResponse),
        (status = 400, description = "Unrecognized stage"),
        (status = 401, description = "Escalation stage requested without authentication"),
        (status = 422, description = "Missing required fields, or the stage is generated out-of-band"),
    ),
    tag = "templates"
)]
pub(crate) async fn render(
    caller: MaybeCaller,
    Json(req): Json<RenderRequest>,
) -> Result<Json<RenderResponse>, AppError> {
    let stage = parse_stage(&req.template_stage)?;

    // The escalation stage never reaches the renderer anonymously.
    if stage == TemplateStage::AiEscalation && caller.0.is_none() {
        return Err(AppError::Unauthorized(
            "escalation letters require an authenticated session".into(),
        ));
    }

    validate_letter_data(&req.user_data)?;
    let letter = render_letter(stage, &req.user_data, Utc::now().date_naive())?;
    Ok(Json(RenderResponse {
        template_stage: stage.as_str().to_string(),
        letter,
    }))
}

/// GET /v1/templates/stages — The static stage table.
#[utoipa::path(
    get,
    path = "/v1/templates/stages",
    responses(
        (status = 200, description = "All six stages in progression order", body = Vec<StageInfo>),
    ),
    tag = "templates"
)]
pub(crate) async fn list_stages(State(_state): State<AppState>) -> Json<Vec<StageInfo>> {
    let stages = TemplateStage::all()
        .iter()
        .map(|stage| {
            let d = stage.descriptor();
            StageInfo {
                stage: stage.as_str().to_string(),
                title: d.title.to_string(),
                description: d.description.to_string(),
                wait_days: d.wait_days,
            }
        })
        .collect();
    Json(stages)
}
