//! # OpenAPI Document
//!
//! Auto-generated OpenAPI 3.1 document via utoipa derive macros, served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::routes;
use crate::state::AppState;

/// The API document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "disputeflow API",
        description = "Credit-dispute workflow: letter templates, dispute lifecycle, deadline notices.",
    ),
    paths(
        routes::templates::next_stage,
        routes::templates::render,
        routes::templates::list_stages,
        routes::disputes::create_dispute,
        routes::disputes::list_disputes,
        routes::disputes::get_dispute,
        routes::disputes::generate_letter,
        routes::disputes::record_mailing,
        routes::disputes::record_delivery,
        routes::disputes::record_outcome,
        routes::disputes::escalate,
        routes::disputes::delete_dispute,
        routes::disputes::get_progress,
        routes::notifications::list_deadlines,
    ),
    components(schemas(
        routes::templates::NextStageRequest,
        routes::templates::NextStageResponse,
        routes::templates::RenderRequest,
        routes::templates::RenderResponse,
        routes::templates::StageInfo,
        routes::disputes::CreateDisputeRequest,
        routes::disputes::CreateDisputeResponse,
        routes::disputes::GenerateLetterRequest,
        routes::disputes::MailRequest,
        routes::disputes::DeliveredRequest,
        routes::disputes::OutcomeRequest,
        routes::disputes::DisputeResponse,
        routes::disputes::ProgressResponse,
        routes::notifications::NoticeResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "templates", description = "Letter-template workflow"),
        (name = "disputes", description = "Dispute lifecycle management"),
        (name = "notifications", description = "Deadline notices"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_openapi))
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
