//! # dflow-api — Axum API for the Disputeflow Stack
//!
//! HTTP surface over the workflow engine in `dflow-workflow`. Handlers are
//! deliberately thin: parse, guard, call the engine, persist through the
//! injected store, respond.
//!
//! ## API Surface
//!
//! | Prefix                        | Module                       | Auth |
//! |-------------------------------|------------------------------|------|
//! | `/v1/templates/*`             | [`routes::templates`]        | none (escalation render excepted) |
//! | `/v1/disputes/*`              | [`routes::disputes`]         | bearer |
//! | `/v1/notifications/*`         | [`routes::notifications`]    | bearer |
//! | `/health/*`, `/openapi.json`  | here / [`openapi`]           | none |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler
//! ```
//!
//! The auth middleware validates any token that is presented and injects a
//! `Caller`; protected handlers enforce its presence through the extractor.
//! Health probes are mounted outside the middleware so they remain
//! reachable with no credentials even if token parsing misbehaves.

pub mod auth;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    // Body size limit: 1 MiB. Letter payloads are small; anything larger is
    // a client error, not a use case.
    let api = Router::new()
        .merge(routes::templates::router())
        .merge(routes::disputes::router())
        .merge(routes::notifications::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(auth_config))
        .with_state(state.clone());

    // Unauthenticated health probes.
    let probes = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .with_state(state);

    Router::new().merge(probes).merge(api)
}

/// Liveness probe — always 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the store is accessible.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    // A read-lock acquisition is the only dependency this service has.
    let _ = state.disputes.len();
    (StatusCode::OK, "ready")
}
