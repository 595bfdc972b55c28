//! # Integration Tests for dflow-api
//!
//! Drives the assembled router end-to-end: template workflow endpoints,
//! dispute lifecycle with guards, authentication middleware, per-user
//! isolation, deadline notices, and the OpenAPI document.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use dflow_api::auth::SecretToken;
use dflow_api::state::{AppConfig, AppState};

const SECRET: &str = "test-secret";

/// Helper: build the test app with authentication disabled (dev mode —
/// every caller is an operator).
fn test_app() -> axum::Router {
    dflow_api::app(AppState::new())
}

/// Helper: build the test app with bearer auth enabled.
fn test_app_with_auth() -> axum::Router {
    let config = AppConfig {
        port: 8080,
        auth_token: Some(SecretToken::new(SECRET)),
    };
    dflow_api::app(AppState::with_config(config))
}

/// Helper: bearer token bound to a user.
fn user_token(user: Uuid) -> String {
    format!("{user}:{SECRET}")
}

/// Helper: GET with an optional bearer token.
fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Helper: JSON request with an optional bearer token.
fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

/// Helper: read a response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Helper: create a dispute for `user` and return its id.
async fn create_dispute(app: &axum::Router, user: Uuid, creditor: &str, bureau: &str) -> Uuid {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/disputes",
            Some(&user_token(user)),
            &json!({
                "creditor_name": creditor,
                "bureau": bureau,
                "reason": "Account is not mine"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["dispute"]["id"].as_str().unwrap().parse().unwrap()
}

fn letter_data() -> Value {
    json!({
        "full_name": "Jordan Avery",
        "street_address": "12 Birch Lane",
        "city": "Columbus",
        "state": "OH",
        "zip": "43004",
        "creditor_name": "Acme Collections",
        "bureau": "EQUIFAX",
        "dispute_reason": "Account is not mine"
    })
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = test_app()
        .oneshot(get_request("/health/liveness", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_probe() {
    let response = test_app()
        .oneshot(get_request("/health/readiness", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Template Workflow --------------------------------------------------------

#[tokio::test]
async fn test_next_stage_advances() {
    let response = test_app()
        .oneshot(json_request(
            "POST",
            "/v1/templates/next-stage",
            None,
            &json!({"current_stage": "INVESTIGATION_REQUEST"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["next_stage"], "PERSONAL_INFO_REMOVER");
    assert_eq!(body["progress_percent"], 33);
    assert_eq!(body["wait_days"], 30);
}

#[tokio::test]
async fn test_next_stage_into_escalation() {
    let response = test_app()
        .oneshot(json_request(
            "POST",
            "/v1/templates/next-stage",
            None,
            &json!({"current_stage": "TERMINATION_LETTER"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["next_stage"], "AI_ESCALATION");
    assert_eq!(body["progress_percent"], 100);
}

#[tokio::test]
async fn test_next_stage_rejects_terminal_stage() {
    let response = test_app()
        .oneshot(json_request(
            "POST",
            "/v1/templates/next-stage",
            None,
            &json!({"current_stage": "AI_ESCALATION"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_next_stage_rejects_unknown_stage() {
    let response = test_app()
        .oneshot(json_request(
            "POST",
            "/v1/templates/next-stage",
            None,
            &json!({"current_stage": "NOT_A_STAGE"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_next_stage_rejects_wrong_verb() {
    let response = test_app()
        .oneshot(get_request("/v1/templates/next-stage", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_render_letter_contains_bureau_address() {
    let response = test_app()
        .oneshot(json_request(
            "POST",
            "/v1/templates/render",
            None,
            &json!({
                "template_stage": "INVESTIGATION_REQUEST",
                "user_data": letter_data()
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let letter = body["letter"].as_str().unwrap();
    assert!(letter.contains("Jordan Avery"));
    assert!(letter.contains("Atlanta, GA 30374"));
    assert!(letter.contains("Account number: Unknown"));
    assert!(letter.contains("1681i(a)"));
}

#[tokio::test]
async fn test_render_rejects_empty_required_field() {
    let mut data = letter_data();
    data["full_name"] = json!("");
    let response = test_app()
        .oneshot(json_request(
            "POST",
            "/v1/templates/render",
            None,
            &json!({"template_stage": "FACTUAL_LETTER", "user_data": data}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_render_escalation_requires_auth() {
    let response = test_app_with_auth()
        .oneshot(json_request(
            "POST",
            "/v1/templates/render",
            None,
            &json!({"template_stage": "AI_ESCALATION", "user_data": letter_data()}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_render_escalation_is_out_of_band_even_when_authenticated() {
    let response = test_app_with_auth()
        .oneshot(json_request(
            "POST",
            "/v1/templates/render",
            Some(SECRET),
            &json!({"template_stage": "AI_ESCALATION", "user_data": letter_data()}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_stage_table_lists_all_six() {
    let response = test_app()
        .oneshot(get_request("/v1/templates/stages", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let stages = body.as_array().unwrap();
    assert_eq!(stages.len(), 6);
    assert_eq!(stages[0]["stage"], "INVESTIGATION_REQUEST");
    assert_eq!(stages[5]["stage"], "AI_ESCALATION");
}

// -- Authentication -----------------------------------------------------------

#[tokio::test]
async fn test_disputes_require_token() {
    let response = test_app_with_auth()
        .oneshot(get_request("/v1/disputes", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let response = test_app_with_auth()
        .oneshot(get_request("/v1/disputes", Some("wrong-secret")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_operator_token_lists_all() {
    let app = test_app_with_auth();
    let user = Uuid::new_v4();
    create_dispute(&app, user, "Acme Collections", "EXPERIAN").await;

    let response = app
        .oneshot(get_request("/v1/disputes", Some(SECRET)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

// -- Dispute Lifecycle --------------------------------------------------------

#[tokio::test]
async fn test_create_dispute_marks_first() {
    let app = test_app_with_auth();
    let user = Uuid::new_v4();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/disputes",
            Some(&user_token(user)),
            &json!({
                "creditor_name": "Acme Collections",
                "bureau": "EXPERIAN",
                "reason": "Account is not mine"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["first_dispute"], true);
    assert_eq!(body["dispute"]["status"], "DRAFT");
    assert_eq!(body["dispute"]["progress"], 0);
    assert_eq!(body["dispute"]["progress_label"], "Draft");

    // The second dispute is no longer the first.
    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/disputes",
            Some(&user_token(user)),
            &json!({
                "creditor_name": "Other Bank",
                "bureau": "EQUIFAX",
                "reason": "Balance is wrong"
            }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["first_dispute"], false);
}

#[tokio::test]
async fn test_create_dispute_rejects_unknown_bureau() {
    let app = test_app_with_auth();
    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/disputes",
            Some(&user_token(Uuid::new_v4())),
            &json!({
                "creditor_name": "Acme",
                "bureau": "INNOVIS",
                "reason": "Not mine"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_creation_throttle_caps_three_per_bureau() {
    let app = test_app_with_auth();
    let user = Uuid::new_v4();
    for i in 0..3 {
        create_dispute(&app, user, &format!("Creditor {i}"), "TRANSUNION").await;
    }
    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/disputes",
            Some(&user_token(user)),
            &json!({
                "creditor_name": "One Too Many",
                "bureau": "TRANSUNION",
                "reason": "Not mine"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_creation_throttle_is_per_bureau() {
    let app = test_app_with_auth();
    let user = Uuid::new_v4();
    for i in 0..3 {
        create_dispute(&app, user, &format!("Creditor {i}"), "EXPERIAN").await;
    }
    // A different bureau is still open.
    create_dispute(&app, user, "Creditor X", "EQUIFAX").await;
}

#[tokio::test]
async fn test_all_sentinel_counts_toward_every_bureau() {
    let app = test_app_with_auth();
    let user = Uuid::new_v4();
    for i in 0..3 {
        create_dispute(&app, user, &format!("Creditor {i}"), "ALL").await;
    }
    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/disputes",
            Some(&user_token(user)),
            &json!({
                "creditor_name": "Blocked",
                "bureau": "EQUIFAX",
                "reason": "Not mine"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cross_user_access_forbidden() {
    let app = test_app_with_auth();
    let owner = Uuid::new_v4();
    let id = create_dispute(&app, owner, "Acme Collections", "EXPERIAN").await;

    let response = app
        .oneshot(get_request(
            &format!("/v1/disputes/{id}"),
            Some(&user_token(Uuid::new_v4())),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_listing_is_scoped_per_user() {
    let app = test_app_with_auth();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    create_dispute(&app, alice, "Acme Collections", "EXPERIAN").await;
    create_dispute(&app, bob, "Other Bank", "EQUIFAX").await;

    let response = app
        .oneshot(get_request("/v1/disputes", Some(&user_token(alice))))
        .await
        .unwrap();
    let body = body_json(response).await;
    let disputes = body.as_array().unwrap();
    assert_eq!(disputes.len(), 1);
    assert_eq!(disputes[0]["creditor_name"], "Acme Collections");
}

#[tokio::test]
async fn test_full_lifecycle_to_escalation() {
    let app = test_app_with_auth();
    let user = Uuid::new_v4();
    let token = user_token(user);
    let id = create_dispute(&app, user, "Acme Collections", "EQUIFAX").await;

    // Generate the letter.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/disputes/{id}/letter"),
            Some(&token),
            &json!({
                "template_stage": "INVESTIGATION_REQUEST",
                "user_data": letter_data()
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "GENERATED");
    assert_eq!(body["progress"], 1);
    assert!(body["letter_content"].as_str().unwrap().contains("Jordan Avery"));

    // Record mailing.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/disputes/{id}/mail"),
            Some(&token),
            &json!({
                "tracking_number": "1Z999AA10123456784",
                "template_stage": "INVESTIGATION_REQUEST"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "MAILED");
    assert_eq!(body["progress"], 4);
    assert!(body["response_deadline"].is_string());

    // Record delivery.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/disputes/{id}/delivered"),
            Some(&token),
            &json!({"template_stage": "INVESTIGATION_REQUEST"}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["status"], "IN_INVESTIGATION");
    assert_eq!(body["progress"], 5);

    // Escalation before an eligible outcome is a conflict.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/disputes/{id}/escalate"),
            Some(&token),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Bureau verified the item.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/disputes/{id}/response"),
            Some(&token),
            &json!({"outcome": "VERIFIED"}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["status"], "VERIFIED");
    assert_eq!(body["progress"], 6);

    // Now escalation is allowed.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/disputes/{id}/escalate"),
            Some(&token),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ESCALATED");
    assert_eq!(body["progress"], 7);
    assert_eq!(body["progress_label"], "Complete");
}

#[tokio::test]
async fn test_removed_outcome_resolves() {
    let app = test_app_with_auth();
    let user = Uuid::new_v4();
    let id = create_dispute(&app, user, "Acme Collections", "EXPERIAN").await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/v1/disputes/{id}/response"),
            Some(&user_token(user)),
            &json!({"outcome": "REMOVED"}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["status"], "RESOLVED");
    assert_eq!(body["progress"], 7);
}

#[tokio::test]
async fn test_debt_validation_subworkflow_flags() {
    let app = test_app_with_auth();
    let user = Uuid::new_v4();
    let token = user_token(user);
    let id = create_dispute(&app, user, "Acme Collections", "EXPERIAN").await;

    // Mailing the validation letter opens the collection sub-workflow.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/disputes/{id}/mail"),
            Some(&token),
            &json!({
                "tracking_number": "1Z999AA10123456784",
                "template_stage": "VALIDATION_OF_DEBT"
            }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["dv_sent"], true);
    assert_eq!(body["dv_response_received"], false);

    // The collector answered.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/disputes/{id}/response"),
            Some(&token),
            &json!({"outcome": "VERIFIED"}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["dv_response_received"], true);
    assert_eq!(body["cra_dispute_sent"], false);

    // A follow-up bureau letter records the escalated paper trail.
    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/v1/disputes/{id}/mail"),
            Some(&token),
            &json!({
                "tracking_number": "1Z999AA10123456785",
                "template_stage": "FACTUAL_LETTER"
            }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["cra_dispute_sent"], true);
}

#[tokio::test]
async fn test_unknown_outcome_rejected() {
    let app = test_app_with_auth();
    let user = Uuid::new_v4();
    let id = create_dispute(&app, user, "Acme Collections", "EXPERIAN").await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/v1/disputes/{id}/response"),
            Some(&user_token(user)),
            &json!({"outcome": "SHREDDED"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_soft_delete_hides_and_freezes() {
    let app = test_app_with_auth();
    let user = Uuid::new_v4();
    let token = user_token(user);
    let id = create_dispute(&app, user, "Acme Collections", "EXPERIAN").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/v1/disputes/{id}"),
            Some(&token),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The record is gone from the listing but still fetchable.
    let response = app
        .clone()
        .oneshot(get_request("/v1/disputes", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body.as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(get_request(&format!("/v1/disputes/{id}"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "DELETED");

    // Further mutation conflicts.
    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/v1/disputes/{id}/mail"),
            Some(&token),
            &json!({
                "tracking_number": "1Z1",
                "template_stage": "INVESTIGATION_REQUEST"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_dispute_is_404() {
    let app = test_app_with_auth();
    let response = app
        .oneshot(get_request(
            &format!("/v1/disputes/{}", Uuid::new_v4()),
            Some(SECRET),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Deadline Notices ---------------------------------------------------------

#[tokio::test]
async fn test_deadline_notice_after_mailing() {
    let app = test_app_with_auth();
    let user = Uuid::new_v4();
    let token = user_token(user);
    let id = create_dispute(&app, user, "Acme Collections", "TRANSUNION").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/disputes/{id}/mail"),
            Some(&token),
            &json!({
                "tracking_number": "1Z999AA10123456784",
                "template_stage": "INVESTIGATION_REQUEST"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/v1/notifications/deadlines", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let notices = body.as_array().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["creditor_name"], "Acme Collections");
    assert_eq!(notices[0]["bureau"], "TRANSUNION");
    assert_eq!(notices[0]["urgency"], "UPCOMING");
    // 30-day window, minus the partial day in flight.
    let days = notices[0]["days_remaining"].as_i64().unwrap();
    assert!((29..=30).contains(&days), "got {days}");
}

#[tokio::test]
async fn test_deadline_listing_is_scoped_per_user() {
    let app = test_app_with_auth();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let id = create_dispute(&app, alice, "Acme Collections", "EXPERIAN").await;
    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/disputes/{id}/mail"),
            Some(&user_token(alice)),
            &json!({
                "tracking_number": "1Z999AA10123456784",
                "template_stage": "FACTUAL_LETTER"
            }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(get_request(
            "/v1/notifications/deadlines",
            Some(&user_token(bob)),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body.as_array().unwrap().is_empty());
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_document_served() {
    let response = test_app()
        .oneshot(get_request("/openapi.json", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/v1/templates/next-stage"].is_object());
    assert!(body["paths"]["/v1/disputes"].is_object());
}
