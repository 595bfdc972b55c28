//! # Authentication Middleware
//!
//! Bearer-token authentication with constant-time secret comparison.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {user_id}:{secret}   — a dashboard consumer, bound to their disputes
//! Bearer {secret}             — an operator token with cross-user access
//! ```
//!
//! ## Model
//!
//! The middleware validates any token that is *presented* and injects a
//! [`Caller`] into the request extensions; a request with no Authorization
//! header passes through anonymously. Protected handlers extract `Caller`
//! (rejecting 401 when absent); public handlers either ignore identity or
//! extract [`MaybeCaller`] when one endpoint needs to branch on it.
//!
//! When no secret is configured (`AUTH_TOKEN` unset), authentication is
//! disabled and every request runs as an operator — dev mode only.

use axum::extract::Request;
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use dflow_core::{Dispute, UserId};

use crate::error::AppError;

// ── Secret token ───────────────────────────────────────────────────────

/// The configured bearer secret. Custom `Debug` redacts the value so the
/// credential cannot leak through logs.
#[derive(Clone)]
pub struct SecretToken(String);

impl SecretToken {
    /// Wrap a secret string.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Access the secret for comparison.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecretToken").field(&"[REDACTED]").finish()
    }
}

/// Auth configuration injected into request extensions by the router.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// The expected bearer secret; `None` disables authentication.
    pub token: Option<SecretToken>,
}

// ── Caller identity ────────────────────────────────────────────────────

/// Identity of the authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// Operator token without a user binding; sees every dispute.
    Operator,
    /// A dashboard consumer; sees only their own disputes.
    User(UserId),
}

impl Caller {
    /// Whether the caller may access the given dispute.
    pub fn can_access(&self, dispute: &Dispute) -> bool {
        match self {
            Self::Operator => true,
            Self::User(user_id) => dispute.user_id == *user_id,
        }
    }

    /// The user the listing views are scoped to; `None` means unscoped.
    pub fn user_filter(&self) -> Option<UserId> {
        match self {
            Self::Operator => None,
            Self::User(user_id) => Some(*user_id),
        }
    }
}

/// Extracts the identity the auth middleware injected. Rejects with 401
/// when no identity is present.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))
    }
}

/// Optional caller identity for public endpoints that branch on auth.
#[derive(Debug, Clone, Copy)]
pub struct MaybeCaller(pub Option<Caller>);

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for MaybeCaller {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeCaller(parts.extensions.get::<Caller>().copied()))
    }
}

// ── Token validation ───────────────────────────────────────────────────

/// Constant-time comparison of bearer secrets.
///
/// When lengths differ, a dummy comparison keeps timing constant instead
/// of returning early on the length check alone.
fn constant_time_secret_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a presented bearer token against the configured secret.
///
/// `{user_id}:{secret}` binds the caller to a user; a bare `{secret}` is an
/// operator token.
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<Caller, String> {
    match provided.split_once(':') {
        None => {
            if constant_time_secret_eq(provided, expected_secret) {
                Ok(Caller::Operator)
            } else {
                Err("invalid bearer token".into())
            }
        }
        Some((user_part, secret)) => {
            if !constant_time_secret_eq(secret, expected_secret) {
                return Err("invalid bearer token".into());
            }
            let user_id = user_part
                .parse::<Uuid>()
                .map_err(|e| format!("invalid user id in bearer token: {e}"))?;
            Ok(Caller::User(UserId(user_id)))
        }
    }
}

/// The auth middleware. See module docs for the model.
pub async fn auth_middleware(mut req: Request, next: Next) -> Response {
    let configured = req
        .extensions()
        .get::<AuthConfig>()
        .and_then(|c| c.token.clone());

    let Some(expected) = configured else {
        // Dev mode: authentication disabled, run as operator.
        req.extensions_mut().insert(Caller::Operator);
        return next.run(req).await;
    };

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    match header_value {
        None => next.run(req).await,
        Some(value) => {
            let Some(provided) = value.strip_prefix("Bearer ") else {
                return AppError::Unauthorized("authorization header must be a bearer token".into())
                    .into_response();
            };
            match parse_bearer_token(provided, expected.as_str()) {
                Ok(caller) => {
                    req.extensions_mut().insert(caller);
                    next.run(req).await
                }
                Err(msg) => {
                    tracing::debug!("rejected bearer token: {msg}");
                    AppError::Unauthorized(msg).into_response()
                }
            }
        }
    }
}
