use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use solarhub_core::{AppConfig, Environment};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer-token settings for the trigger routes.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<Vec<String>>,
    pub enabled: bool,
}

impl AuthState {
    /// Builds auth from `SOLARHUB_API_KEYS` as already parsed into `config`.
    ///
    /// With no keys, auth is disabled in development and startup fails
    /// everywhere else.
    ///
    /// # Errors
    ///
    /// Returns an error outside development when no keys are configured.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Self::new(config.api_keys.clone(), config.env == Environment::Development)
    }

    fn new(keys: Vec<String>, is_development: bool) -> anyhow::Result<Self> {
        if keys.is_empty() {
            if is_development {
                tracing::warn!(
                    "SOLARHUB_API_KEYS not set; bearer auth disabled in development environment"
                );
                return Ok(Self {
                    api_keys: Arc::new(Vec::new()),
                    enabled: false,
                });
            }

            anyhow::bail!(
                "SOLARHUB_API_KEYS is required outside development; provide comma-separated bearer tokens"
            );
        }

        Ok(Self {
            api_keys: Arc::new(keys),
            enabled: true,
        })
    }

    fn allows(&self, token: &str) -> bool {
        self.api_keys
            .iter()
            .any(|key| bool::from(key.as_bytes().ct_eq(token.as_bytes())))
    }
}

#[derive(Debug, Serialize)]
struct UnauthorizedBody {
    error: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// An incoming `x-request-id` header is reused; otherwise a `UUIDv4` is
/// generated. The ID is stored as a [`RequestId`] extension and echoed on
/// the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing Bearer token auth when enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    match extract_bearer_token(req.headers().get(AUTHORIZATION)) {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(UnauthorizedBody {
                error: "missing or invalid bearer token",
            }),
        )
            .into_response(),
    }
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
