mod jobs;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use solarhub_core::AppConfig;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, require_bearer_auth, AuthState};
use crate::runner::JobLocks;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub locks: JobLocks,
}

/// Error body returned by every failing route: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/jobs/news-scraper", post(jobs::trigger_news))
        .route("/api/v1/jobs/video-scraper", post(jobs::trigger_video))
        .layer(axum::middleware::from_fn_with_state(
            auth,
            require_bearer_auth,
        ))
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match solarhub_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use solarhub_core::{Environment, NewsFormat, NewsLocale};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::middleware::tests::auth_with_keys;

    pub(crate) fn test_config() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost:1/solarhub_test".to_string(),
            env: Environment::Test,
            bind_addr: "127.0.0.1:0".parse().expect("valid addr"),
            log_level: "info".to_string(),
            api_keys: Vec::new(),
            youtube_api_key: None,
            db_max_connections: 1,
            db_min_connections: 0,
            db_acquire_timeout_secs: 1,
            news_batch_size: 7,
            video_batch_size: 5,
            news_format: NewsFormat::Rss,
            news_locale: NewsLocale::default(),
            youtube_api_call_limit_per_brand: 15,
            youtube_page_size: 50,
            request_timeout_secs: 5,
            user_agent: "solarhub-test/0.1".to_string(),
            http_max_retries: 0,
            http_retry_backoff_base_ms: 0,
            lease_ttl_secs: 900,
            news_cron: "0 0 0 * * *".to_string(),
            video_cron: "0 30 0 * * *".to_string(),
            scheduler_enabled: false,
        }
    }

    /// State over a pool that never connects until a query runs.
    pub(crate) fn lazy_state() -> AppState {
        let config = test_config();
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(250))
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        AppState {
            pool,
            config: Arc::new(config),
            locks: JobLocks::default(),
        }
    }

    pub(crate) fn open_auth() -> AuthState {
        AuthState::from_config(&AppConfig {
            env: Environment::Development,
            ..test_config()
        })
        .expect("development allows missing keys")
    }

    pub(crate) async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json parse")
    }

    #[test]
    fn internal_api_error_maps_to_500() {
        let response = ApiError::internal("boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_reports_degraded_when_database_is_unreachable() {
        let app = build_app(lazy_state(), open_auth());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["database"], "unavailable");
    }

    #[tokio::test]
    async fn trigger_routes_require_bearer_token_when_keys_configured() {
        let app = build_app(lazy_state(), auth_with_keys(&["secret"]));
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/jobs/news-scraper")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"], "missing or invalid bearer token");
    }

    #[tokio::test]
    async fn health_is_public_and_echoes_request_id() {
        let app = build_app(lazy_state(), auth_with_keys(&["secret"]));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("req-42")
        );
    }
}
