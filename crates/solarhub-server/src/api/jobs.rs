use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;
use solarhub_core::SourceKind;
use solarhub_ingest::BatchReport;

use crate::middleware::RequestId;
use crate::runner::{run_job, JobRunError};

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct JobResponse {
    message: String,
    report: BatchReport,
}

pub(super) async fn trigger_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<JobResponse>, ApiError> {
    trigger(state, req_id, SourceKind::News).await
}

pub(super) async fn trigger_video(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<JobResponse>, ApiError> {
    trigger(state, req_id, SourceKind::Video).await
}

async fn trigger(
    state: AppState,
    req_id: RequestId,
    source: SourceKind,
) -> Result<Json<JobResponse>, ApiError> {
    tracing::info!(request_id = %req_id.0, source = %source, "job triggered over HTTP");

    match run_job(source, state.pool.clone(), &state.config, &state.locks).await {
        Ok(report) => Ok(Json(JobResponse {
            message: report.message(),
            report,
        })),
        Err(e @ JobRunError::InProgress(_)) => Err(ApiError::new(StatusCode::CONFLICT, e.to_string())),
        Err(JobRunError::Ingest(e)) => {
            tracing::error!(request_id = %req_id.0, source = %source, error = %e, "job failed");
            Err(ApiError::internal(e.to_string()))
        }
    }
}
