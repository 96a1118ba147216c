use super::dto::{ProcessVideoResponse, PushEnvelope};
use super::model::StatusRecord;
use super::service::VideoService;
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::state::AppState;
use crate::workers::transcoder::JobOutcome;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

/// Process a raw video announced by a storage push notification
#[utoipa::path(
    post,
    path = "/process-video",
    request_body = PushEnvelope,
    responses(
        (status = 200, description = "Processing finished", body = ApiResponse<ProcessVideoResponse>),
        (status = 400, description = "Bad Request: missing or invalid notification"),
        (status = 409, description = "Video already processing or processed"),
        (status = 500, description = "Processing failed")
    ),
    tag = "Processing"
)]
pub async fn process_video(
    State(state): State<AppState>,
    payload: Result<Json<PushEnvelope>, JsonRejection>,
) -> impl IntoResponse {
    let Json(envelope) = match payload {
        Ok(p) => p,
        Err(e) => {
            return ApiError(format!("Bad Request: {}", e.body_text()), StatusCode::BAD_REQUEST)
                .into_response();
        }
    };

    match state.orchestrator.handle(&envelope).await {
        Ok(JobOutcome::Completed(job)) => ApiSuccess(
            ApiResponse::success(
                ProcessVideoResponse {
                    video_id: job.video_id,
                    filename: job.output_file_name,
                    thumbnail: job.thumbnail_name,
                },
                "Processing finished successfully",
            ),
            StatusCode::OK,
        )
        .into_response(),
        Ok(JobOutcome::RejectedBadInput(e)) => {
            ApiError(format!("Bad Request: {}", e), StatusCode::BAD_REQUEST)
                .into_response()
        }
        Ok(JobOutcome::RejectedDuplicate { video_id }) => ApiError(
            format!("Video {} already processing or processed", video_id),
            StatusCode::CONFLICT,
        )
        .into_response(),
        Ok(JobOutcome::FailedProcessing { video_id, reason }) => {
            error!(video_id = %video_id, "Processing failed: {}", reason);
            ApiError("Processing failed".to_string(), StatusCode::INTERNAL_SERVER_ERROR)
                .into_response()
        }
        Err(e) => ApiError(format!("Processing failed: {}", e), StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
    }
}

/// Get processing status of a video
#[utoipa::path(
    get,
    path = "/api/v1/videos/{id}/status",
    params(
        ("id" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Status record", body = ApiResponse<StatusRecord>),
        (status = 404, description = "Video not found"),
        (status = 500, description = "Status store unavailable")
    ),
    tag = "Processing"
)]
pub async fn get_video_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match VideoService::find_status(state, &id).await {
        Ok(Some(record)) => ApiSuccess(
            ApiResponse::success(record, "Status retrieved successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Ok(None) => ApiError("Video not found".to_string(), StatusCode::NOT_FOUND).into_response(),
        Err(e) => {
            error!(video_id = %id, "Status lookup failed: {:#}", e);
            ApiError("Status store unavailable".to_string(), StatusCode::INTERNAL_SERVER_ERROR)
                .into_response()
        }
    }
}
