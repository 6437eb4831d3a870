//! Axum route handlers for the Animation API.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::processor::{create_job, get_job, process_job, JobRequest};
use crate::models::job::STATUS_COMPLETED;
use crate::planning::ExplanationLevel;
use crate::render::RenderQuality;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateAnimationRequest {
    pub prompt: String,
    #[serde(default)]
    pub level: ExplanationLevel,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub quality: Option<RenderQuality>,
}

#[derive(Debug, Serialize)]
pub struct GenerateAnimationResponse {
    pub job_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: String,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub job_id: Uuid,
    pub rating: i16,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub success: bool,
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/animations/generate
///
/// Creates a job row and spawns the processing pipeline in the background.
/// Returns immediately with the job id for status polling.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateAnimationRequest>,
) -> Result<Json<GenerateAnimationResponse>, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }

    let job_request = JobRequest {
        prompt: request.prompt,
        level: request.level,
        email: request.email,
        quality: request.quality.unwrap_or_default(),
    };

    let job = create_job(&state.db, &job_request).await?;
    tracing::info!(job_id = %job.id, "Animation job created");

    tokio::spawn(process_job(state.clone(), job.id, job_request));

    Ok(Json(GenerateAnimationResponse {
        job_id: job.id,
        status: job.status,
        created_at: job.created_at,
    }))
}

/// GET /api/v1/animations/status/:job_id
pub async fn handle_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobStatusResponse>, AppError> {
    let job = get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    Ok(Json(JobStatusResponse {
        job_id: job.id,
        status: job.status,
        video_url: job.video_url,
        created_at: job.created_at,
        completed_at: job.completed_at,
        error: job.error_message,
    }))
}

/// GET /api/v1/animations/download/:job_id
///
/// Remote videos redirect via a download_url payload; locally stored videos
/// are served directly from the media directory.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let job = get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    if job.status != STATUS_COMPLETED {
        return Err(AppError::Validation(
            "Animation is not ready for download".to_string(),
        ));
    }
    let video_url = job
        .video_url
        .ok_or_else(|| AppError::NotFound("Video file not found".to_string()))?;

    if !state.storage.is_local_url(&video_url) {
        return Ok(Json(serde_json::json!({ "download_url": video_url })).into_response());
    }

    // URL shape for local files: {base_url}/videos/{file_name}
    let file_name = video_url
        .rsplit('/')
        .next()
        .ok_or_else(|| AppError::NotFound("Video file not found".to_string()))?;
    let file_path = find_local_video(&state, file_name)
        .ok_or_else(|| AppError::NotFound("Video file not found".to_string()))?;

    let data = tokio::fs::read(&file_path)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Cannot read {}: {e}", file_path.display())))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "video/mp4".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes::Bytes::from(data),
    )
        .into_response())
}

/// POST /api/v1/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, AppError> {
    if !(1..=5).contains(&request.rating) {
        return Err(AppError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    sqlx::query(
        r#"
        INSERT INTO feedback (id, job_id, rating, comment)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(request.job_id)
    .bind(request.rating)
    .bind(&request.comment)
    .execute(&state.db)
    .await?;

    Ok(Json(FeedbackResponse {
        success: true,
        message: "Feedback recorded".to_string(),
    }))
}

/// Looks for the named video anywhere under the renderer's output tree
/// (quality subdirectories vary with the render flags).
fn find_local_video(state: &AppState, file_name: &str) -> Option<std::path::PathBuf> {
    walkdir::WalkDir::new(state.artifacts.media_dir.join("videos"))
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| {
            entry.file_type().is_file() && entry.file_name().to_str() == Some(file_name)
        })
        .map(|entry| entry.into_path())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
