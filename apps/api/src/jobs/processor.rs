//! Animation job processing — persistence plus the full background pipeline.
//!
//! Flow: plan_scenes → resolve/fetch media → generate instructions →
//!       emit script → save script → render (bounded attempts) →
//!       upload video → mark completed → notify.
//!
//! The pipeline runs inside `tokio::spawn`, detached from the request that
//! created the job. Every failure path lands in the job row so status polling
//! always has an answer.

use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::assets::{build_resolution, fetch_assets};
use crate::errors::AppError;
use crate::models::job::{AnimationJobRow, STATUS_COMPLETED, STATUS_FAILED, STATUS_PENDING};
use crate::planning::{plan_scenes, ExplanationLevel};
use crate::render::{render_script, RenderQuality};
use crate::script::emit::{render_scene_script, SceneContext};
use crate::script::generate;
use crate::state::AppState;

/// Everything needed to process one animation job.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub prompt: String,
    pub level: ExplanationLevel,
    pub email: Option<String>,
    pub quality: RenderQuality,
}

// ────────────────────────────────────────────────────────────────────────────
// Persistence
// ────────────────────────────────────────────────────────────────────────────

/// Inserts a pending job row and returns it.
pub async fn create_job(pool: &PgPool, request: &JobRequest) -> Result<AnimationJobRow, AppError> {
    let job = sqlx::query_as::<_, AnimationJobRow>(
        r#"
        INSERT INTO animation_jobs (id, prompt, level, email, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&request.prompt)
    .bind(request.level.as_str())
    .bind(&request.email)
    .bind(STATUS_PENDING)
    .fetch_one(pool)
    .await?;

    Ok(job)
}

pub async fn get_job(pool: &PgPool, job_id: Uuid) -> Result<Option<AnimationJobRow>, AppError> {
    let job = sqlx::query_as::<_, AnimationJobRow>("SELECT * FROM animation_jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?;
    Ok(job)
}

async fn mark_completed(pool: &PgPool, job_id: Uuid, video_url: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE animation_jobs
        SET status = $2, video_url = $3, completed_at = now()
        WHERE id = $1
        "#,
    )
    .bind(job_id)
    .bind(STATUS_COMPLETED)
    .bind(video_url)
    .execute(pool)
    .await?;
    Ok(())
}

async fn mark_failed(pool: &PgPool, job_id: Uuid, message: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE animation_jobs
        SET status = $2, error_message = $3, completed_at = now()
        WHERE id = $1
        "#,
    )
    .bind(job_id)
    .bind(STATUS_FAILED)
    .bind(message)
    .execute(pool)
    .await?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Background pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Processes one job to completion, recording the outcome in the job row.
/// Intended to run inside `tokio::spawn`; never returns an error.
pub async fn process_job(state: AppState, job_id: Uuid, request: JobRequest) {
    match run_pipeline(&state, job_id, &request).await {
        Ok(video_url) => {
            if let Err(e) = mark_completed(&state.db, job_id, &video_url).await {
                error!(%job_id, "Failed to record job completion: {e}");
                return;
            }
            info!(%job_id, %video_url, "Job completed");

            if let Some(email) = request.email.as_deref() {
                state.notifier.render_complete(email, job_id, &video_url).await;
            }
        }
        Err(e) => {
            error!(%job_id, "Job failed: {e}");
            if let Err(db_err) = mark_failed(&state.db, job_id, &e.to_string()).await {
                error!(%job_id, "Failed to record job failure: {db_err}");
            }
        }
    }
}

/// The pipeline proper. Steps:
/// 1. plan_scenes() → Vec<ContentItem>
/// 2. build_resolution() + fetch_assets() (best-effort)
/// 3. generate() → Vec<Instruction>
/// 4. render_scene_script() → source text
/// 5. save_script()
/// 6. render_script() with up to max_render_attempts invocations
/// 7. upload_video() → public URL
async fn run_pipeline(
    state: &AppState,
    job_id: Uuid,
    request: &JobRequest,
) -> Result<String, AppError> {
    info!(%job_id, prompt = %request.prompt, "Starting animation pipeline");

    // Step 1: Scene plan
    let items = plan_scenes(&state.llm, &request.prompt, request.level).await?;

    // Step 2: Media resolution + retrieval (failures degrade at render time)
    let media = build_resolution(&items);
    if !media.is_empty() {
        let fetched = fetch_assets(&state.http, &media, &state.artifacts.assets_dir).await;
        info!(%job_id, resolved = media.len(), fetched, "Media assets prepared");
    }

    // Step 3: Instruction sequence
    let instructions = generate(&items, &media, &state.canvas)?;
    info!(%job_id, count = instructions.len(), "Instruction sequence generated");

    // Step 4: Serialize to the renderer dialect
    let assets_dir = state.artifacts.assets_dir.to_string_lossy().into_owned();
    let source = render_scene_script(
        &instructions,
        &SceneContext {
            topic: &request.prompt,
            assets_dir: &assets_dir,
            canvas: &state.canvas,
        },
    );

    // Step 5: Persist the script
    let script_path = state
        .artifacts
        .save_script(&request.prompt, &source)
        .await
        .map_err(AppError::Internal)?;

    // Step 6: Render, retrying up to the configured attempt budget
    let outcome = render_with_attempts(state, job_id, &script_path, request.quality).await?;

    // Step 7: Upload (upload failure falls back to the local URL internally)
    info!(%job_id, scene = %outcome.scene_class, "Uploading rendered video");
    let video_url = state.storage.upload_video(&outcome.video_path).await;

    Ok(video_url)
}

/// Invokes the renderer up to `max_render_attempts` times, keeping the last
/// error if every attempt fails.
async fn render_with_attempts(
    state: &AppState,
    job_id: Uuid,
    script_path: &std::path::Path,
    quality: RenderQuality,
) -> Result<crate::render::RenderOutcome, AppError> {
    let attempts = state.config.max_render_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match render_script(
            script_path,
            &state.artifacts.media_dir,
            quality,
            state.config.render_timeout_secs,
        )
        .await
        {
            Ok(outcome) => return Ok(outcome),
            Err(e) => {
                if attempt < attempts {
                    warn!(%job_id, attempt, "Render attempt failed, retrying: {e}");
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| AppError::Render("Render attempts exhausted".to_string())))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_request_carries_defaults_through() {
        let request = JobRequest {
            prompt: "Explain derivatives".to_string(),
            level: ExplanationLevel::default(),
            email: None,
            quality: RenderQuality::default(),
        };
        assert_eq!(request.level, ExplanationLevel::Normal);
        assert_eq!(request.quality, RenderQuality::Low);
    }

    #[test]
    fn test_status_constants_are_distinct() {
        assert_ne!(STATUS_PENDING, STATUS_COMPLETED);
        assert_ne!(STATUS_COMPLETED, STATUS_FAILED);
    }
}
