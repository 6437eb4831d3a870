use std::sync::Arc;

use sqlx::PgPool;

use crate::artifacts::ArtifactStore;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::notify::Notifier;
use crate::script::CanvasConfig;
use crate::storage::Storage;

/// Shared application state injected into all route handlers via Axum
/// extractors, and cloned into each spawned job pipeline.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    /// Plain HTTP client for media retrieval (distinct from the LLM client's
    /// long-timeout pool).
    pub http: reqwest::Client,
    pub storage: Storage,
    /// Pluggable completion notifier. Default: ResendMailer.
    pub notifier: Arc<dyn Notifier>,
    pub artifacts: ArtifactStore,
    /// Layout constants for the script generator.
    pub canvas: CanvasConfig,
    pub config: Config,
}
