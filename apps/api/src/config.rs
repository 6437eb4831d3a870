use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    /// Missing key disables email notifications instead of failing startup.
    pub resend_api_key: Option<String>,
    pub notify_from_email: String,
    /// Public base URL used for locally served video files.
    pub base_url: String,
    /// Root directory for generated artifacts (scripts, downloaded assets, media).
    pub output_root: PathBuf,
    /// Wall-clock bound for one Manim render invocation.
    pub render_timeout_secs: u64,
    pub max_render_attempts: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            resend_api_key: std::env::var("RESEND_API_KEY").ok(),
            notify_from_email: std::env::var("NOTIFY_FROM_EMAIL")
                .unwrap_or_else(|_| "notifications@askleap.dev".to_string()),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            output_root: PathBuf::from(
                std::env::var("OUTPUT_ROOT").unwrap_or_else(|_| "generated".to_string()),
            ),
            render_timeout_secs: std::env::var("RENDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse::<u64>()
                .context("RENDER_TIMEOUT_SECS must be a positive integer")?,
            max_render_attempts: std::env::var("MAX_RENDER_ATTEMPTS")
                .unwrap_or_else(|_| "2".to_string())
                .parse::<u32>()
                .context("MAX_RENDER_ATTEMPTS must be a positive integer")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
