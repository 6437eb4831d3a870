//! Artifact workspace — directory bootstrap and script persistence.
//!
//! All generated files live under one explicitly configured `output_root`:
//! `scripts/` for generated scene sources, `assets/` for downloaded media,
//! `media/` for the renderer's output tree.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

/// Filenames derived from user prompts are capped at this length.
const MAX_NAME_LEN: usize = 50;

/// Paths to the bootstrapped artifact directories.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    pub scripts_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub media_dir: PathBuf,
}

impl ArtifactStore {
    /// Creates the artifact directory tree under `output_root`.
    pub fn bootstrap(output_root: &Path) -> Result<Self> {
        let store = Self {
            scripts_dir: output_root.join("scripts"),
            assets_dir: output_root.join("assets"),
            media_dir: output_root.join("media"),
        };

        for dir in [&store.scripts_dir, &store.assets_dir, &store.media_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create artifact directory {}", dir.display()))?;
        }

        info!(root = %output_root.display(), "Artifact directories ready");
        Ok(store)
    }

    /// Saves a generated scene script, named from the topic plus a timestamp.
    /// Returns the path to the saved file.
    pub async fn save_script(&self, topic: &str, source: &str) -> Result<PathBuf> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let file_name = format!("{}_{}.py", sanitize_filename(topic), timestamp);
        let path = self.scripts_dir.join(file_name);

        tokio::fs::write(&path, source)
            .await
            .with_context(|| format!("Failed to write script to {}", path.display()))?;

        info!(path = %path.display(), "Generated script saved");
        Ok(path)
    }
}

/// Creates a safe filename base from input text: keeps alphanumerics,
/// underscore, dash and spaces (spaces become underscores), lowercases, and
/// truncates.
pub fn sanitize_filename(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.replace(' ', "_").to_lowercase();
    safe.chars().take(MAX_NAME_LEN).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_replaces_punctuation() {
        assert_eq!(
            sanitize_filename("What is a derivative?"),
            "what_is_a_derivative_"
        );
    }

    #[test]
    fn test_sanitize_filename_truncates() {
        let long = "x".repeat(120);
        assert_eq!(sanitize_filename(&long).len(), MAX_NAME_LEN);
    }

    #[test]
    fn test_sanitize_filename_keeps_dash_and_underscore() {
        assert_eq!(sanitize_filename("saudi-us_deal"), "saudi-us_deal");
    }

    #[test]
    fn test_bootstrap_creates_all_directories() {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::bootstrap(root.path()).unwrap();
        assert!(store.scripts_dir.is_dir());
        assert!(store.assets_dir.is_dir());
        assert!(store.media_dir.is_dir());
    }

    #[tokio::test]
    async fn test_save_script_writes_named_file() {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::bootstrap(root.path()).unwrap();
        let path = store
            .save_script("Pythagorean Theorem", "from manim import *")
            .await
            .unwrap();
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("pythagorean_theorem_"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "from manim import *"
        );
    }
}
