//! Render execution — shells out to the Manim CLI and locates the output
//! video.
//!
//! The renderer is an opaque consumer of the generated script: this module
//! never interprets the scene beyond extracting the class name to pass on
//! the command line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::info;
use walkdir::WalkDir;

use crate::errors::AppError;

/// Rendering quality, mapped to the Manim CLI quality flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderQuality {
    Low,
    Medium,
    High,
}

impl Default for RenderQuality {
    fn default() -> Self {
        RenderQuality::Low
    }
}

impl RenderQuality {
    pub fn flag(&self) -> &'static str {
        match self {
            RenderQuality::Low => "-ql",
            RenderQuality::Medium => "-qm",
            RenderQuality::High => "-qh",
        }
    }
}

/// Result of one successful render invocation.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub video_path: PathBuf,
    pub scene_class: String,
}

/// Extracts the scene class name from generated Python source.
///
/// Prefers the first class inheriting from `Scene`; falls back to the first
/// class definition of any kind.
pub fn extract_scene_class(source: &str) -> Result<String, AppError> {
    let scene_re = Regex::new(r"class\s+(\w+)\s*\(\s*(?:\w+\.)?Scene\s*\)")
        .expect("scene class pattern is valid");
    if let Some(captures) = scene_re.captures(source) {
        return Ok(captures[1].to_string());
    }

    let any_class_re = Regex::new(r"class\s+(\w+)\s*\(").expect("class pattern is valid");
    any_class_re
        .captures(source)
        .map(|c| c[1].to_string())
        .ok_or_else(|| AppError::Render("No class definition found in the script".to_string()))
}

/// Runs Manim on `script_path` and returns the path of the rendered video.
///
/// The invocation is bounded by `timeout_secs`; on failure the last lines of
/// stderr are surfaced (full renderer output is far too noisy to propagate).
pub async fn render_script(
    script_path: &Path,
    media_dir: &Path,
    quality: RenderQuality,
    timeout_secs: u64,
) -> Result<RenderOutcome, AppError> {
    let source = tokio::fs::read_to_string(script_path)
        .await
        .map_err(|e| AppError::Render(format!("Cannot read script {}: {e}", script_path.display())))?;
    let scene_class = extract_scene_class(&source)?;

    info!(
        script = %script_path.display(),
        class = %scene_class,
        quality = ?quality,
        "Running Manim"
    );

    let output = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        Command::new("python")
            .arg("-m")
            .arg("manim")
            .arg(quality.flag())
            .arg("--media_dir")
            .arg(media_dir)
            .arg(script_path)
            .arg(&scene_class)
            .output(),
    )
    .await
    .map_err(|_| AppError::Render(format!("Manim render timed out after {timeout_secs}s")))?
    .map_err(|e| AppError::Render(format!("Failed to spawn Manim: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::Render(format!(
            "Manim exited with {}: {}",
            output.status,
            tail_lines(&stderr, 5)
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    info!(
        lines = stdout.lines().count(),
        "Manim execution completed"
    );

    let video_path = find_output_video(media_dir, &scene_class).ok_or_else(|| {
        AppError::Render(format!(
            "Could not find output video for scene class {scene_class}"
        ))
    })?;

    info!(video = %video_path.display(), "Rendered video located");
    Ok(RenderOutcome {
        video_path,
        scene_class,
    })
}

/// Finds `<media_dir>/videos/**/<class>.mp4`.
fn find_output_video(media_dir: &Path, scene_class: &str) -> Option<PathBuf> {
    let target = format!("{scene_class}.mp4");
    WalkDir::new(media_dir.join("videos"))
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| {
            entry.file_type().is_file()
                && entry.file_name().to_str() == Some(target.as_str())
        })
        .map(|entry| entry.into_path())
}

/// Last `n` non-empty lines of renderer output, joined.
fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_flags() {
        assert_eq!(RenderQuality::Low.flag(), "-ql");
        assert_eq!(RenderQuality::Medium.flag(), "-qm");
        assert_eq!(RenderQuality::High.flag(), "-qh");
        assert_eq!(RenderQuality::default(), RenderQuality::Low);
    }

    #[test]
    fn test_extract_scene_class_prefers_scene_subclass() {
        let source = "class Helper:\n    pass\n\nclass GeneratedExplainerScene(Scene):\n    def construct(self):\n        pass\n";
        assert_eq!(
            extract_scene_class(source).unwrap(),
            "GeneratedExplainerScene"
        );
    }

    #[test]
    fn test_extract_scene_class_handles_qualified_base() {
        let source = "class PendulumScene(manim.Scene):\n    pass\n";
        assert_eq!(extract_scene_class(source).unwrap(), "PendulumScene");
    }

    #[test]
    fn test_extract_scene_class_falls_back_to_first_class() {
        let source = "class Whatever(ThreeDScene):\n    pass\n";
        assert_eq!(extract_scene_class(source).unwrap(), "Whatever");
    }

    #[test]
    fn test_extract_scene_class_errors_without_class() {
        let source = "def construct():\n    pass\n";
        assert!(extract_scene_class(source).is_err());
    }

    #[test]
    fn test_find_output_video_walks_nested_quality_dirs() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("videos/scene_x/480p15");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("GeneratedExplainerScene.mp4"), b"").unwrap();
        std::fs::write(nested.join("other.mp4"), b"").unwrap();

        let found = find_output_video(root.path(), "GeneratedExplainerScene").unwrap();
        assert!(found.ends_with("GeneratedExplainerScene.mp4"));
    }

    #[test]
    fn test_find_output_video_none_when_missing() {
        let root = tempfile::tempdir().unwrap();
        assert!(find_output_video(root.path(), "Missing").is_none());
    }

    #[test]
    fn test_tail_lines_keeps_last_n() {
        let text = "a\nb\n\nc\nd\ne\nf";
        assert_eq!(tail_lines(text, 3), "d\ne\nf");
        assert_eq!(tail_lines("one", 5), "one");
    }
}
