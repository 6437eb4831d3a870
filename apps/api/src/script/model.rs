//! Content and instruction model for the script generator.
//!
//! `ContentItem` is the input shape produced by the scene planner (one unit of
//! material to visualize). `Instruction` is the output shape: a tagged
//! variant per animation statement, serialized to the Manim dialect only at
//! the boundary (`emit`), so the generator's core logic is testable without
//! string matching.
#![allow(dead_code)]

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Content items
// ────────────────────────────────────────────────────────────────────────────

/// The kind of a planned content item. Determines which optional fields are
/// meaningful: `caption` and `media_ref` are read only for `ImagePlaceholder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Title,
    Heading,
    Point,
    Bullet,
    Summary,
    ImagePlaceholder,
}

/// One unit of planned material to render.
///
/// Absent optional fields degrade to placeholder rendering; they never make
/// generation fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ItemKind,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_ref: Option<String>,
}

impl ContentItem {
    /// Convenience constructor for text-only kinds.
    pub fn text(kind: ItemKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            caption: None,
            media_ref: None,
        }
    }

    /// Convenience constructor for image placeholders.
    pub fn image(caption: Option<&str>, media_ref: Option<&str>) -> Self {
        Self {
            kind: ItemKind::ImagePlaceholder,
            text: String::new(),
            caption: caption.map(str::to_string),
            media_ref: media_ref.map(str::to_string),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Media resolution
// ────────────────────────────────────────────────────────────────────────────

/// Partial mapping from a `media_ref` (typically a URL) to a local asset
/// filename inside the job's assets directory.
///
/// A ref with no entry is "unresolved": the generator emits a plain
/// placeholder for it instead of an asset-loading instruction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaResolution(HashMap<String, String>);

impl MediaResolution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, media_ref: impl Into<String>, asset_file: impl Into<String>) {
        self.0.insert(media_ref.into(), asset_file.into());
    }

    pub fn resolve(&self, media_ref: &str) -> Option<&str> {
        self.0.get(media_ref).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for MediaResolution {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Instructions
// ────────────────────────────────────────────────────────────────────────────

/// One animation statement in the generated script, before serialization.
///
/// `id` is the element identifier the emitted dialect uses as a variable name;
/// every element-creating variant is tracked in the scene's fade-out group.
/// Text fields are already escaped and (for bullets) prefixed by the
/// generator; `emit` embeds them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// Large-font heading anchored to the top edge of the canvas.
    Title { id: String, text: String },
    /// Medium-font heading at a fixed vertical position.
    Heading { id: String, text: String, y: f32 },
    /// Body text (point / bullet / summary) at a fixed vertical position.
    Body { id: String, text: String, y: f32 },
    /// Conditional image block: load `asset_file` if present at render time,
    /// otherwise show a warning; on a runtime fault show an error. All three
    /// branches are part of this single instruction.
    Image {
        id: String,
        asset_file: String,
        caption: String,
        y: f32,
    },
    /// Plain placeholder for an unresolved media reference.
    Placeholder { id: String, caption: String, y: f32 },
    /// Fade out every element tracked since the last clear. `count` records
    /// how many elements are flushed.
    ClearAll { count: usize },
    Pause { seconds: f32 },
}

impl Instruction {
    /// Returns true for variants that create a visible element.
    pub fn creates_element(&self) -> bool {
        !matches!(self, Instruction::ClearAll { .. } | Instruction::Pause { .. })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_kind_deserializes_snake_case() {
        let item: ContentItem = serde_json::from_str(
            r#"{"kind": "image_placeholder", "caption": "AI and Tech Hubs", "media_ref": "https://example.com/images/ai_investment.jpg"}"#,
        )
        .unwrap();
        assert_eq!(item.kind, ItemKind::ImagePlaceholder);
        assert_eq!(item.caption.as_deref(), Some("AI and Tech Hubs"));
        assert!(item.text.is_empty(), "missing text defaults to empty");
    }

    #[test]
    fn test_content_item_missing_optionals_deserialize() {
        let item: ContentItem =
            serde_json::from_str(r#"{"kind": "bullet", "text": "cost"}"#).unwrap();
        assert_eq!(item.kind, ItemKind::Bullet);
        assert!(item.caption.is_none());
        assert!(item.media_ref.is_none());
    }

    #[test]
    fn test_media_resolution_partial_lookup() {
        let mut media = MediaResolution::new();
        media.insert("https://example.com/a.jpg", "a.jpg");
        assert_eq!(media.resolve("https://example.com/a.jpg"), Some("a.jpg"));
        assert_eq!(media.resolve("https://example.com/b.jpg"), None);
        assert_eq!(media.len(), 1);
    }

    #[test]
    fn test_creates_element_classification() {
        let title = Instruction::Title {
            id: "title_0".to_string(),
            text: "T".to_string(),
        };
        let clear = Instruction::ClearAll { count: 3 };
        let pause = Instruction::Pause { seconds: 1.0 };
        assert!(title.creates_element());
        assert!(!clear.creates_element());
        assert!(!pause.creates_element());
    }
}
