//! Layout-Driven Script Generator — the single forward pass over planned
//! content items.
//!
//! # Processing model
//! - Each item kind maps to a fixed instruction shape; the cursor descends by
//!   a per-kind amount from `CanvasConfig`.
//! - After every item except the last, a cursor below the overflow floor
//!   flushes the tracked elements (clear-all + short pause) and resets the
//!   cursor, producing discrete "pages" without the caller pre-chunking.
//! - The pass is pure and synchronous: no I/O, no shared state, identical
//!   inputs produce identical output. Media existence is checked at render
//!   time by the emitted conditional block, never here.
//!
//! Overflow is greedy bin-packing by estimated height. Earlier elements are
//! never re-flowed and text width is never measured; the consumer is a
//! linear playback engine, so a mis-estimate degrades to a busy frame, not a
//! crash.

use thiserror::Error;
use tracing::warn;

use crate::script::canvas::CanvasConfig;
use crate::script::model::{ContentItem, Instruction, ItemKind, MediaResolution};

/// Caption used when an image placeholder carries none.
const DEFAULT_CAPTION: &str = "Image";

/// Structural failure during generation. Per-item anomalies (missing caption,
/// unresolved media) degrade to fallback instructions instead; only text that
/// cannot be embedded in the script dialect stops the pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("invalid content item at index {index} ({kind:?}): text contains unembeddable control characters")]
    InvalidContentItem { index: usize, kind: ItemKind },
}

/// Process-local cursor state for one generation pass.
///
/// `y` only decreases or resets to `start_y`; `pending` holds the ids of
/// visible elements emitted since the last clear and is emptied exactly when
/// a clear-all is emitted.
struct LayoutCursor {
    y: f32,
    pending: Vec<String>,
}

impl LayoutCursor {
    fn new(canvas: &CanvasConfig) -> Self {
        Self {
            y: canvas.start_y,
            pending: Vec::new(),
        }
    }

    fn track(&mut self, id: &str) {
        self.pending.push(id.to_string());
    }

    /// Emits a clear-all for the tracked elements and empties the group.
    fn flush(&mut self, out: &mut Vec<Instruction>) {
        out.push(Instruction::ClearAll {
            count: self.pending.len(),
        });
        self.pending.clear();
    }
}

/// Generates the ordered instruction sequence for `items`.
///
/// `items` may be empty; the result then contains only the closing pause.
/// The returned sequence is replayed in order by the renderer; order is part
/// of the contract.
pub fn generate(
    items: &[ContentItem],
    media: &MediaResolution,
    canvas: &CanvasConfig,
) -> Result<Vec<Instruction>, ScriptError> {
    let mut out = Vec::new();
    let mut cursor = LayoutCursor::new(canvas);

    for (index, item) in items.iter().enumerate() {
        match item.kind {
            ItemKind::Title => {
                let id = format!("title_{index}");
                out.push(Instruction::Title {
                    id: id.clone(),
                    text: escape_text(&item.text, index, item.kind)?,
                });
                out.push(Instruction::Pause {
                    seconds: canvas.title_pause,
                });
                cursor.track(&id);
                cursor.y -= canvas.title_drop;
            }

            ItemKind::Heading => {
                let id = format!("heading_{index}");
                out.push(Instruction::Heading {
                    id: id.clone(),
                    text: escape_text(&item.text, index, item.kind)?,
                    y: cursor.y,
                });
                out.push(Instruction::Pause {
                    seconds: canvas.heading_pause,
                });
                cursor.track(&id);
                cursor.y -= canvas.heading_drop;
            }

            ItemKind::Point | ItemKind::Bullet | ItemKind::Summary => {
                let id = format!("body_{index}");
                let prefixed = if item.kind == ItemKind::Bullet {
                    format!("- {}", item.text)
                } else {
                    item.text.clone()
                };
                out.push(Instruction::Body {
                    id: id.clone(),
                    text: escape_text(&prefixed, index, item.kind)?,
                    y: cursor.y,
                });
                out.push(Instruction::Pause {
                    seconds: canvas.body_pause,
                });
                cursor.track(&id);
                let lines = estimated_lines(&item.text);
                cursor.y -= lines as f32 * canvas.body_line_height + canvas.body_padding;
            }

            ItemKind::ImagePlaceholder => {
                let caption = escape_text(
                    item.caption.as_deref().unwrap_or(DEFAULT_CAPTION),
                    index,
                    item.kind,
                )?;
                let resolved = item.media_ref.as_deref().and_then(|r| media.resolve(r));

                match resolved {
                    Some(asset_file) => {
                        // The existence check, warning branch, and error
                        // branch live inside this one instruction and run at
                        // render time. Both outcomes descend, so the larger
                        // success estimate keeps pages conservative.
                        let id = format!("image_{index}");
                        out.push(Instruction::Image {
                            id: id.clone(),
                            asset_file: asset_file.to_string(),
                            caption,
                            y: cursor.y,
                        });
                        cursor.track(&id);
                        cursor.y -= canvas.image_block_drop;
                    }
                    None => {
                        warn!(index, "media reference unresolved, emitting placeholder");
                        let id = format!("placeholder_{index}");
                        out.push(Instruction::Placeholder {
                            id: id.clone(),
                            caption,
                            y: cursor.y,
                        });
                        out.push(Instruction::Pause {
                            seconds: canvas.placeholder_pause,
                        });
                        cursor.track(&id);
                        cursor.y -= canvas.fallback_drop;
                    }
                }
            }
        }

        // Page break: flush and reset when content would overflow, unless
        // this was the final item (the finalization clear covers it).
        if cursor.y < canvas.overflow_floor && index + 1 < items.len() {
            cursor.flush(&mut out);
            cursor.y = canvas.start_y;
            out.push(Instruction::Pause {
                seconds: canvas.break_pause,
            });
        }
    }

    if !cursor.pending.is_empty() {
        cursor.flush(&mut out);
    }
    out.push(Instruction::Pause {
        seconds: canvas.closing_pause,
    });

    Ok(out)
}

/// Escapes a text field for embedding in the script dialect.
///
/// Quotes and newlines are escaped; tab is passed through. Any other control
/// character cannot be represented and aborts the pass.
fn escape_text(text: &str, index: usize, kind: ItemKind) -> Result<String, ScriptError> {
    if text
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\t')
    {
        return Err(ScriptError::InvalidContentItem { index, kind });
    }
    Ok(text
        .replace('\'', "\\'")
        .replace('"', "\\\"")
        .replace('\n', "\\n"))
}

/// Estimated printed line count: embedded line breaks + 1.
fn estimated_lines(text: &str) -> usize {
    text.matches('\n').count() + 1
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::canvas::default_canvas_config;

    fn canvas() -> CanvasConfig {
        default_canvas_config()
    }

    fn no_media() -> MediaResolution {
        MediaResolution::new()
    }

    fn clear_count(instructions: &[Instruction]) -> usize {
        instructions
            .iter()
            .filter(|i| matches!(i, Instruction::ClearAll { .. }))
            .count()
    }

    fn element_count(instructions: &[Instruction]) -> usize {
        instructions.iter().filter(|i| i.creates_element()).count()
    }

    // ── empty input ─────────────────────────────────────────────────────────

    #[test]
    fn test_empty_items_only_closing_pause() {
        let out = generate(&[], &no_media(), &canvas()).unwrap();
        assert_eq!(element_count(&out), 0, "no element-creation instructions");
        assert_eq!(clear_count(&out), 0, "pending group stays empty");
        assert_eq!(out, vec![Instruction::Pause { seconds: 1.0 }]);
    }

    // ── per-kind dispatch ───────────────────────────────────────────────────

    #[test]
    fn test_bullet_text_gets_dash_prefix() {
        let items = vec![ContentItem::text(ItemKind::Bullet, "cost")];
        let out = generate(&items, &no_media(), &canvas()).unwrap();
        match &out[0] {
            Instruction::Body { text, .. } => assert_eq!(text, "- cost"),
            other => panic!("expected Body, got {other:?}"),
        }
    }

    #[test]
    fn test_point_and_summary_have_no_prefix() {
        for kind in [ItemKind::Point, ItemKind::Summary] {
            let items = vec![ContentItem::text(kind, "plain")];
            let out = generate(&items, &no_media(), &canvas()).unwrap();
            match &out[0] {
                Instruction::Body { text, .. } => assert_eq!(text, "plain"),
                other => panic!("expected Body, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_title_is_top_anchored_and_heading_follows_cursor() {
        let items = vec![
            ContentItem::text(ItemKind::Title, "Derivatives"),
            ContentItem::text(ItemKind::Heading, "Definition"),
        ];
        let out = generate(&items, &no_media(), &canvas()).unwrap();
        assert!(
            matches!(&out[0], Instruction::Title { .. }),
            "title carries no cursor position"
        );
        match &out[2] {
            // title consumed 1.5 units even though it is top-anchored
            Instruction::Heading { y, .. } => assert_eq!(*y, 2.0),
            other => panic!("expected Heading, got {other:?}"),
        }
    }

    #[test]
    fn test_each_element_is_followed_by_its_pause() {
        let c = canvas();
        let items = vec![
            ContentItem::text(ItemKind::Title, "T"),
            ContentItem::text(ItemKind::Heading, "H"),
            ContentItem::text(ItemKind::Point, "P"),
        ];
        let out = generate(&items, &no_media(), &c).unwrap();
        assert_eq!(out[1], Instruction::Pause { seconds: c.title_pause });
        assert_eq!(out[3], Instruction::Pause { seconds: c.heading_pause });
        assert_eq!(out[5], Instruction::Pause { seconds: c.body_pause });
    }

    // ── body height estimate ────────────────────────────────────────────────

    #[test]
    fn test_multiline_body_descends_by_line_count() {
        let items = vec![
            ContentItem::text(ItemKind::Point, "line one\nline two"),
            ContentItem::text(ItemKind::Point, "after"),
        ];
        let out = generate(&items, &no_media(), &canvas()).unwrap();
        // 2 lines * 0.5 + 0.3 padding = 1.3 below the start
        match &out[2] {
            Instruction::Body { y, .. } => assert!((y - 2.2).abs() < 1e-6, "got y={y}"),
            other => panic!("expected Body, got {other:?}"),
        }
    }

    // ── escaping ────────────────────────────────────────────────────────────

    #[test]
    fn test_quotes_and_newlines_are_escaped() {
        let items = vec![ContentItem::text(
            ItemKind::Point,
            "it's a \"test\"\nsecond line",
        )];
        let out = generate(&items, &no_media(), &canvas()).unwrap();
        match &out[0] {
            Instruction::Body { text, .. } => {
                assert_eq!(text, "it\\'s a \\\"test\\\"\\nsecond line");
            }
            other => panic!("expected Body, got {other:?}"),
        }
    }

    #[test]
    fn test_control_character_aborts_with_index_and_kind() {
        let items = vec![
            ContentItem::text(ItemKind::Title, "fine"),
            ContentItem::text(ItemKind::Bullet, "bad\u{0000}text"),
        ];
        let err = generate(&items, &no_media(), &canvas()).unwrap_err();
        assert_eq!(
            err,
            ScriptError::InvalidContentItem {
                index: 1,
                kind: ItemKind::Bullet
            }
        );
    }

    #[test]
    fn test_tab_is_not_a_structural_failure() {
        let items = vec![ContentItem::text(ItemKind::Point, "col1\tcol2")];
        assert!(generate(&items, &no_media(), &canvas()).is_ok());
    }

    // ── image placeholders ──────────────────────────────────────────────────

    #[test]
    fn test_resolved_image_emits_conditional_block() {
        let mut media = MediaResolution::new();
        media.insert("https://example.com/images/boeing_plane.jpg", "boeing_plane.jpg");
        let items = vec![ContentItem::image(
            Some("Boeing 737-8"),
            Some("https://example.com/images/boeing_plane.jpg"),
        )];
        let out = generate(&items, &media, &canvas()).unwrap();
        match &out[0] {
            Instruction::Image {
                asset_file,
                caption,
                ..
            } => {
                assert_eq!(asset_file, "boeing_plane.jpg");
                assert_eq!(caption, "Boeing 737-8");
            }
            other => panic!("expected Image, got {other:?}"),
        }
    }

    #[test]
    fn test_unresolved_image_emits_placeholder_not_asset_load() {
        let items = vec![ContentItem::image(
            Some("US Defense Technology"),
            Some("https://example.com/images/defense_system.png"),
        )];
        let out = generate(&items, &no_media(), &canvas()).unwrap();
        assert!(
            out.iter().all(|i| !matches!(i, Instruction::Image { .. })),
            "no asset-loading instruction for an unresolved ref"
        );
        match &out[0] {
            Instruction::Placeholder { caption, .. } => {
                assert_eq!(caption, "US Defense Technology");
            }
            other => panic!("expected Placeholder, got {other:?}"),
        }
    }

    #[test]
    fn test_image_without_ref_or_caption_uses_default_caption() {
        let items = vec![ContentItem::image(None, None)];
        let out = generate(&items, &no_media(), &canvas()).unwrap();
        match &out[0] {
            Instruction::Placeholder { caption, .. } => assert_eq!(caption, "Image"),
            other => panic!("expected Placeholder, got {other:?}"),
        }
    }

    // ── overflow paging ─────────────────────────────────────────────────────

    #[test]
    fn test_overflow_flushes_resets_and_pauses() {
        // 9 headings at 1.0 drop each: cursor first passes the -3.5 floor
        // after the 8th (y = -4.5), which is not the last item.
        let items: Vec<ContentItem> = (0..9)
            .map(|i| ContentItem::text(ItemKind::Heading, format!("h{i}")))
            .collect();
        let out = generate(&items, &no_media(), &canvas()).unwrap();

        assert_eq!(clear_count(&out), 2, "one page break plus the final flush");
        let clears: Vec<&Instruction> = out
            .iter()
            .filter(|i| matches!(i, Instruction::ClearAll { .. }))
            .collect();
        assert_eq!(clears[0], &Instruction::ClearAll { count: 8 });
        assert_eq!(clears[1], &Instruction::ClearAll { count: 1 });

        // the page break is followed by the short break pause
        let break_pos = out
            .iter()
            .position(|i| matches!(i, Instruction::ClearAll { .. }))
            .unwrap();
        assert_eq!(out[break_pos + 1], Instruction::Pause { seconds: 0.5 });

        // the 9th heading starts a fresh page at the top
        match out
            .iter()
            .filter(|i| matches!(i, Instruction::Heading { .. }))
            .last()
            .unwrap()
        {
            Instruction::Heading { y, .. } => assert_eq!(*y, 3.5),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_overflow_on_final_item_defers_to_final_flush() {
        // 8 headings: cursor is at -4.5 after the last item, but no page
        // break fires, only the single finalization clear.
        let items: Vec<ContentItem> = (0..8)
            .map(|i| ContentItem::text(ItemKind::Heading, format!("h{i}")))
            .collect();
        let out = generate(&items, &no_media(), &canvas()).unwrap();
        assert_eq!(clear_count(&out), 1);
        assert_eq!(
            out.iter()
                .filter(|i| matches!(i, Instruction::ClearAll { .. }))
                .next(),
            Some(&Instruction::ClearAll { count: 8 })
        );
    }

    #[test]
    fn test_cursor_exactly_at_floor_does_not_break() {
        // 7 headings: y = 3.5 - 7.0 = -3.5, not strictly below the floor.
        let items: Vec<ContentItem> = (0..8)
            .map(|i| ContentItem::text(ItemKind::Heading, format!("h{i}")))
            .collect();
        let out = generate(&items, &no_media(), &canvas()).unwrap();
        // the 8th heading is still placed on the first page at y = -3.5
        match out
            .iter()
            .filter(|i| matches!(i, Instruction::Heading { .. }))
            .last()
            .unwrap()
        {
            Instruction::Heading { y, .. } => assert_eq!(*y, -3.5),
            _ => unreachable!(),
        }
    }

    // ── finalization and determinism ────────────────────────────────────────

    #[test]
    fn test_generation_is_idempotent() {
        let mut media = MediaResolution::new();
        media.insert("https://example.com/a.jpg", "a.jpg");
        let items = vec![
            ContentItem::text(ItemKind::Title, "The Saudi-US $600 Billion Deal"),
            ContentItem::text(ItemKind::Heading, "Key Areas of Impact"),
            ContentItem::image(Some("AI and Tech Hubs"), Some("https://example.com/a.jpg")),
            ContentItem::text(ItemKind::Summary, "Overall, the deal aims to strengthen ties."),
        ];
        let first = generate(&items, &media, &canvas()).unwrap();
        let second = generate(&items, &media, &canvas()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pythagorean_scenario_end_to_end() {
        let items = vec![
            ContentItem::text(ItemKind::Title, "Pythagorean Theorem"),
            ContentItem::text(ItemKind::Bullet, "a² + b² = c²"),
            ContentItem::text(ItemKind::Bullet, "works for right triangles"),
        ];
        let out = generate(&items, &no_media(), &canvas()).unwrap();

        assert!(matches!(&out[0], Instruction::Title { .. }));

        let bodies: Vec<(&str, f32)> = out
            .iter()
            .filter_map(|i| match i {
                Instruction::Body { text, y, .. } => Some((text.as_str(), *y)),
                _ => None,
            })
            .collect();
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[0].0, "- a² + b² = c²");
        assert_eq!(bodies[1].0, "- works for right triangles");
        assert!(bodies[0].1 > bodies[1].1, "descending cursor positions");

        // total descent stays above the floor: no page break, one final clear
        assert_eq!(clear_count(&out), 1);
        assert_eq!(out.last(), Some(&Instruction::Pause { seconds: 1.0 }));
        assert!(
            matches!(out[out.len() - 2], Instruction::ClearAll { count: 3 }),
            "final clear flushes all three tracked elements"
        );
    }
}
