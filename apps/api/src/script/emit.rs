//! Serialization of the instruction sequence to the Manim scripting dialect.
//!
//! This is the only place the dialect's concrete syntax lives. The generator
//! produces structured instructions with escaped text already baked in; this
//! module turns them into one Python source blob, statement order preserved.

use crate::script::canvas::CanvasConfig;
use crate::script::model::Instruction;

/// Name of the scene class in every generated script.
pub const SCENE_CLASS: &str = "GeneratedExplainerScene";

const INDENT: &str = "        ";

/// Everything the serializer needs besides the instructions themselves.
pub struct SceneContext<'a> {
    /// Topic line for the header comment.
    pub topic: &'a str,
    /// Directory the renderer resolves asset filenames against.
    pub assets_dir: &'a str,
    pub canvas: &'a CanvasConfig,
}

/// Renders the full scene source: preamble, one statement block per
/// instruction, and a trailing usage comment.
pub fn render_scene_script(instructions: &[Instruction], ctx: &SceneContext) -> String {
    let mut lines: Vec<String> = vec![
        "from manim import *".to_string(),
        "import os".to_string(),
        "import numpy as np".to_string(),
        String::new(),
        format!("# Generated scene for: {}", ctx.topic.replace('\n', " ")),
        String::new(),
        format!("class {SCENE_CLASS}(Scene):"),
        "    def construct(self):".to_string(),
        format!("{INDENT}assets_dir = r\"{}\"", ctx.assets_dir),
        String::new(),
        format!("{INDENT}tracked = Group()"),
        String::new(),
    ];

    for instruction in instructions {
        emit_instruction(instruction, ctx.canvas, &mut lines);
    }

    lines.push(String::new());
    lines.push(format!(
        "# Render with: manim -ql <this file> {SCENE_CLASS}"
    ));
    lines.join("\n")
}

fn emit_instruction(instruction: &Instruction, canvas: &CanvasConfig, lines: &mut Vec<String>) {
    match instruction {
        Instruction::Title { id, text } => {
            lines.push(format!(
                "{INDENT}{id} = Tex(r\"{text}\", font_size={}).to_edge(UP)",
                canvas.title_font_size
            ));
            lines.push(format!("{INDENT}self.play(Write({id}))"));
            lines.push(format!("{INDENT}tracked.add({id})"));
        }

        Instruction::Heading { id, text, y } => {
            lines.push(format!(
                "{INDENT}{id} = Tex(r\"{text}\", font_size={}).move_to(np.array([0, {}, 0]))",
                canvas.heading_font_size,
                fmt_pos(*y)
            ));
            lines.push(format!("{INDENT}self.play(Write({id}))"));
            lines.push(format!("{INDENT}tracked.add({id})"));
        }

        Instruction::Body { id, text, y } => {
            lines.push(format!(
                "{INDENT}{id} = Tex(r\"{text}\", font_size={}, \
                 tex_environment=\"{{minipage}}{{0.8\\linewidth}}\").move_to(np.array([0, {}, 0]))",
                canvas.body_font_size,
                fmt_pos(*y)
            ));
            lines.push(format!("{INDENT}self.play(FadeIn({id}, shift=DOWN))"));
            lines.push(format!("{INDENT}tracked.add({id})"));
        }

        Instruction::Image {
            id,
            asset_file,
            caption,
            y,
        } => {
            // Existence and load faults are render-time concerns; both
            // fallback branches keep the scene running.
            let text_y = fmt_pos(y - 0.5);
            lines.push(format!("{INDENT}# Conditional image block: {asset_file}"));
            lines.push(format!(
                "{INDENT}{id}_path = os.path.join(assets_dir, \"{asset_file}\")"
            ));
            lines.push(format!("{INDENT}try:"));
            lines.push(format!("{INDENT}    if os.path.exists({id}_path):"));
            lines.push(format!(
                "{INDENT}        {id} = ImageMobject({id}_path).scale(0.6)"
            ));
            lines.push(format!(
                "{INDENT}        {id}.move_to(np.array([0, {} - {id}.height / 2, 0]))",
                fmt_pos(*y)
            ));
            lines.push(format!(
                "{INDENT}        {id}_caption = Tex(r\"{caption}\", font_size={}).next_to({id}, DOWN, buff=0.2)",
                canvas.caption_font_size
            ));
            lines.push(format!(
                "{INDENT}        {id}_block = Group({id}, {id}_caption)"
            ));
            lines.push(format!("{INDENT}        self.play(FadeIn({id}_block))"));
            lines.push(format!("{INDENT}        tracked.add({id}_block)"));
            lines.push(format!(
                "{INDENT}        self.wait({})",
                fmt_seconds(canvas.image_pause)
            ));
            lines.push(format!("{INDENT}    else:"));
            lines.push(format!(
                "{INDENT}        {id}_warn = Tex(r\"Image not found: '{asset_file}'\", \
                 font_size={}, color=YELLOW).move_to(np.array([0, {text_y}, 0]))",
                canvas.caption_font_size
            ));
            lines.push(format!("{INDENT}        self.play(Write({id}_warn))"));
            lines.push(format!("{INDENT}        tracked.add({id}_warn)"));
            lines.push(format!(
                "{INDENT}        self.wait({})",
                fmt_seconds(canvas.fallback_pause)
            ));
            lines.push(format!("{INDENT}except Exception as exc:"));
            lines.push(format!(
                "{INDENT}    {id}_err = Tex(\"Error loading '{asset_file}': \" + str(exc)[:100], \
                 font_size={}, color=RED).move_to(np.array([0, {text_y}, 0]))",
                canvas.caption_font_size
            ));
            lines.push(format!("{INDENT}    self.play(Write({id}_err))"));
            lines.push(format!("{INDENT}    tracked.add({id}_err)"));
            lines.push(format!(
                "{INDENT}    self.wait({})",
                fmt_seconds(canvas.fallback_pause)
            ));
        }

        Instruction::Placeholder { id, caption, y } => {
            lines.push(format!(
                "{INDENT}{id} = Tex(r\"Image placeholder: {caption}\", font_size={}).move_to(np.array([0, {}, 0]))",
                canvas.caption_font_size,
                fmt_pos(y - 0.5)
            ));
            lines.push(format!("{INDENT}self.play(Write({id}))"));
            lines.push(format!("{INDENT}tracked.add({id})"));
        }

        Instruction::ClearAll { .. } => {
            lines.push(format!("{INDENT}self.play(FadeOut(tracked))"));
            lines.push(format!("{INDENT}tracked = Group()"));
        }

        Instruction::Pause { seconds } => {
            lines.push(format!("{INDENT}self.wait({})", fmt_seconds(*seconds)));
        }
    }
}

/// Formats a canvas position with two decimals for stable output.
fn fmt_pos(y: f32) -> String {
    format!("{y:.2}")
}

/// Formats a wait duration: integral seconds without the fraction.
fn fmt_seconds(seconds: f32) -> String {
    if seconds.fract().abs() < f32::EPSILON {
        format!("{}", seconds as i64)
    } else {
        format!("{seconds}")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::canvas::default_canvas_config;
    use crate::script::generator::generate;
    use crate::script::model::{ContentItem, ItemKind, MediaResolution};

    fn render(items: &[ContentItem], media: &MediaResolution) -> String {
        let canvas = default_canvas_config();
        let instructions = generate(items, media, &canvas).unwrap();
        render_scene_script(
            &instructions,
            &SceneContext {
                topic: "test topic",
                assets_dir: "/tmp/assets",
                canvas: &canvas,
            },
        )
    }

    #[test]
    fn test_scaffold_present_even_for_empty_plan() {
        let script = render(&[], &MediaResolution::new());
        assert!(script.contains("from manim import *"));
        assert!(script.contains("class GeneratedExplainerScene(Scene):"));
        assert!(script.contains("def construct(self):"));
        assert!(script.contains("assets_dir = r\"/tmp/assets\""));
        assert!(script.contains("self.wait(1)"), "closing pause survives");
        assert!(!script.contains("FadeOut"), "no clear-all for empty plan");
    }

    #[test]
    fn test_title_is_top_anchored_with_reveal() {
        let items = vec![ContentItem::text(ItemKind::Title, "Derivatives")];
        let script = render(&items, &MediaResolution::new());
        assert!(script.contains(r#"Tex(r"Derivatives", font_size=36).to_edge(UP)"#));
        assert!(script.contains("self.play(Write(title_0))"));
        assert!(script.contains("self.wait(1)"));
    }

    #[test]
    fn test_bullet_statement_carries_prefix_and_fade_in() {
        let items = vec![ContentItem::text(ItemKind::Bullet, "cost")];
        let script = render(&items, &MediaResolution::new());
        assert!(script.contains(r#"Tex(r"- cost""#));
        assert!(script.contains("self.play(FadeIn(body_0, shift=DOWN))"));
        assert!(script.contains("tex_environment=\"{minipage}{0.8\\linewidth}\""));
    }

    #[test]
    fn test_resolved_image_block_has_all_three_branches() {
        let mut media = MediaResolution::new();
        media.insert("https://example.com/b.jpg", "b.jpg");
        let items = vec![ContentItem::image(
            Some("Boeing 737-8"),
            Some("https://example.com/b.jpg"),
        )];
        let script = render(&items, &media);
        assert!(script.contains("os.path.exists(image_0_path)"));
        assert!(script.contains("ImageMobject(image_0_path).scale(0.6)"));
        assert!(script.contains(r#"Tex(r"Boeing 737-8", font_size=18)"#));
        assert!(script.contains("color=YELLOW"), "missing-asset warning branch");
        assert!(script.contains("color=RED"), "load-error branch");
        assert!(script.contains("self.wait(3)"), "success pause");
    }

    #[test]
    fn test_unresolved_placeholder_has_no_asset_loading() {
        let items = vec![ContentItem::image(Some("Some caption"), None)];
        let script = render(&items, &MediaResolution::new());
        assert!(script.contains(r#"Tex(r"Image placeholder: Some caption""#));
        assert!(!script.contains("ImageMobject"));
        assert!(!script.contains("os.path.exists"));
    }

    #[test]
    fn test_clear_all_fades_and_reinitializes_group() {
        let items: Vec<ContentItem> = (0..9)
            .map(|i| ContentItem::text(ItemKind::Heading, format!("h{i}")))
            .collect();
        let script = render(&items, &MediaResolution::new());
        let fadeouts = script.matches("self.play(FadeOut(tracked))").count();
        assert_eq!(fadeouts, 2, "page break plus final flush");
        // one re-init at the top, one after the page break
        assert_eq!(script.matches("tracked = Group()").count(), 3);
        assert!(script.contains("self.wait(0.5)"), "page-break pause");
    }

    #[test]
    fn test_output_is_deterministic() {
        let items = vec![
            ContentItem::text(ItemKind::Title, "Topic"),
            ContentItem::text(ItemKind::Point, "a point"),
        ];
        let media = MediaResolution::new();
        assert_eq!(render(&items, &media), render(&items, &media));
    }

    #[test]
    fn test_fmt_seconds_trims_integral_values() {
        assert_eq!(fmt_seconds(1.0), "1");
        assert_eq!(fmt_seconds(3.0), "3");
        assert_eq!(fmt_seconds(0.5), "0.5");
    }
}
