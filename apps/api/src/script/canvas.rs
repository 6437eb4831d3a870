//! Canvas layout constants for the script generator.
//!
//! Every number here was tuned empirically against the renderer's default
//! 14.2 × 8 unit canvas. There is no derivation behind them, so they are
//! kept as configuration rather than folded into the generator.

use serde::{Deserialize, Serialize};

/// Layout parameters for one generation pass.
///
/// Vertical distances are in canvas units (positive y is up, 0 is the canvas
/// center). Pauses are in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Cursor position at the start of a pass and after each page break.
    pub start_y: f32,
    /// Cursor values strictly below this trigger a fade-out-and-reset.
    pub overflow_floor: f32,

    pub title_drop: f32,
    pub heading_drop: f32,
    /// Per estimated text line of a body item.
    pub body_line_height: f32,
    /// Fixed padding added below every body item.
    pub body_padding: f32,
    /// Estimated height of a loaded image plus its caption plus padding.
    /// The actual rendered height is only known at render time.
    pub image_block_drop: f32,
    /// Drop after a missing-asset warning, load error, or plain placeholder.
    pub fallback_drop: f32,

    pub title_font_size: u8,
    pub heading_font_size: u8,
    pub body_font_size: u8,
    pub caption_font_size: u8,

    pub title_pause: f32,
    pub heading_pause: f32,
    pub body_pause: f32,
    /// After a successfully loaded image block (render-time branch).
    pub image_pause: f32,
    /// After a missing-asset warning or load error (render-time branches).
    pub fallback_pause: f32,
    pub placeholder_pause: f32,
    /// After a mid-pass page break.
    pub break_pause: f32,
    /// At the very end of the scene.
    pub closing_pause: f32,
}

/// Returns the default canvas configuration.
///
/// Content starts at y = 3.5 and pages break once the cursor passes −3.5.
pub fn default_canvas_config() -> CanvasConfig {
    CanvasConfig {
        start_y: 3.5,
        overflow_floor: -3.5,
        title_drop: 1.5,
        heading_drop: 1.0,
        body_line_height: 0.5,
        body_padding: 0.3,
        image_block_drop: 2.5,
        fallback_drop: 1.0,
        title_font_size: 36,
        heading_font_size: 28,
        body_font_size: 22,
        caption_font_size: 18,
        title_pause: 1.0,
        heading_pause: 0.5,
        body_pause: 2.0,
        image_pause: 3.0,
        fallback_pause: 2.0,
        placeholder_pause: 1.0,
        break_pause: 0.5,
        closing_pause: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_canvas_sanity() {
        let canvas = default_canvas_config();
        assert!(canvas.start_y > 0.0);
        assert!(canvas.overflow_floor < 0.0);
        assert_eq!(canvas.start_y, -canvas.overflow_floor, "canvas is symmetric");
        assert!(canvas.title_drop > canvas.heading_drop);
        assert!(canvas.image_block_drop > canvas.fallback_drop);
    }

    #[test]
    fn test_default_canvas_matches_tuned_constants() {
        let canvas = default_canvas_config();
        assert_eq!(canvas.start_y, 3.5);
        assert_eq!(canvas.overflow_floor, -3.5);
        assert_eq!(canvas.title_drop, 1.5);
        assert_eq!(canvas.heading_drop, 1.0);
        assert_eq!(canvas.body_line_height, 0.5);
        assert_eq!(canvas.body_padding, 0.3);
        assert_eq!(canvas.title_font_size, 36);
        assert_eq!(canvas.body_font_size, 22);
    }
}
