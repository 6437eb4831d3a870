// Layout-driven script generation.
// Implements: content model, canvas layout constants, the single-pass generator
// with overflow paging, and serialization to the Manim scripting dialect.
// The generator is pure and synchronous: all I/O happens at render time,
// inside the instructions it emits.

pub mod canvas;
pub mod emit;
pub mod generator;
pub mod model;

// Re-export the public API consumed by other modules (planner, jobs).
pub use canvas::{default_canvas_config, CanvasConfig};
pub use generator::{generate, ScriptError};
pub use model::{ContentItem, Instruction, ItemKind, MediaResolution};
