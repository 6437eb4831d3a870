// Scene planning: turns a user prompt plus an explanation level into the
// ordered content items the script generator consumes.
// All LLM calls go through llm_client — no direct Anthropic calls here.

pub mod planner;
pub mod prompts;

pub use planner::{plan_scenes, ExplanationLevel};
