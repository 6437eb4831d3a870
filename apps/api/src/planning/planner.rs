//! Scene planner — one LLM call from topic to ordered content items.
//!
//! The plan is the generator's input contract: an ordered `Vec<ContentItem>`.
//! Malformed or empty plans are retried a bounded number of times before the
//! job fails; a plan that merely lacks a leading title is accepted with a
//! warning (the generator handles any ordering).

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{LlmClient, LlmError};
use crate::planning::prompts::{
    LEVEL_ADVANCED, LEVEL_ELI5, LEVEL_NORMAL, PLANNING_PROMPT_TEMPLATE, PLANNING_SYSTEM,
};
use crate::script::{ContentItem, ItemKind};

/// Max LLM retries when the plan comes back empty.
const MAX_PLANNING_RETRIES: u32 = 2;

/// How deep the explanation should go. Carried verbatim from the request into
/// the planning prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationLevel {
    #[serde(alias = "ELI5")]
    Eli5,
    Normal,
    Advanced,
}

impl Default for ExplanationLevel {
    fn default() -> Self {
        ExplanationLevel::Normal
    }
}

impl ExplanationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplanationLevel::Eli5 => "eli5",
            ExplanationLevel::Normal => "normal",
            ExplanationLevel::Advanced => "advanced",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            ExplanationLevel::Eli5 => LEVEL_ELI5,
            ExplanationLevel::Normal => LEVEL_NORMAL,
            ExplanationLevel::Advanced => LEVEL_ADVANCED,
        }
    }
}

/// Calls the LLM to plan the scene content for `topic`.
///
/// Retries up to MAX_PLANNING_RETRIES times if the model returns an empty or
/// unparseable plan; transport failures surface as `AppError::Llm` directly.
pub async fn plan_scenes(
    llm: &LlmClient,
    topic: &str,
    level: ExplanationLevel,
) -> Result<Vec<ContentItem>, AppError> {
    let prompt = build_planning_prompt(topic, level);

    for attempt in 0..=MAX_PLANNING_RETRIES {
        let items: Vec<ContentItem> = match llm.call_json(&prompt, PLANNING_SYSTEM).await {
            Ok(items) => items,
            // A malformed plan is worth another attempt; transport and API
            // failures already carry their own retry loop in the client.
            Err(LlmError::Parse(e)) if attempt < MAX_PLANNING_RETRIES => {
                warn!(
                    "Planning attempt {}/{}: plan did not parse ({e}), retrying",
                    attempt + 1,
                    MAX_PLANNING_RETRIES + 1
                );
                continue;
            }
            Err(e) => return Err(AppError::Llm(format!("Planning LLM call failed: {e}"))),
        };

        if items.is_empty() {
            warn!(
                "Planning attempt {}/{}: model returned an empty plan, retrying",
                attempt + 1,
                MAX_PLANNING_RETRIES + 1
            );
            continue;
        }

        if items[0].kind != ItemKind::Title {
            warn!("Plan does not open with a title item, rendering as-is");
        }

        info!(
            items = items.len(),
            level = level.as_str(),
            "Scene plan ready"
        );
        return Ok(items);
    }

    Err(AppError::Llm(format!(
        "Planning failed after {} attempts: model consistently returned an empty or invalid plan",
        MAX_PLANNING_RETRIES + 1
    )))
}

/// Builds the planning prompt by filling the template.
pub(crate) fn build_planning_prompt(topic: &str, level: ExplanationLevel) -> String {
    PLANNING_PROMPT_TEMPLATE
        .replace("{level_instruction}", level.instruction())
        .replace("{topic}", topic)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
