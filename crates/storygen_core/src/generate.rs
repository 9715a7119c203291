//! crates/storygen_core/src/generate.rs
//!
//! The story-generation pipeline: validate input, build the prompts, make
//! one completion call, parse the response, estimate usage.

use crate::domain::{GeneratedStory, StoryLength};
use crate::parse::parse_story;
use crate::ports::{PortError, PortResult, TextCompletionService};
use crate::prompt::{system_prompt, user_prompt};

/// Minimum trimmed prompt length accepted by `generate_story`.
pub const MIN_PROMPT_CHARS: usize = 10;

/// A validated-on-entry generation request. `length` is already typed, so
/// only the prompt needs checking here.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub length: StoryLength,
    pub title: Option<String>,
}

/// Runs the full pipeline against the given completion service. Input
/// validation happens before any external call; upstream failures arrive
/// already classified by the adapter and are passed through unchanged.
pub async fn generate_story(
    completer: &dyn TextCompletionService,
    request: GenerateRequest,
) -> PortResult<GeneratedStory> {
    let prompt = request.prompt.trim();
    if prompt.chars().count() < MIN_PROMPT_CHARS {
        return Err(PortError::Validation(
            "Please provide a story prompt with at least 10 characters".to_string(),
        ));
    }
    let title = request.title.as_deref().map(str::trim).filter(|t| !t.is_empty());

    let system = system_prompt(request.length);
    let user = user_prompt(prompt, title);

    let raw = completer.complete(&system, &user).await?;

    let story = parse_story(&raw, title)
        .map_err(|e| PortError::Upstream(e.to_string()))?;

    Ok(GeneratedStory {
        tokens_used: estimate_tokens(prompt, &story.content),
        title: story.title,
        content: story.content,
    })
}

/// Rough character-to-token heuristic: one token per four characters of
/// prompt plus content, rounded up. Not an authoritative count.
fn estimate_tokens(prompt: &str, content: &str) -> u32 {
    let chars = prompt.chars().count() + content.chars().count();
    chars.div_ceil(4) as u32
}
