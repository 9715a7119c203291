//! crates/storygen_core/src/prompt.rs
//!
//! Fixed prompt templates for the story-generation call. The word-count
//! bounds are embedded in the prompt text sent to the model; they are not
//! enforced on the output.

use crate::domain::StoryLength;

/// Word-count targets for one story length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthSpec {
    pub min: u32,
    pub max: u32,
    pub target: u32,
}

impl LengthSpec {
    pub fn for_length(length: StoryLength) -> Self {
        match length {
            StoryLength::Short => LengthSpec { min: 100, max: 300, target: 200 },
            StoryLength::Medium => LengthSpec { min: 300, max: 600, target: 450 },
            StoryLength::Long => LengthSpec { min: 600, max: 1000, target: 800 },
        }
    }
}

/// Builds the system prompt embedding the length targets and the JSON
/// response-format instructions.
pub fn system_prompt(length: StoryLength) -> String {
    let spec = LengthSpec::for_length(length);
    format!(
        r#"You are an expert fiction writer who creates engaging, well-structured stories. Your task is to write a complete story based on the user's prompt.

REQUIREMENTS:
- Write a {length} story ({target} words, between {min}-{max} words)
- Use an engaging and creative tone
- Include a clear beginning, middle, and end
- Create engaging characters and dialogue
- Use descriptive language and vivid imagery
- Ensure the story is complete and satisfying
- Keep content appropriate for all audiences
- Format with proper paragraph breaks

RESPONSE FORMAT:
Return a JSON object with exactly this structure:
{{
  "title": "An engaging story title",
  "content": "The complete story content with proper paragraph formatting"
}}

Make sure the JSON is valid and properly escaped."#,
        length = length,
        target = spec.target,
        min = spec.min,
        max = spec.max,
    )
}

/// Builds the user prompt embedding the trimmed story prompt and, when
/// present, the user's suggested title.
pub fn user_prompt(prompt: &str, title: Option<&str>) -> String {
    let title_line = match title {
        Some(t) if !t.is_empty() => format!("Suggested Title: {t}"),
        _ => String::new(),
    };
    format!(
        "Story Prompt: {prompt}\n\n{title_line}\n\nPlease write the story now, following all the requirements above."
    )
}
