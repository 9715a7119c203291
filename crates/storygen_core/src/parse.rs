//! crates/storygen_core/src/parse.rs
//!
//! Resilient extraction of a `{title, content}` pair from the model's raw
//! response. The model is instructed to emit JSON but is not guaranteed to,
//! so parsing is an ordered chain of strategies, first success wins:
//!
//! 1. parse the outermost `{...}` span as JSON
//! 2. regex-extract quoted `"title"` and `"content"` values
//! 3. fall back to the suggested title and the raw text itself

use regex::Regex;

/// The `{title, content}` pair recovered from a raw model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStory {
    pub title: String,
    pub content: String,
}

/// All three strategies failed to produce a non-empty title and content.
#[derive(Debug, thiserror::Error)]
#[error("Invalid story structure received from AI")]
pub struct ParseStoryError;

/// Parses a raw model response into a story, degrading gracefully rather
/// than rejecting a usable story over formatting noise. `fallback_title`
/// is the user's suggested title, used only by the verbatim fallback.
pub fn parse_story(
    raw: &str,
    fallback_title: Option<&str>,
) -> Result<ParsedStory, ParseStoryError> {
    let (title, content) = extract_json_object(raw)
        .or_else(|| extract_quoted_fields(raw))
        .unwrap_or_else(|| verbatim_fallback(raw, fallback_title));

    let title = title.trim().to_string();
    let content = clean_content(&content);

    if title.is_empty() || content.is_empty() {
        return Err(ParseStoryError);
    }
    Ok(ParsedStory { title, content })
}

/// Strategy 1: take the span from the first `{` to the last `}` and parse
/// it as JSON. Succeeds only if both fields are present and non-empty.
fn extract_json_object(raw: &str) -> Option<(String, String)> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(&raw[start..=end]).ok()?;
    let title = value.get("title")?.as_str()?;
    let content = value.get("content")?.as_str()?;
    if title.is_empty() || content.is_empty() {
        return None;
    }
    Some((title.to_string(), content.to_string()))
}

/// Strategy 2: the JSON is malformed (usually an unescaped quote or a
/// truncated response), but the field values are still recognizable.
/// The content capture is non-greedy up to a quote immediately followed
/// by the closing brace.
fn extract_quoted_fields(raw: &str) -> Option<(String, String)> {
    let title_re = Regex::new(r#""title"\s*:\s*"([^"]+)""#).unwrap();
    let content_re = Regex::new(r#""content"\s*:\s*"((?s:.+?))"\s*\}"#).unwrap();

    let title = title_re.captures(raw)?.get(1)?.as_str().to_string();
    let content = content_re.captures(raw)?.get(1)?.as_str().to_string();
    Some((title, content))
}

/// Strategy 3: no recognizable structure at all. Use the suggested title
/// (or a default) and the raw text with code-fence markers stripped.
fn verbatim_fallback(raw: &str, fallback_title: Option<&str>) -> (String, String) {
    let title = match fallback_title {
        Some(t) if !t.trim().is_empty() => t.to_string(),
        _ => "Generated Story".to_string(),
    };
    let content = raw.replace("```json", "").replace("```", "").trim().to_string();
    (title, content)
}

/// Post-processing applied regardless of which strategy succeeded:
/// unescape literal `\n` and `\"` sequences, collapse runs of blank lines
/// to a single blank line, trim.
fn clean_content(content: &str) -> String {
    let unescaped = content.replace("\\n", "\n").replace("\\\"", "\"");
    let blank_runs = Regex::new(r"\n\s*\n").unwrap();
    blank_runs.replace_all(&unescaped, "\n\n").trim().to_string()
}
