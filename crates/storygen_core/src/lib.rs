pub mod domain;
pub mod generate;
pub mod parse;
pub mod ports;
pub mod prompt;

pub use domain::{AuthUser, GeneratedStory, NewStory, Story, StoryLength};
pub use generate::{generate_story, GenerateRequest, MIN_PROMPT_CHARS};
pub use parse::{parse_story, ParseStoryError, ParsedStory};
pub use ports::{
    classify_upstream, PortError, PortResult, StoryStore, TextCompletionService, TokenVerifier,
};
