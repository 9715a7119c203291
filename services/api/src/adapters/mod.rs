pub mod db;
pub mod identity;
pub mod story_llm;

pub use db::PgStoryStore;
pub use identity::HttpTokenVerifier;
pub use story_llm::OpenAiStoryAdapter;
