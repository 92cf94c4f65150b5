//! Network side of quizify.
//!
//! This crate provides the article fetch pipeline, feed discovery and
//! parsing, readability extraction, LLM quiz generation and the
//! extract-and-generate pipeline shared by the server and CLI.

pub mod extract;
pub mod feed;
pub mod fetch;
pub mod llm;
pub mod pipeline;

pub use extract::{ContentExtractor, ExtractConfig, ExtractedContent, ExtractionStrategy, Extractor, LectitoExtractor};
pub use feed::{FeedReader, discover_feed};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, validate_article_url};
pub use llm::{ChatCompletion, GenerationError, LlmConfig, OpenAiChatClient, QuizGenerator};
pub use pipeline::{PipelineError, QuizFormState, QuizPipeline};
