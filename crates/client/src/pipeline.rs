//! Extract-and-generate: the boundary operation turning a URL into a quiz.
//!
//! Each run is independent. The URL is validated before any I/O, then the
//! article is extracted and handed to the generator. A generation failure
//! keeps the extracted title and content so callers can still show them.

use quizify_core::{AppConfig, Error, GeneratedQuiz, QuizData};
use serde::Serialize;

use crate::extract::ContentExtractor;
use crate::fetch::validate_article_url;
use crate::llm::{GenerationError, LlmConfig, QuizGenerator};

/// Message shown for a URL that is not absolute http(s).
pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL.";

/// Terminal failure of a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input is not an absolute http(s) URL; nothing was fetched.
    #[error("{message}")]
    Validation { message: String },

    /// No strategy produced readable text.
    #[error("{0}")]
    Extraction(String),

    /// Extraction worked but the quiz could not be generated.
    #[error("Quiz generation failed: {source}")]
    Generation {
        title: Option<String>,
        content: String,
        #[source]
        source: GenerationError,
    },
}

impl PipelineError {
    fn validation() -> Self {
        PipelineError::Validation { message: INVALID_URL_MESSAGE.to_string() }
    }
}

impl From<PipelineError> for Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation { message } => Error::InvalidUrl(message),
            PipelineError::Extraction(message) => Error::ExtractFailed(message),
            err @ PipelineError::Generation { .. } => Error::GenerationFailed(err.to_string()),
        }
    }
}

/// Extraction followed by generation.
pub struct QuizPipeline {
    extractor: ContentExtractor,
    generator: QuizGenerator,
}

impl QuizPipeline {
    pub fn new(extractor: ContentExtractor, generator: QuizGenerator) -> Self {
        Self { extractor, generator }
    }

    /// Wire the pipeline from application config.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built or no LLM key is set.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let extractor = ContentExtractor::from_config(config)?;
        let generator = QuizGenerator::from_config(LlmConfig::from_app_config(config)?)?;
        Ok(Self::new(extractor, generator))
    }

    pub fn extractor(&self) -> &ContentExtractor {
        &self.extractor
    }

    /// Run extract-and-generate for `url`.
    pub async fn run(&self, url: &str) -> Result<GeneratedQuiz, PipelineError> {
        let url = validate_article_url(url).map_err(|e| {
            tracing::debug!(error = %e, "rejected article URL");
            PipelineError::validation()
        })?;

        let extracted = self.extractor.extract(&url).await;
        let Some(content) = extracted.text().map(str::to_string) else {
            let message = extracted
                .extraction_error
                .unwrap_or_else(|| "Failed to extract content: no readable text found".to_string());
            return Err(PipelineError::Extraction(message));
        };
        let title = extracted.title;

        match self.generator.generate_quiz(&content, title.as_deref()).await {
            Ok(quiz_data) => {
                let title = title.unwrap_or_else(|| quiz_data.title.clone());
                tracing::info!(url = %url, title = %title, questions = quiz_data.questions.len(), "quiz ready");
                Ok(GeneratedQuiz { title, content, quiz_data })
            }
            Err(source) => Err(PipelineError::Generation { title, content, source }),
        }
    }
}

/// Result of a pipeline run in its wire shape.
///
/// Every field is always present; absent values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizFormState {
    pub title: Option<String>,
    pub content: Option<String>,
    pub quiz_data: Option<QuizData>,
    pub error: Option<String>,
}

impl From<Result<GeneratedQuiz, PipelineError>> for QuizFormState {
    fn from(result: Result<GeneratedQuiz, PipelineError>) -> Self {
        match result {
            Ok(GeneratedQuiz { title, content, quiz_data }) => {
                Self { title: Some(title), content: Some(content), quiz_data: Some(quiz_data), error: None }
            }
            Err(err) => {
                let error = Some(err.to_string());
                match err {
                    PipelineError::Generation { title, content, .. } => {
                        Self { title, content: Some(content), quiz_data: None, error }
                    }
                    PipelineError::Validation { .. } | PipelineError::Extraction(_) => {
                        Self { title: None, content: None, quiz_data: None, error }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_display() {
        let err = PipelineError::Generation {
            title: Some("T".into()),
            content: "body".into(),
            source: GenerationError::InvalidSchema("quiz has no questions".into()),
        };
        assert_eq!(err.to_string(), "Quiz generation failed: invalid schema: quiz has no questions");
    }

    #[test]
    fn test_form_state_keeps_partial_success() {
        let err = PipelineError::Generation {
            title: Some("Tides".into()),
            content: "body".into(),
            source: GenerationError::EmptyResponse,
        };
        let state = QuizFormState::from(Err(err));
        assert_eq!(state.title.as_deref(), Some("Tides"));
        assert_eq!(state.content.as_deref(), Some("body"));
        assert!(state.quiz_data.is_none());
        assert_eq!(state.error.as_deref(), Some("Quiz generation failed: empty response"));
    }

    #[test]
    fn test_form_state_wire_format() {
        let state = QuizFormState::from(Err(PipelineError::validation()));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["error"], INVALID_URL_MESSAGE);
        assert!(json["title"].is_null());
        assert!(json["content"].is_null());
        assert!(json["quizData"].is_null());
    }

    #[test]
    fn test_into_core_error() {
        let err: Error = PipelineError::validation().into();
        assert!(matches!(err, Error::InvalidUrl(_)));
        let err: Error = PipelineError::Extraction("Failed to extract content: x".into()).into();
        assert!(matches!(err, Error::ExtractFailed(_)));
    }
}
