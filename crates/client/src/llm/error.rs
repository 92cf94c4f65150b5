//! Quiz generation error types.

use std::sync::Arc;

use quizify_core::Error;

/// Errors from the chat-completion call or from interpreting its reply.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// No API key configured.
    #[error("missing API key: QUIZIFY_LLM_API_KEY not set")]
    MissingApiKey,

    /// Authentication failed (invalid API key).
    #[error("authentication failed: invalid API key")]
    AuthError,

    /// Rate limited by the provider.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// The completion envelope could not be decoded.
    #[error("unexpected completion payload: {0}")]
    Payload(String),

    /// The model returned no message content.
    #[error("empty response")]
    EmptyResponse,

    /// The message content is not JSON.
    #[error("malformed JSON: {source}")]
    MalformedJson {
        #[source]
        source: serde_json::Error,
        /// The text exactly as the model returned it.
        raw: String,
    },

    /// The JSON does not describe a usable quiz.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

impl GenerationError {
    /// Raw model output, when the failure happened after a reply arrived.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            GenerationError::MalformedJson { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { GenerationError::Timeout } else { GenerationError::Network(Arc::new(err)) }
    }
}

impl From<GenerationError> for Error {
    fn from(err: GenerationError) -> Self {
        Error::GenerationFailed(err.to_string())
    }
}
