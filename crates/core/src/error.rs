//! Unified error types for quizify.
//!
//! Every variant renders with a stable code prefix so callers (and MCP
//! clients) can match on the failure class without parsing prose.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error type shared by the quizify crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty answers payload).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The submitted URL is not an absolute http(s) URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Every extraction strategy failed for the article.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// A feed document could not be parsed.
    #[error("FEED_PARSE_FAILED: {0}")]
    FeedParse(String),

    /// The LLM could not produce a valid quiz.
    #[error("GENERATION_FAILED: {0}")]
    GenerationFailed(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// HTTP error response or transport failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// The subject has used up its daily quiz allowance.
    #[error("QUOTA_EXCEEDED: {0}")]
    QuotaExceeded(String),

    /// No live handoff entry for the given id.
    #[error("HANDOFF_MISS: {0}")]
    HandoffMiss(String),

    /// No stored quiz with the given id.
    #[error("QUIZ_NOT_FOUND: {0}")]
    QuizNotFound(String),

    /// Database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row could not be decoded back into the quiz model.
    #[error("STORE_ERROR: corrupt record: {0}")]
    CorruptRecord(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::ExtractFailed(msg) => (-32000, msg.clone()),
            Error::FeedParse(msg) => (-32000, msg.clone()),
            Error::GenerationFailed(msg) => (-32004, msg.clone()),
            Error::FetchTimeout(msg) => (-32006, msg.clone()),
            Error::FetchTooLarge(msg) => (-32007, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::QuotaExceeded(msg) => (-32009, msg.clone()),
            Error::HandoffMiss(msg) => (-32001, msg.clone()),
            Error::QuizNotFound(msg) => (-32005, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::CorruptRecord(msg) => (-32002, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
