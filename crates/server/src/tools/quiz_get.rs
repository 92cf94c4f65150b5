//! quiz_get tool implementation.
//!
//! Retrieves a stored quiz with its questions.

use quizify_core::Error;
use quizify_core::store::{QuizDetails, QuizId, QuizRepository};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Parameters for the quiz_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuizGetParams {
    /// Id of the stored quiz.
    pub quiz_id: QuizId,
}

/// Output from the quiz_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuizGetOutput {
    #[serde(flatten)]
    pub details: QuizDetails,
    /// Number of submitted attempts.
    pub attempts: u64,
}

/// Implementation of the quiz_get tool.
pub async fn get_impl(state: &AppState, params: QuizGetParams) -> Result<CallToolResult, McpError> {
    let details = state.store.get_quiz_details(params.quiz_id).await?;
    let attempts = state.store.count_results(params.quiz_id).await?;

    let output = QuizGetOutput { details, attempts };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize quiz: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::state;
    use quizify_core::store::QuizMeta;

    #[tokio::test]
    async fn test_get_missing() {
        let state = state().await;
        let err = get_impl(&state, QuizGetParams { quiz_id: 404 }).await.unwrap_err();
        assert_eq!(err.code.0, -32005);
    }

    #[tokio::test]
    async fn test_get_found() {
        let state = state().await;
        let quiz_id = state.store.create_quiz(&QuizMeta::new("Tides")).await.unwrap();

        let result = get_impl(&state, QuizGetParams { quiz_id }).await.unwrap();
        let text = &result.content[0].as_text().unwrap().text;
        let output: QuizGetOutput = serde_json::from_str(text).unwrap();

        assert_eq!(output.details.quiz.id, quiz_id);
        assert_eq!(output.details.quiz.meta.title, "Tides");
        assert_eq!(output.attempts, 0);
    }
}
