//! quiz_submit tool implementation.
//!
//! Scores a finished attempt against the stored quiz and records the result.

use quizify_core::quiz::{Score, score};
use quizify_core::store::{QuizId, QuizRepository};
use quizify_core::{Error, UserAnswers};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Parameters for the quiz_submit tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuizSubmitParams {
    /// Id of the stored quiz.
    pub quiz_id: QuizId,

    /// Question id -> chosen option id.
    pub answers: UserAnswers,
}

/// Per-question outcome.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionReview {
    pub question_id: String,
    pub selected_option_id: Option<String>,
    pub correct_option_id: String,
    pub is_correct: bool,
}

/// Output from the quiz_submit tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmitOutput {
    pub quiz_id: QuizId,
    pub score: Score,
    /// Banded message for the score ("Excellent Job!" ...).
    pub feedback: String,
    pub review: Vec<QuestionReview>,
}

/// Implementation of the quiz_submit tool.
pub async fn submit_impl(state: &AppState, params: QuizSubmitParams) -> Result<CallToolResult, McpError> {
    if params.answers.is_empty() {
        return Err(Error::InvalidInput("answers cannot be empty".into()).into());
    }

    let quiz = state.store.get_quiz_details(params.quiz_id).await?.quiz_data();

    let unknown = params.answers.iter().filter(|(question_id, _)| quiz.question(question_id).is_none()).count();
    if unknown > 0 {
        tracing::debug!(quiz_id = params.quiz_id, unknown, "ignoring answers for unknown questions");
    }

    let result = score(&quiz, &params.answers);
    state.store.save_quiz_result(params.quiz_id, &result, &params.answers).await?;

    tracing::info!(
        quiz_id = params.quiz_id,
        correct = result.correct_count,
        total = result.total,
        "quiz result saved"
    );

    let review = quiz
        .questions
        .iter()
        .map(|question| {
            let selected = params.answers.get(&question.id);
            QuestionReview {
                question_id: question.id.clone(),
                selected_option_id: selected.map(str::to_string),
                correct_option_id: question.correct_option_id.clone(),
                is_correct: selected.is_some_and(|option_id| question.is_correct(option_id)),
            }
        })
        .collect();

    let output = QuizSubmitOutput {
        quiz_id: params.quiz_id,
        score: result,
        feedback: result.feedback_message().to_string(),
        review,
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize result: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
