//! quiz_generate tool implementation.
//!
//! Runs extract-and-generate for a URL behind the daily quota, stores the
//! quiz and parks it in the handoff cache for the quiz-taking client.

use quizify_client::QuizFormState;
use quizify_client::fetch::{canonicalize, validate_article_url};
use quizify_core::store::{QuizId, QuizMeta, QuizRepository, UsageQuota, UsageSubject, content_hash};
use quizify_core::{Error, GeneratedQuiz, Handoff, HandoffId};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Input parameters for quiz_generate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuizGenerateParams {
    /// The article URL (absolute http/https).
    pub url: String,

    /// Signed-in user the quiz is created for. Gets the larger daily quota.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Anonymous client identifier (e.g. IP address) used when no user is signed in.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Whether the stored quiz is publicly listed.
    #[serde(default)]
    pub is_public: bool,
}

/// Output structure for quiz_generate tool.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizGenerateOutput {
    #[serde(flatten)]
    pub form: QuizFormState,
    /// Id of the stored quiz (success only).
    pub quiz_id: Option<QuizId>,
    /// Handoff id for loading the quiz with quiz_handoff (success only).
    pub handoff_id: Option<HandoffId>,
    /// Quizzes left today for this subject.
    pub remaining: u32,
}

/// Implementation of the quiz_generate tool.
pub async fn generate_impl(state: &AppState, params: QuizGenerateParams) -> Result<CallToolResult, McpError> {
    let subject = UsageSubject::from_ids(params.user_id.as_deref(), params.client_id.as_deref());

    let Some(reservation) = state.usage.try_reserve(&subject).await? else {
        let limit = state.usage.limits().for_subject(&subject);
        return Err(Error::QuotaExceeded(format!("daily limit of {limit} quizzes reached for {subject}")).into());
    };

    let pipeline = match state.pipeline() {
        Ok(pipeline) => pipeline,
        Err(e) => {
            state.usage.release(reservation).await?;
            return Err(e.into());
        }
    };

    let generated = match pipeline.run(&params.url).await {
        Ok(generated) => generated,
        Err(e) => {
            tracing::warn!(url = %params.url, error = %e, "quiz generation failed");
            state.usage.release(reservation).await?;
            let output = QuizGenerateOutput {
                form: QuizFormState::from(Err(e)),
                quiz_id: None,
                handoff_id: None,
                remaining: state.usage.remaining(&subject).await?,
            };
            return Ok(CallToolResult::error(vec![Content::text(to_json(&output)?)]));
        }
    };

    let quiz_id = match persist(state, &params, &generated).await {
        Ok(quiz_id) => quiz_id,
        Err(e) => {
            state.usage.release(reservation).await?;
            return Err(e.into());
        }
    };

    let handoff_id = state.handoffs.put(Handoff { quiz_id: Some(quiz_id), generated: generated.clone() }).await;

    tracing::info!(quiz_id, handoff_id = %handoff_id, subject = %subject, "quiz stored");

    let output = QuizGenerateOutput {
        form: QuizFormState::from(Ok(generated)),
        quiz_id: Some(quiz_id),
        handoff_id: Some(handoff_id),
        remaining: state.usage.remaining(&subject).await?,
    };

    Ok(CallToolResult::success(vec![Content::text(to_json(&output)?)]))
}

async fn persist(state: &AppState, params: &QuizGenerateParams, generated: &GeneratedQuiz) -> Result<QuizId, Error> {
    let source_url = validate_article_url(&params.url)
        .map(|url| canonicalize(&url).to_string())
        .unwrap_or_else(|_| params.url.trim().to_string());

    let meta = QuizMeta {
        description: Some(generated.quiz_data.title.clone()).filter(|t| t != &generated.title),
        source_url: Some(source_url),
        content_hash: Some(content_hash(&generated.content)),
        user_id: params.user_id.clone().filter(|id| !id.trim().is_empty()),
        is_public: params.is_public,
        ..QuizMeta::new(generated.title.clone())
    };

    let quiz_id = state.store.create_quiz(&meta).await?;
    state.store.save_quiz_questions(quiz_id, &generated.quiz_data.questions).await?;
    Ok(quiz_id)
}

fn to_json<T: Serialize>(output: &T) -> Result<String, Error> {
    serde_json::to_string_pretty(output).map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))
}
