//! quiz_handoff tool implementation.
//!
//! Loads a freshly generated quiz by its handoff id.

use quizify_core::{Error, Handoff, HandoffId};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Parameters for the quiz_handoff tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuizHandoffParams {
    /// Handoff id returned by quiz_generate.
    pub handoff_id: String,

    /// Remove the entry once read.
    #[serde(default)]
    pub consume: bool,
}

/// Output from the quiz_handoff tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuizHandoffOutput {
    pub handoff: Handoff,
}

/// Implementation of the quiz_handoff tool.
pub async fn handoff_impl(state: &AppState, params: QuizHandoffParams) -> Result<CallToolResult, McpError> {
    let id: HandoffId = params.handoff_id.parse()?;

    let handoff = if params.consume { state.handoffs.take(&id).await } else { state.handoffs.get(&id).await };
    let handoff = handoff.ok_or_else(|| Error::HandoffMiss(format!("no live quiz for handoff {id}")))?;

    let output = QuizHandoffOutput { handoff };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize handoff: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::state;
    use quizify_core::GeneratedQuiz;
    use quizify_core::quiz::QuizData;

    fn handoff() -> Handoff {
        Handoff {
            quiz_id: None,
            generated: GeneratedQuiz {
                title: "Tides".into(),
                content: "Body".into(),
                quiz_data: QuizData { title: "Tides".into(), questions: vec![] },
            },
        }
    }

    #[tokio::test]
    async fn test_handoff_found() {
        let state = state().await;
        let id = state.handoffs.put(handoff()).await;

        let params = QuizHandoffParams { handoff_id: id.to_string(), consume: false };
        let result = handoff_impl(&state, params).await.unwrap();

        let text = &result.content[0].as_text().unwrap().text;
        let output: QuizHandoffOutput = serde_json::from_str(text).unwrap();
        assert_eq!(output.handoff, handoff());
        assert!(state.handoffs.get(&id).await.is_some());
    }

    #[tokio::test]
    async fn test_handoff_consumed() {
        let state = state().await;
        let id = state.handoffs.put(handoff()).await;

        let params = QuizHandoffParams { handoff_id: id.to_string(), consume: true };
        handoff_impl(&state, params.clone()).await.unwrap();

        let err = handoff_impl(&state, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_handoff_bad_id() {
        let state = state().await;
        let params = QuizHandoffParams { handoff_id: "nope".into(), consume: false };
        let err = handoff_impl(&state, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
