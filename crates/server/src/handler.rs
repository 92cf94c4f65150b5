//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::state::AppState;
use crate::tools::{
    QuizGenerateParams, QuizGetParams, QuizHandoffParams, QuizSubmitParams, quiz_generate::generate_impl,
    quiz_get::get_impl, quiz_handoff::handoff_impl, quiz_submit::submit_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for quizify.
#[derive(Clone)]
pub struct QuizifyServer {
    state: AppState,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl QuizifyServer {
    /// Create a new server handler over shared state.
    pub fn new(state: AppState) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    /// Generate a quiz from an article URL.
    #[tool(
        description = "Extract the article at a URL and generate a multiple-choice quiz from it. Subject to a daily quota per user or anonymous client. Returns title, content, quizData, quizId and a handoffId; failures return the same shape with an error message."
    )]
    async fn quiz_generate(&self, params: Parameters<QuizGenerateParams>) -> Result<CallToolResult, McpError> {
        generate_impl(&self.state, params.0).await
    }

    /// Load a freshly generated quiz by handoff id.
    #[tool(description = "Load a generated quiz by the handoffId returned from quiz_generate. Entries expire after a TTL.")]
    async fn quiz_handoff(&self, params: Parameters<QuizHandoffParams>) -> Result<CallToolResult, McpError> {
        handoff_impl(&self.state, params.0).await
    }

    /// Score and record a finished attempt.
    #[tool(description = "Submit answers (question id -> option id) for a stored quiz. Returns the score, a feedback message and a per-question review.")]
    async fn quiz_submit(&self, params: Parameters<QuizSubmitParams>) -> Result<CallToolResult, McpError> {
        submit_impl(&self.state, params.0).await
    }

    /// Fetch a stored quiz.
    #[tool(description = "Retrieve a stored quiz with its questions and the number of submitted attempts.")]
    async fn quiz_get(&self, params: Parameters<QuizGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.state, params.0).await
    }
}

impl ServerHandler for QuizifyServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "quizify".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Call quiz_generate with an article URL, then quiz_handoff to load the quiz and quiz_submit to record answers."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
