//! LLM quiz generation over an OpenAI-compatible chat-completion API.
//!
//! ### Contract
//!
//! - **Endpoint**: `POST {base_url}/chat/completions` (OpenRouter by default)
//! - **Authentication**: `Authorization: Bearer <key>`
//! - **Request**: system + user prompt, `response_format = json_object`,
//!   bounded `max_tokens`, low temperature
//! - **Reply**: the first choice's message content, parsed and validated
//!   into [`QuizData`]
//!
//! One outbound call per request. Nothing is retried and nothing is kept
//! between calls.

pub mod error;
pub mod prompt;
pub mod request;
pub mod response;

pub use error::GenerationError;
pub use prompt::{QuizPrompt, build_quiz_prompt};
pub use request::{ChatMessage, ChatRequest, ResponseFormat, Role};
pub use response::parse_quiz;

use async_trait::async_trait;
use quizify_core::{AppConfig, QuizData};
use reqwest::header;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Connection and sampling settings for the chat-completion service.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl LlmConfig {
    /// Take the LLM settings from the application config.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::MissingApiKey` when no key is configured.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, GenerationError> {
        let api_key = config.require_llm_api_key().map_err(|_| GenerationError::MissingApiKey)?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            model: config.llm_model.clone(),
            max_tokens: config.llm_max_tokens,
            temperature: config.llm_temperature,
            timeout: config.llm_timeout(),
        })
    }
}

/// A chat-completion backend.
///
/// Returns the first choice's content, or `None` when the reply had none.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, req: &ChatRequest) -> Result<Option<String>, GenerationError>;
}

/// HTTP client for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiChatClient {
    pub fn new(config: LlmConfig) -> Result<Self, GenerationError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| GenerationError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChatClient {
    async fn complete(&self, req: &ChatRequest) -> Result<Option<String>, GenerationError> {
        let start = Instant::now();
        let url = format!("{}/chat/completions", self.config.base_url);

        tracing::debug!("requesting chat completion: model={}", req.model);

        let http_response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header(header::ACCEPT, "application/json")
            .json(req)
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!("chat completion response status: {}", status);

        if status == 401 || status == 403 {
            return Err(GenerationError::AuthError);
        }

        if status == 429 {
            return Err(GenerationError::RateLimited);
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(GenerationError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await?;
        let completion: response::ChatCompletionResponse =
            serde_json::from_slice(&bytes).map_err(|e| GenerationError::Payload(e.to_string()))?;

        tracing::debug!("chat completion finished in {:?}", start.elapsed());

        Ok(completion.into_content())
    }
}

/// Turns article text into a validated quiz with one LLM call.
#[derive(Clone)]
pub struct QuizGenerator {
    llm: Arc<dyn ChatCompletion>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl QuizGenerator {
    pub fn new(llm: Arc<dyn ChatCompletion>, model: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self { llm, model: model.into(), max_tokens, temperature }
    }

    /// Build a generator backed by [`OpenAiChatClient`].
    pub fn from_config(config: LlmConfig) -> Result<Self, GenerationError> {
        let (model, max_tokens, temperature) = (config.model.clone(), config.max_tokens, config.temperature);
        let client = OpenAiChatClient::new(config)?;
        Ok(Self::new(Arc::new(client), model, max_tokens, temperature))
    }

    /// Generate a quiz from `text`, titled `title` when known.
    ///
    /// # Errors
    ///
    /// Transport failures, an empty reply, unparseable JSON and schema
    /// violations are all reported as [`GenerationError`].
    pub async fn generate_quiz(&self, text: &str, title: Option<&str>) -> Result<QuizData, GenerationError> {
        let prompt = build_quiz_prompt(text, title);
        let req = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(prompt.system), ChatMessage::user(prompt.user)],
            response_format: Some(ResponseFormat::json_object()),
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        };

        tracing::info!(model = %self.model, chars = text.len(), "requesting quiz generation");

        let reply = self.llm.complete(&req).await.inspect_err(|e| {
            tracing::error!(model = %self.model, error = %e, "chat completion failed");
        })?;

        let raw = reply.ok_or(GenerationError::EmptyResponse)?;

        match parse_quiz(&raw) {
            Ok(quiz) => {
                tracing::info!(questions = quiz.questions.len(), "quiz generated");
                Ok(quiz)
            }
            Err(e) => {
                tracing::error!(error = %e, raw = %raw, "model reply rejected");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for QuizGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizGenerator")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}
