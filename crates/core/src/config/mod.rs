//! Application configuration with layered loading.
//!
//! Configuration is assembled with figment from three sources:
//!
//! 1. Environment variables (QUIZIFY_*)
//! 2. TOML config file (if QUIZIFY_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::quiz::FeedbackMode;

mod validation;

pub use validation::ConfigError;

/// Default OpenAI-compatible chat-completion endpoint (OpenRouter).
pub const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model used for quiz generation.
pub const DEFAULT_LLM_MODEL: &str = "openai/gpt-3.5-turbo";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (QUIZIFY_*)
/// 2. TOML config file (if QUIZIFY_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the chat-completion service.
    ///
    /// Set via QUIZIFY_LLM_API_KEY. Required only when a quiz is generated.
    #[serde(default)]
    pub llm_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API (without `/chat/completions`).
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,

    /// Model identifier sent with every completion request.
    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    /// Upper bound on completion tokens.
    #[serde(default = "default_llm_max_tokens")]
    pub llm_max_tokens: u32,

    /// Sampling temperature; kept low so the JSON contract is honoured.
    #[serde(default = "default_llm_temperature")]
    pub llm_temperature: f32,

    /// LLM request timeout in milliseconds.
    #[serde(default = "default_llm_timeout_ms")]
    pub llm_timeout_ms: u64,

    /// Path to the SQLite database holding quizzes, results and usage.
    ///
    /// Set via QUIZIFY_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for page and feed requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP fetch timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Minimum characters a readability candidate needs to count as the article.
    #[serde(default = "default_readability_char_threshold")]
    pub readability_char_threshold: usize,

    /// Readability candidates scored before the best one is picked.
    #[serde(default = "default_readability_max_candidates")]
    pub readability_max_candidates: usize,

    /// How long a generated quiz stays claimable by handoff id.
    #[serde(default = "default_handoff_ttl_secs")]
    pub handoff_ttl_secs: u64,

    /// Quizzes a signed-in user may create per UTC day.
    #[serde(default = "default_daily_quiz_limit")]
    pub daily_quiz_limit: u32,

    /// Quizzes an anonymous client may create per UTC day.
    #[serde(default = "default_anonymous_quiz_limit")]
    pub anonymous_quiz_limit: u32,

    /// Feedback behaviour for quiz sessions driven by this process.
    #[serde(default)]
    pub feedback_mode: FeedbackMode,
}

fn default_llm_base_url() -> String {
    DEFAULT_LLM_BASE_URL.into()
}

fn default_llm_model() -> String {
    DEFAULT_LLM_MODEL.into()
}

fn default_llm_max_tokens() -> u32 {
    1500
}

fn default_llm_temperature() -> f32 {
    0.2
}

fn default_llm_timeout_ms() -> u64 {
    60_000
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./quizify.sqlite")
}

fn default_user_agent() -> String {
    "QuizifyBot/1.0 (+https://quizify.app/bot)".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_readability_char_threshold() -> usize {
    200
}

fn default_readability_max_candidates() -> usize {
    5
}

fn default_handoff_ttl_secs() -> u64 {
    30 * 60
}

fn default_daily_quiz_limit() -> u32 {
    3
}

fn default_anonymous_quiz_limit() -> u32 {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm_api_key: None,
            llm_base_url: default_llm_base_url(),
            llm_model: default_llm_model(),
            llm_max_tokens: default_llm_max_tokens(),
            llm_temperature: default_llm_temperature(),
            llm_timeout_ms: default_llm_timeout_ms(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            readability_char_threshold: default_readability_char_threshold(),
            readability_max_candidates: default_readability_max_candidates(),
            handoff_ttl_secs: default_handoff_ttl_secs(),
            daily_quiz_limit: default_daily_quiz_limit(),
            anonymous_quiz_limit: default_anonymous_quiz_limit(),
            feedback_mode: FeedbackMode::default(),
        }
    }
}

impl AppConfig {
    /// Fetch timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// LLM request timeout as Duration.
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_millis(self.llm_timeout_ms)
    }

    pub fn handoff_ttl(&self) -> Duration {
        Duration::from_secs(self.handoff_ttl_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `QUIZIFY_`
    /// 2. TOML file from `QUIZIFY_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed,
    /// or if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("QUIZIFY_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("QUIZIFY_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if the LLM API key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is unset or blank.
    pub fn require_llm_api_key(&self) -> Result<&str, ConfigError> {
        self.llm_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "llm_api_key".into(),
                hint: "Set QUIZIFY_LLM_API_KEY environment variable".into(),
            })
    }
}
