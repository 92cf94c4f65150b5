//! Shared server state.
//!
//! Everything here is cheap to clone and internally synchronized: the store
//! runs on tokio-rusqlite's background thread and the handoff cache sits
//! behind a tokio mutex.

use std::sync::Arc;

use quizify_client::QuizPipeline;
use quizify_core::store::{QuotaLimits, UsageLedger};
use quizify_core::{AppConfig, Error, HandoffCache, QuizStore};

#[derive(Clone)]
pub struct AppState {
    /// `None` when no LLM key is configured; generation then fails per call.
    pub pipeline: Option<Arc<QuizPipeline>>,
    pub store: QuizStore,
    pub usage: UsageLedger,
    pub handoffs: HandoffCache,
}

impl AppState {
    pub fn new(pipeline: Option<QuizPipeline>, store: QuizStore, limits: QuotaLimits, handoffs: HandoffCache) -> Self {
        let usage = UsageLedger::new(store.clone(), limits);
        Self { pipeline: pipeline.map(Arc::new), store, usage, handoffs }
    }

    /// Open the database and wire the pipeline from config.
    pub async fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let store = QuizStore::open(&config.db_path).await?;

        let pipeline = match config.require_llm_api_key() {
            Ok(_) => Some(QuizPipeline::from_config(config)?),
            Err(e) => {
                tracing::warn!("{e}; quiz_generate will fail until a key is configured");
                None
            }
        };

        Ok(Self::new(pipeline, store, QuotaLimits::from(config), HandoffCache::new(config.handoff_ttl())))
    }

    pub fn pipeline(&self) -> Result<&QuizPipeline, Error> {
        self.pipeline
            .as_deref()
            .ok_or_else(|| Error::GenerationFailed("missing API key: QUIZIFY_LLM_API_KEY not set".into()))
    }
}
