use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::screening::decision::DecisionModel;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub llm: LlmClient,
    pub config: Arc<Config>,
    /// Loaded once at startup; `None` when no trained model was found.
    pub decision_model: Option<Arc<dyn DecisionModel>>,
    pub sessions: SessionStore,
}
