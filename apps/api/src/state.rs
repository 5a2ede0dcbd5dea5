use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ModelClient;
use crate::tagging::dictionary::DictionaryStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable model collaborator. Default: `LlmClient` against DashScope.
    pub llm: Arc<dyn ModelClient>,
    /// Live tag dictionary; handlers take one snapshot per request.
    pub dictionaries: Arc<DictionaryStore>,
    pub config: Config,
}
