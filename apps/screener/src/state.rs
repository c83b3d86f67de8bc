use std::sync::Arc;

use crate::archive::ResultArchive;
use crate::interview::store::SessionStore;
use crate::llm_client::TextGenerator;
use crate::prompts::PromptLoader;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Model backend. `LlmClient` in production, a scripted double in tests.
    pub llm: Arc<dyn TextGenerator>,
    pub prompts: PromptLoader,
    pub sessions: SessionStore,
    pub archive: ResultArchive,
}
