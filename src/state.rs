// Shared application state
//
// Model collaborators are constructed once at startup and shared read-only
// across requests; handlers receive them through this state.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm_engine::provider::LlmProvider;
use crate::pipeline::ConversationPipeline;

#[derive(Clone)]
pub struct AppState {
    /// The full upload -> attribution pipeline
    pub pipeline: Arc<ConversationPipeline>,
    /// Direct handle to the text-generation provider (for /generate)
    pub llm: Arc<dyn LlmProvider>,
    pub config: Arc<AppConfig>,
}
