// Remedi Core - Collaborator traits
//
// Documentation search and reply post-processing live outside the engine.
// Both are async trait objects so deployments can plug in a vector store
// or an LLM without touching dispatch logic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RemediResult;

/// A document fragment returned by knowledge search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Source document name
    pub source: String,

    /// Matched fragment text
    pub content: String,

    /// Page or section locator within the source, "N/A" when unknown
    #[serde(default = "default_page")]
    pub page: String,

    /// Relevance score, higher is better
    pub score: f32,
}

fn default_page() -> String {
    "N/A".to_string()
}

/// Documentation lookup backend
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Search the documentation corpus for fragments relevant to the query
    async fn search(&self, query: &str, limit: usize) -> RemediResult<Vec<SearchHit>>;
}

/// Reply post-processor
///
/// `enhance` turns raw search hits into an answer; `humanize` rewrites
/// script output or error text into something a user can act on.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Compose an answer to the query from the given fragments
    async fn enhance(&self, query: &str, hits: &[SearchHit]) -> RemediResult<String>;

    /// Rewrite raw engine output into user-facing prose
    async fn humanize(&self, raw: &str) -> RemediResult<String>;
}
