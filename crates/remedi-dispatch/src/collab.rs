//! Default collaborator implementations.
//!
//! The dispatcher takes its knowledge base and response generator as
//! trait objects. These null implementations let a deployment wire the
//! engine without either collaborator, for tests or script-only setups.

use async_trait::async_trait;

use remedi_core::{KnowledgeBase, RemediResult, ResponseGenerator, SearchHit};

/// Knowledge base with no documents
pub struct NoKnowledgeBase;

#[async_trait]
impl KnowledgeBase for NoKnowledgeBase {
    async fn search(&self, _query: &str, _limit: usize) -> RemediResult<Vec<SearchHit>> {
        Ok(Vec::new())
    }
}

/// Generator that returns its input unchanged
pub struct PassthroughGenerator;

#[async_trait]
impl ResponseGenerator for PassthroughGenerator {
    async fn enhance(&self, _query: &str, hits: &[SearchHit]) -> RemediResult<String> {
        let mut out = String::new();
        for hit in hits {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(&hit.content);
        }
        Ok(out)
    }

    async fn humanize(&self, raw: &str) -> RemediResult<String> {
        Ok(raw.to_string())
    }
}
