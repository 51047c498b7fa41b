// Remedi Core - Intent classification
//
// Cosine similarity between the query embedding and each intent centroid.
// Centroids are stored unit-length, so the dot product against the
// normalized query is the cosine. First strictly-greater score wins, which
// makes ties resolve to catalog order.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::catalog::{l2_normalize, IntentCatalog};
use crate::embed::Embedder;
use crate::error::{RemediError, RemediResult};
use crate::intent::FlowDefinition;

/// Minimum confidence for a match to count
pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Best-match result for a single query
#[derive(Debug, Clone)]
pub struct Classification {
    pub tag: String,
    pub confidence: f32,
    pub script: Option<PathBuf>,
    pub flow: Option<Arc<FlowDefinition>>,
}

impl Classification {
    /// Whether the match clears the given threshold
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}

/// Classify a query against the catalog
///
/// Returns the best-scoring intent regardless of confidence; callers
/// decide what to do with low scores.
pub async fn classify(
    catalog: &IntentCatalog,
    embedder: &dyn Embedder,
    query: &str,
) -> RemediResult<Classification> {
    if catalog.is_empty() {
        return Err(RemediError::NoIntentsLoaded);
    }

    let raw = embedder.embed(query).await?;
    if catalog.dim() != 0 && raw.len() != catalog.dim() {
        return Err(RemediError::embedding(format!(
            "query embedding has dimension {}, catalog expects {}",
            raw.len(),
            catalog.dim()
        )));
    }
    let query_vec = l2_normalize(raw);

    let mut best: Option<Classification> = None;
    for entry in catalog.entries() {
        let score = dot(&query_vec, &entry.centroid);
        debug!(tag = %entry.tag, score, "Scored intent");

        let beats = best.as_ref().map_or(true, |b| score > b.confidence);
        if beats {
            best = Some(Classification {
                tag: entry.tag.clone(),
                confidence: score,
                script: entry.script.clone(),
                flow: entry.flow.clone(),
            });
        }
    }

    best.ok_or(RemediError::NoIntentsLoaded)
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
