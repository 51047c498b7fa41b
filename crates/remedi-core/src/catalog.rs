// Remedi Core - Intent catalog
//
// Loads intent records from a catalog file, computes a centroid per intent
// from its pattern embeddings, and exposes the result as an immutable
// snapshot. Invalid records are skipped with a warning; an empty result is
// an error. Reloads swap the whole catalog atomically so readers never see
// a half-built state.

use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::embed::Embedder;
use crate::error::{RemediError, RemediResult};
use crate::intent::{FlowDefinition, Intent, IntentFile};

/// A catalog entry ready for classification
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub tag: String,
    pub script: Option<PathBuf>,
    pub flow: Option<Arc<FlowDefinition>>,
    /// L2-normalized mean of the pattern embeddings
    pub centroid: Vec<f32>,
}

/// Immutable set of classified intents
#[derive(Debug, Default)]
pub struct IntentCatalog {
    entries: Vec<CatalogEntry>,
    dim: usize,
}

impl IntentCatalog {
    /// Load a catalog file and precompute centroids
    ///
    /// `.json` files are parsed as JSON, anything else as YAML.
    pub async fn load(path: &Path, embedder: &dyn Embedder) -> RemediResult<Self> {
        let raw = std::fs::read_to_string(path)?;

        let file: IntentFile = if path.extension().map_or(false, |e| e == "json") {
            let de = &mut serde_json::Deserializer::from_str(&raw);
            serde_path_to_error::deserialize(de)
                .map_err(|e| RemediError::validation(format!("{}: {}", path.display(), e)))?
        } else {
            let de = serde_yaml::Deserializer::from_str(&raw);
            serde_path_to_error::deserialize(de)
                .map_err(|e| RemediError::validation(format!("{}: {}", path.display(), e)))?
        };

        let catalog = Self::from_intents(file.intents, embedder).await?;
        info!(
            path = %path.display(),
            intents = catalog.len(),
            "Loaded intent catalog"
        );
        Ok(catalog)
    }

    /// Build a catalog from already-parsed intents
    ///
    /// Skips records that fail validation or whose patterns all fail to
    /// embed. Errors only when nothing usable remains.
    pub async fn from_intents(
        intents: Vec<Intent>,
        embedder: &dyn Embedder,
    ) -> RemediResult<Self> {
        let mut entries: Vec<CatalogEntry> = Vec::with_capacity(intents.len());

        for intent in intents {
            if let Err(reason) = intent.validate() {
                warn!(tag = %intent.tag, %reason, "Skipping invalid intent record");
                continue;
            }

            if entries.iter().any(|e| e.tag == intent.tag) {
                warn!(tag = %intent.tag, "Skipping duplicate intent tag, first record wins");
                continue;
            }

            if let Some(script) = &intent.script {
                if !script.exists() {
                    warn!(
                        tag = %intent.tag,
                        script = %script.display(),
                        "Intent script does not exist yet"
                    );
                }
            }

            let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(intent.patterns.len());
            for pattern in &intent.patterns {
                match embedder.embed(pattern).await {
                    Ok(v) => vectors.push(v),
                    Err(e) => {
                        warn!(tag = %intent.tag, pattern = %pattern, error = %e, "Failed to embed pattern");
                    }
                }
            }

            if vectors.is_empty() {
                error!(tag = %intent.tag, "All patterns failed to embed, excluding intent");
                continue;
            }

            let centroid = l2_normalize(mean(&vectors));
            debug!(tag = %intent.tag, patterns = vectors.len(), "Computed intent centroid");

            entries.push(CatalogEntry {
                tag: intent.tag,
                script: intent.script,
                flow: intent.flow.map(Arc::new),
                centroid,
            });
        }

        if entries.is_empty() {
            return Err(RemediError::NoIntentsLoaded);
        }

        Ok(Self {
            entries,
            dim: embedder.dim(),
        })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expected embedding dimensionality
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Look up an entry by tag
    pub fn get(&self, tag: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }
}

/// Element-wise mean of equal-length vectors
fn mean(vectors: &[Vec<f32>]) -> Vec<f32> {
    let dim = vectors.first().map_or(0, |v| v.len());
    let mut acc = vec![0.0f32; dim];
    let mut used = 0usize;

    for v in vectors {
        if v.len() != dim {
            warn!(expected = dim, got = v.len(), "Dropping mismatched embedding from centroid");
            continue;
        }
        for (slot, value) in acc.iter_mut().zip(v) {
            *slot += value;
        }
        used += 1;
    }

    if used > 0 {
        let n = used as f32;
        for slot in &mut acc {
            *slot /= n;
        }
    }

    acc
}

/// Scale a vector to unit length; zero vectors pass through unchanged
pub(crate) fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

/// Shared handle over the current catalog snapshot
///
/// Readers grab a cheap `Arc` snapshot; reloads replace the whole catalog
/// in one atomic swap. In-flight queries finish against the snapshot they
/// started with.
pub struct CatalogHandle {
    current: ArcSwap<IntentCatalog>,
}

impl CatalogHandle {
    pub fn new(catalog: IntentCatalog) -> Self {
        Self {
            current: ArcSwap::from_pointee(catalog),
        }
    }

    /// Current catalog snapshot
    pub fn snapshot(&self) -> Arc<IntentCatalog> {
        self.current.load_full()
    }

    /// Atomically replace the catalog
    pub fn replace(&self, catalog: IntentCatalog) {
        let len = catalog.len();
        self.current.store(Arc::new(catalog));
        info!(intents = len, "Swapped in new intent catalog");
    }
}
