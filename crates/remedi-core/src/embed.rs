// Remedi Core - Embedding abstraction
//
// The classifier only needs a text -> vector function. The trait keeps the
// actual model (remote API, ONNX runtime, whatever the deployment uses)
// behind an async seam; the engine never knows which one it got.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::{RemediError, RemediResult};

/// Text embedding provider
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text into a fixed-dimension vector
    async fn embed(&self, text: &str) -> RemediResult<Vec<f32>>;

    /// Output dimensionality of this embedder
    fn dim(&self) -> usize;
}

/// Memoizing wrapper around any embedder
///
/// Catalog patterns and repeated user queries hit the same strings often;
/// the cache makes those lookups free after the first call. Entries are
/// kept for the lifetime of the wrapper.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: DashMap<String, Vec<f32>>,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    /// Number of cached embeddings
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl<E: Embedder> Embedder for CachedEmbedder<E> {
    async fn embed(&self, text: &str) -> RemediResult<Vec<f32>> {
        if let Some(hit) = self.cache.get(text) {
            return Ok(hit.value().clone());
        }

        let vector = self.inner.embed(text).await?;
        self.cache.insert(text.to_string(), vector.clone());
        Ok(vector)
    }

    fn dim(&self) -> usize {
        self.inner.dim()
    }
}

/// Deterministic local embedder based on feature hashing
///
/// Hashes word tokens and character trigrams into a fixed-width count
/// vector. Not a semantic model; close enough for lexical similarity that
/// the CLI and tests run without any external service.
pub struct HashedNgramEmbedder {
    dim: usize,
}

pub const DEFAULT_HASH_DIM: usize = 256;

impl Default for HashedNgramEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIM)
    }
}

impl HashedNgramEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn bucket(&self, feature: &str) -> usize {
        // FNV-1a over the feature bytes
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in feature.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        (hash % self.dim as u64) as usize
    }
}

#[async_trait]
impl Embedder for HashedNgramEmbedder {
    async fn embed(&self, text: &str) -> RemediResult<Vec<f32>> {
        let normalized = text.to_lowercase();
        let mut vector = vec![0.0f32; self.dim];
        let mut seen = false;

        for token in normalized.split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            seen = true;
            vector[self.bucket(token)] += 1.0;

            let chars: Vec<char> = token.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                vector[self.bucket(&trigram)] += 1.0;
            }
        }

        if !seen {
            return Err(RemediError::embedding("cannot embed empty text"));
        }

        Ok(vector)
    }

    fn dim(&self) -> usize {
        self.dim
    }
}
