// Remedi Core - Foundation types and intent classification for Remedi
//
// This crate provides the shared building blocks of the dispatch engine:
// the error taxonomy, intent and flow definitions, the embedding seam,
// catalog loading with precomputed centroids, and the classifier.

pub mod catalog;
pub mod classify;
pub mod embed;
pub mod error;
pub mod intent;
pub mod knowledge;
pub mod reply;

// Re-export core types
pub use catalog::{CatalogEntry, CatalogHandle, IntentCatalog};
pub use classify::{classify, Classification, CONFIDENCE_THRESHOLD};
pub use embed::{CachedEmbedder, Embedder, HashedNgramEmbedder, DEFAULT_HASH_DIM};
pub use error::{RemediError, RemediResult};
pub use intent::{FlowDefinition, Intent, IntentFile, Step};
pub use knowledge::{KnowledgeBase, ResponseGenerator, SearchHit};
pub use reply::{ChatReply, QueryMode, ReplyKind};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
