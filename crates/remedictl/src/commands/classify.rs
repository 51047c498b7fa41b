use anyhow::{Context, Result};
use std::path::Path;

use remedi_core::{classify, CachedEmbedder, HashedNgramEmbedder, IntentCatalog};

/// Classify one query and print the best match
pub async fn execute(file: &str, query: &str, threshold: f32) -> Result<()> {
    let embedder = CachedEmbedder::new(HashedNgramEmbedder::default());
    let catalog = IntentCatalog::load(Path::new(file), &embedder)
        .await
        .with_context(|| format!("Failed to load catalog from {}", file))?;

    let result = classify(&catalog, &embedder, query).await?;

    println!("tag:        {}", result.tag);
    println!("confidence: {:.4}", result.confidence);
    println!(
        "verdict:    {}",
        if result.is_confident(threshold) {
            "match"
        } else {
            "below threshold"
        }
    );
    if let Some(script) = &result.script {
        println!("script:     {}", script.display());
    }
    if let Some(flow) = &result.flow {
        println!("flow:       {} steps", flow.len());
    }
    Ok(())
}
