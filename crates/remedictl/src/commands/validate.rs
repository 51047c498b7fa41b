use anyhow::{Context, Result};
use std::path::Path;

use remedi_core::IntentFile;

/// Validate a catalog file and report per-record results
pub fn execute(file: &str) -> Result<()> {
    let path = Path::new(file);
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", file))?;

    let parsed: IntentFile = if path.extension().map_or(false, |e| e == "json") {
        serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", file))?
    } else {
        serde_yaml::from_str(&raw).with_context(|| format!("Invalid YAML in {}", file))?
    };

    let mut valid = 0usize;
    let mut skipped = 0usize;
    let mut seen: Vec<&str> = Vec::new();

    for intent in &parsed.intents {
        match intent.validate() {
            Ok(()) if seen.contains(&intent.tag.as_str()) => {
                skipped += 1;
                println!("SKIP  {} (duplicate tag)", intent.tag);
            }
            Ok(()) => {
                valid += 1;
                seen.push(&intent.tag);
                let action = if intent.flow.is_some() {
                    "flow"
                } else if intent.script.is_some() {
                    "script"
                } else {
                    "none"
                };
                println!("OK    {} ({} patterns, action: {})", intent.tag, intent.patterns.len(), action);

                if let Some(script) = &intent.script {
                    if !script.exists() {
                        println!("WARN  {} script missing: {}", intent.tag, script.display());
                    }
                }
            }
            Err(reason) => {
                skipped += 1;
                println!("SKIP  {} ({})", intent.tag, reason);
            }
        }
    }

    println!("\n{} valid, {} skipped", valid, skipped);
    if valid == 0 {
        anyhow::bail!("no usable intents in {}", file);
    }
    Ok(())
}
