use clap::{Parser, Subcommand};

/// Remedi CLI - catalog validation, classification, and a local chat loop
#[derive(Parser, Debug)]
#[command(name = "remedictl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Intent catalog file (JSON or YAML)
    #[arg(long, short = 'f', global = true, env = "REMEDI_INTENTS", default_value = "intents.yaml")]
    pub file: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate an intent catalog and report skipped records
    Validate,

    /// Classify a single query against the catalog
    Classify {
        /// Query text to classify
        query: String,

        /// Confidence threshold for a confident match
        #[arg(long, default_value_t = remedi_core::CONFIDENCE_THRESHOLD)]
        threshold: f32,
    },

    /// Interactive chat loop through the full dispatcher
    Chat {
        /// Handle queries in knowledge base mode
        #[arg(long)]
        kb: bool,

        /// Script timeout in seconds
        #[arg(long, default_value_t = remedi_exec::DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },
}
