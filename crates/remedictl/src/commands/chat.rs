use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use remedi_core::{
    CachedEmbedder, CatalogHandle, HashedNgramEmbedder, IntentCatalog, QueryMode, ReplyKind,
};
use remedi_dispatch::{Dispatcher, DispatcherConfig, NoKnowledgeBase, PassthroughGenerator};
use remedi_exec::{ExecConfig, ScriptExecutor};
use remedi_session::{SessionStore, SessionStoreConfig};

/// Line-oriented chat loop over stdin/stdout
pub async fn execute(file: &str, kb: bool, timeout: u64) -> Result<()> {
    let embedder = Arc::new(CachedEmbedder::new(HashedNgramEmbedder::default()));
    let catalog = IntentCatalog::load(Path::new(file), embedder.as_ref())
        .await
        .with_context(|| format!("Failed to load catalog from {}", file))?;

    let dispatcher = Dispatcher::new(
        Arc::new(CatalogHandle::new(catalog)),
        embedder,
        Arc::new(SessionStore::new(SessionStoreConfig::default())),
        Arc::new(ScriptExecutor::new(ExecConfig {
            timeout_secs: timeout,
            ..ExecConfig::default()
        })),
        Arc::new(NoKnowledgeBase),
        Arc::new(PassthroughGenerator),
        DispatcherConfig::default(),
    );

    let mode = if kb { QueryMode::Kb } else { QueryMode::Script };
    let session_id = Uuid::new_v4().to_string();
    println!("remedictl chat (session {}). Empty line quits.", session_id);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            break;
        }

        let reply = dispatcher.handle_query(message, Some(&session_id), mode).await;
        println!("[{}] {}", reply.kind, reply.response);
        if reply.kind == ReplyKind::FlowQuestion && !reply.options.is_empty() {
            println!("options: {}", reply.options.join(", "));
        }
    }

    Ok(())
}
