//! Query dispatcher.
//!
//! One entry point, `handle_query`, that never fails: every path through
//! the engine ends in a structured `ChatReply`. Routing order is fixed:
//! knowledge mode first, then an active flow session, then fresh
//! classification.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use remedi_core::{
    classify, CatalogHandle, ChatReply, Embedder, KnowledgeBase, QueryMode, RemediError,
    RemediResult, ResponseGenerator, CONFIDENCE_THRESHOLD,
};
use remedi_exec::ScriptExecutor;
use remedi_session::{FlowEngine, SessionStore};

/// Fallback when the generator cannot compose a documentation answer
const GENERATOR_FALLBACK: &str =
    "I need to verify the documentation. Could you please rephrase your question?";

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Minimum classification confidence before an intent is acted on
    pub confidence_threshold: f32,

    /// Maximum knowledge base hits fed to the generator
    pub kb_result_limit: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: CONFIDENCE_THRESHOLD,
            kb_result_limit: 5,
        }
    }
}

/// Routes queries to remediation scripts, guided flows, or documentation
pub struct Dispatcher {
    catalog: Arc<CatalogHandle>,
    embedder: Arc<dyn Embedder>,
    store: Arc<SessionStore>,
    engine: FlowEngine,
    executor: Arc<ScriptExecutor>,
    kb: Arc<dyn KnowledgeBase>,
    generator: Arc<dyn ResponseGenerator>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(
        catalog: Arc<CatalogHandle>,
        embedder: Arc<dyn Embedder>,
        store: Arc<SessionStore>,
        executor: Arc<ScriptExecutor>,
        kb: Arc<dyn KnowledgeBase>,
        generator: Arc<dyn ResponseGenerator>,
        config: DispatcherConfig,
    ) -> Self {
        let engine = FlowEngine::new(
            Arc::clone(&store),
            Arc::clone(&executor),
            Arc::clone(&generator),
        );
        Self {
            catalog,
            embedder,
            store,
            engine,
            executor,
            kb,
            generator,
            config,
        }
    }

    pub fn catalog(&self) -> &Arc<CatalogHandle> {
        &self.catalog
    }

    /// Handle one user query
    ///
    /// A missing session id is replaced with a fresh UUID and echoed back
    /// in the reply. Internal failures are logged and converted to a
    /// generic error reply; detail never reaches the caller.
    pub async fn handle_query(
        &self,
        message: &str,
        session_id: Option<&str>,
        mode: QueryMode,
    ) -> ChatReply {
        let session_id = match session_id {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        match self.dispatch(message, &session_id, mode).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(%session_id, error = %e, "Dispatch failed");
                let response = match self.generator.humanize("System error occurred").await {
                    Ok(text) => text,
                    Err(_) => "System error occurred".to_string(),
                };
                ChatReply::error(response, session_id)
            }
        }
    }

    async fn dispatch(
        &self,
        message: &str,
        session_id: &str,
        mode: QueryMode,
    ) -> RemediResult<ChatReply> {
        if mode == QueryMode::Kb {
            return self.answer_from_knowledge(message, session_id).await;
        }

        if self.store.contains(session_id) {
            return match self.engine.continue_flow(session_id, message).await {
                Ok(reply) => Ok(reply),
                Err(RemediError::ExpiredSession(_)) => Ok(ChatReply::error(
                    "Session expired. Please start over.",
                    session_id,
                )),
                Err(e) => Err(e),
            };
        }

        let catalog = self.catalog.snapshot();
        let matched = classify(&catalog, self.embedder.as_ref(), message).await?;
        debug!(
            session_id,
            tag = %matched.tag,
            confidence = matched.confidence,
            "Classified query"
        );

        if !matched.is_confident(self.config.confidence_threshold) {
            return Ok(ChatReply::clarify(
                "Could not determine intent. Please provide more details.",
                session_id,
            ));
        }

        if let Some(flow) = matched.flow {
            info!(session_id, tag = %matched.tag, "Starting guided flow");
            return self.engine.start_flow(session_id, flow);
        }

        if let Some(script) = matched.script {
            info!(session_id, tag = %matched.tag, "Running remediation script");
            return match self.executor.run(&script, &HashMap::new()).await {
                Ok(output) => Ok(ChatReply::action(
                    format!("{}:\n{}", matched.tag, output),
                    session_id,
                )),
                Err(
                    e @ (RemediError::ScriptNotFound(_)
                    | RemediError::ScriptTimeout(_)
                    | RemediError::ScriptFailure { .. }),
                ) => {
                    warn!(session_id, tag = %matched.tag, error = %e, "Remediation script failed");
                    Ok(ChatReply::error(
                        format!("Remediation failed: {}", e),
                        session_id,
                    ))
                }
                Err(e) => Err(e),
            };
        }

        Ok(ChatReply::clarify(
            "I need more information to resolve this issue.",
            session_id,
        ))
    }

    async fn answer_from_knowledge(
        &self,
        message: &str,
        session_id: &str,
    ) -> RemediResult<ChatReply> {
        let hits = self.kb.search(message, self.config.kb_result_limit).await?;
        if hits.is_empty() {
            return Ok(ChatReply::knowledge(
                "No relevant documentation found. Try rephrasing.",
                session_id,
            ));
        }

        let response = match self.generator.enhance(message, &hits).await {
            Ok(text) => text,
            Err(e) => {
                warn!(session_id, error = %e, "Generator failed to compose answer");
                GENERATOR_FALLBACK.to_string()
            }
        };
        Ok(ChatReply::knowledge(response, session_id))
    }
}
