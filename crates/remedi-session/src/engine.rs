//! Guided flow engine.
//!
//! Renders flow questions, feeds answers through the session store, and
//! runs the terminal script once the last answer is in. Script execution
//! happens after the session has already been removed, so a slow script
//! never blocks other answers for the same user.

use std::sync::Arc;
use tracing::{info, warn};

use remedi_core::{ChatReply, FlowDefinition, RemediResult, ResponseGenerator, Step};
use remedi_exec::ScriptExecutor;

use crate::store::{Advance, SessionStore};

/// Drives guided flows from first question to terminal script
pub struct FlowEngine {
    store: Arc<SessionStore>,
    executor: Arc<ScriptExecutor>,
    generator: Arc<dyn ResponseGenerator>,
}

impl FlowEngine {
    pub fn new(
        store: Arc<SessionStore>,
        executor: Arc<ScriptExecutor>,
        generator: Arc<dyn ResponseGenerator>,
    ) -> Self {
        Self {
            store,
            executor,
            generator,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Start a flow and return its first question
    pub fn start_flow(
        &self,
        session_id: &str,
        flow: Arc<FlowDefinition>,
    ) -> RemediResult<ChatReply> {
        let first = self.store.start(session_id, flow)?;
        Ok(question_reply(&first, session_id))
    }

    /// Record an answer and either ask the next question or finish
    pub async fn continue_flow(&self, session_id: &str, answer: &str) -> RemediResult<ChatReply> {
        match self.store.advance(session_id, answer)? {
            Advance::Next(step) => Ok(question_reply(&step, session_id)),
            Advance::Terminal { script, answers } => {
                let Some(script) = script else {
                    info!(session_id, "Flow completed with no terminal script");
                    return Ok(ChatReply::action(
                        "All troubleshooting steps completed.",
                        session_id,
                    ));
                };

                match self.executor.run(&script, &answers).await {
                    Ok(output) => {
                        let response = match self.generator.humanize(&output).await {
                            Ok(text) => text,
                            Err(e) => {
                                warn!(session_id, error = %e, "Humanize failed, returning raw output");
                                output
                            }
                        };
                        Ok(ChatReply::action(response, session_id))
                    }
                    Err(e) => {
                        warn!(session_id, error = %e, "Terminal script failed");
                        Ok(ChatReply::error(
                            format!("Failed to execute resolution: {}", e),
                            session_id,
                        ))
                    }
                }
            }
        }
    }
}

/// Render a step as a flow question reply
fn question_reply(step: &Step, session_id: &str) -> ChatReply {
    let prompt = match &step.hint {
        Some(hint) => format!("## {}\n{}", step.question, hint),
        None => format!("## {}\n", step.question),
    };
    ChatReply::flow_question(prompt, step.options.clone(), session_id)
}
