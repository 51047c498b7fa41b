//! In-memory session store.
//!
//! Sessions track where a user is inside a guided flow. The map is sharded
//! (DashMap), and every state transition for a session happens under that
//! session's entry guard with no awaits held across it, so two concurrent
//! answers for the same session serialize instead of racing.

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use remedi_core::{FlowDefinition, RemediError, RemediResult, Step};

/// Default idle lifetime of a session
pub const DEFAULT_SESSION_TTL_MINS: i64 = 30;

/// Session store configuration
#[derive(Debug, Clone)]
pub struct SessionStoreConfig {
    /// Idle time after which a session expires
    pub ttl: Duration,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINS),
        }
    }
}

/// One user's position in a guided flow
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub flow: Arc<FlowDefinition>,
    pub step: usize,
    pub answers: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_active > ttl
    }
}

/// Outcome of advancing a session by one answer
#[derive(Debug)]
pub enum Advance {
    /// The flow has another question
    Next(Step),
    /// The flow is complete; the session is already gone
    Terminal {
        script: Option<PathBuf>,
        answers: HashMap<String, String>,
    },
}

/// Concurrent session map with TTL expiry
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionStoreConfig::default())
    }
}

impl SessionStore {
    pub fn new(config: SessionStoreConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: config.ttl,
        }
    }

    /// Whether a live (unexpired) session exists for this id
    pub fn contains(&self, session_id: &str) -> bool {
        let now = Utc::now();
        self.sessions
            .get(session_id)
            .map_or(false, |s| !s.is_expired(self.ttl, now))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Begin a flow for a session and return its first step
    ///
    /// Replaces any previous session under the same id.
    pub fn start(&self, session_id: &str, flow: Arc<FlowDefinition>) -> RemediResult<Step> {
        let first = flow
            .step(0)
            .cloned()
            .ok_or_else(|| RemediError::validation("flow has no steps"))?;

        let now = Utc::now();
        let previous = self.sessions.insert(
            session_id.to_string(),
            Session {
                id: session_id.to_string(),
                flow,
                step: 0,
                answers: HashMap::new(),
                created_at: now,
                last_active: now,
            },
        );
        if previous.is_some() {
            debug!(session_id, "Restarted flow over an existing session");
        }

        info!(session_id, "Started flow session");
        Ok(first)
    }

    /// Record an answer for the current step and advance
    ///
    /// The whole transition runs under the session's entry guard. On the
    /// terminal step the session is removed before the guard drops, so a
    /// concurrent duplicate answer sees an expired session rather than a
    /// second execution.
    pub fn advance(&self, session_id: &str, answer: &str) -> RemediResult<Advance> {
        let now = Utc::now();

        let entry = match self.sessions.entry(session_id.to_string()) {
            Entry::Occupied(entry) => entry,
            Entry::Vacant(_) => {
                return Err(RemediError::ExpiredSession(session_id.to_string()));
            }
        };

        if entry.get().is_expired(self.ttl, now) {
            entry.remove();
            warn!(session_id, "Session expired mid-flow");
            return Err(RemediError::ExpiredSession(session_id.to_string()));
        }

        let mut entry = entry;
        let session = entry.get_mut();
        session.last_active = now;

        let current = session.step;
        let key = match session.flow.step(current) {
            Some(step) => step.key.clone(),
            None => {
                // index ran past the flow, drop the broken session
                entry.remove();
                return Err(RemediError::ExpiredSession(session_id.to_string()));
            }
        };
        session.answers.insert(key, answer.trim().to_string());

        match session.flow.step(current + 1) {
            Some(next) => {
                session.step = current + 1;
                debug!(session_id, step = session.step, "Advanced flow session");
                Ok(Advance::Next(next.clone()))
            }
            None => {
                let session = entry.remove();
                info!(session_id, "Flow session completed");
                Ok(Advance::Terminal {
                    script: session.flow.terminal_script().cloned(),
                    answers: session.answers,
                })
            }
        }
    }

    /// Drop every expired session, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired(self.ttl, now));
        let removed = before - self.sessions.len();
        if removed > 0 {
            debug!(removed, "Purged expired sessions");
        }
        removed
    }

    /// Spawn a background task that purges expired sessions periodically
    pub fn spawn_sweeper(self: Arc<Self>, every: std::time::Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                self.purge_expired();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_step_flow() -> Arc<FlowDefinition> {
        Arc::new(FlowDefinition {
            steps: vec![
                Step {
                    question: "Which office are you connecting from?".to_string(),
                    hint: None,
                    options: vec!["berlin".to_string(), "london".to_string()],
                    key: "office".to_string(),
                    script: None,
                },
                Step {
                    question: "What is your employee id?".to_string(),
                    hint: Some("Printed on the back of your badge".to_string()),
                    options: vec![],
                    key: "employee_id".to_string(),
                    script: Some(PathBuf::from("/opt/remedi/scripts/provision_vpn.sh")),
                },
            ],
        })
    }

    #[test]
    fn test_start_returns_first_step() {
        let store = SessionStore::default();
        let step = store.start("sess-1", two_step_flow()).unwrap();
        assert_eq!(step.key, "office");
        assert!(store.contains("sess-1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_advance_walks_to_terminal() {
        let store = SessionStore::default();
        store.start("sess-1", two_step_flow()).unwrap();

        match store.advance("sess-1", "berlin").unwrap() {
            Advance::Next(step) => assert_eq!(step.key, "employee_id"),
            other => panic!("expected Next, got {:?}", other),
        }

        match store.advance("sess-1", "E-1042").unwrap() {
            Advance::Terminal { script, answers } => {
                assert_eq!(
                    script.as_deref(),
                    Some(std::path::Path::new("/opt/remedi/scripts/provision_vpn.sh"))
                );
                assert_eq!(answers["office"], "berlin");
                assert_eq!(answers["employee_id"], "E-1042");
            }
            other => panic!("expected Terminal, got {:?}", other),
        }

        // terminal removal is unconditional
        assert!(!store.contains("sess-1"));
        assert!(store.advance("sess-1", "again").is_err());
    }

    #[test]
    fn test_answers_are_trimmed() {
        let store = SessionStore::default();
        store.start("sess-1", two_step_flow()).unwrap();
        store.advance("sess-1", "  berlin \n").unwrap();
        match store.advance("sess-1", "E-1").unwrap() {
            Advance::Terminal { answers, .. } => assert_eq!(answers["office"], "berlin"),
            other => panic!("expected Terminal, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_session_is_expired() {
        let store = SessionStore::default();
        let err = store.advance("nope", "answer").unwrap_err();
        assert!(matches!(err, RemediError::ExpiredSession(_)));
    }

    #[test]
    fn test_ttl_expiry_removes_session() {
        let store = SessionStore::new(SessionStoreConfig {
            ttl: Duration::minutes(-1),
        });
        store.start("sess-1", two_step_flow()).unwrap();

        assert!(!store.contains("sess-1"));
        let err = store.advance("sess-1", "berlin").unwrap_err();
        assert!(matches!(err, RemediError::ExpiredSession(_)));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_purge_expired_sweeps() {
        let store = SessionStore::new(SessionStoreConfig {
            ttl: Duration::minutes(-1),
        });
        store.start("a", two_step_flow()).unwrap();
        store.start("b", two_step_flow()).unwrap();
        assert_eq!(store.purge_expired(), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_sweeper_purges_in_background() {
        let store = Arc::new(SessionStore::new(SessionStoreConfig {
            ttl: Duration::milliseconds(0),
        }));
        store.start("a", two_step_flow()).unwrap();

        let handle = Arc::clone(&store).spawn_sweeper(std::time::Duration::from_millis(10));
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert!(store.is_empty());
        handle.abort();
    }

    #[test]
    fn test_restart_replaces_session() {
        let store = SessionStore::default();
        store.start("sess-1", two_step_flow()).unwrap();
        store.advance("sess-1", "berlin").unwrap();

        // starting again resets to step zero
        store.start("sess-1", two_step_flow()).unwrap();
        match store.advance("sess-1", "london").unwrap() {
            Advance::Next(step) => assert_eq!(step.key, "employee_id"),
            other => panic!("expected Next, got {:?}", other),
        }
    }
}
