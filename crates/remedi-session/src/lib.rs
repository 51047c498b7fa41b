//! Session state and guided flow execution.

pub mod engine;
pub mod store;

pub use engine::FlowEngine;
pub use store::{
    Advance, Session, SessionStore, SessionStoreConfig, DEFAULT_SESSION_TTL_MINS,
};
