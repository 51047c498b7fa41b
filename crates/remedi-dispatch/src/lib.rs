//! Query routing and reply composition.

pub mod collab;
pub mod dispatcher;

pub use collab::{NoKnowledgeBase, PassthroughGenerator};
pub use dispatcher::{Dispatcher, DispatcherConfig};
