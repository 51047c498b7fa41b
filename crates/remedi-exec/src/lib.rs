//! Sandboxed remediation script execution.

pub mod executor;

pub use executor::{ExecConfig, ScriptExecutor, DEFAULT_MAX_CONCURRENT, DEFAULT_TIMEOUT_SECS};
