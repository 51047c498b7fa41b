//! Remediation script execution.
//!
//! Scripts run as real subprocesses with captured output, a wall-clock
//! timeout, and a cap on how many may run at once. Parameters collected by
//! flows are passed as argv pairs and environment variables, never through
//! a shell.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use remedi_core::{RemediError, RemediResult};

/// Wall-clock limit for a single script run
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Upper bound on concurrently running scripts
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Executor configuration
#[derive(Debug, Clone)]
pub struct ExecConfig {
    /// Seconds before a running script is killed
    pub timeout_secs: u64,

    /// Maximum scripts running at the same time
    pub max_concurrent: usize,

    /// Optional interpreter prepended to the script path (e.g. "python3")
    pub interpreter: Option<String>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            interpreter: None,
        }
    }
}

/// Runs remediation scripts with timeout and concurrency bounds
pub struct ScriptExecutor {
    config: ExecConfig,
    permits: Semaphore,
}

impl Default for ScriptExecutor {
    fn default() -> Self {
        Self::new(ExecConfig::default())
    }
}

impl ScriptExecutor {
    pub fn new(config: ExecConfig) -> Self {
        let permits = Semaphore::new(config.max_concurrent.max(1));
        Self { config, permits }
    }

    /// Run a script to completion and return its stdout
    ///
    /// The script path is checked before anything is spawned; a missing
    /// script is an error with no side effects. Parameters become
    /// `--key value` argv pairs in sorted key order plus
    /// `REMEDI_PARAM_<KEY>` environment variables.
    pub async fn run(
        &self,
        script: &Path,
        params: &HashMap<String, String>,
    ) -> RemediResult<String> {
        let script = absolutize(script)?;
        if !script.exists() {
            return Err(RemediError::ScriptNotFound(script));
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| RemediError::dispatch(format!("executor shut down: {}", e)))?;

        let mut cmd = match &self.config.interpreter {
            Some(interpreter) => {
                let mut c = Command::new(interpreter);
                c.arg(&script);
                c
            }
            None => Command::new(&script),
        };

        let mut keys: Vec<&String> = params.keys().collect();
        keys.sort();
        for key in keys {
            if let Some(value) = params.get(key) {
                cmd.arg(format!("--{}", key));
                cmd.arg(value);
                cmd.env(env_name(key), value);
            }
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // No orphans on timeout or caller cancellation
        cmd.kill_on_drop(true);

        debug!(script = %script.display(), params = params.len(), "Spawning remediation script");
        let child = cmd.spawn()?;

        let output = match tokio::time::timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    script = %script.display(),
                    timeout_secs = self.config.timeout_secs,
                    "Script timed out and was killed"
                );
                return Err(RemediError::ScriptTimeout(self.config.timeout_secs));
            }
        };

        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(script = %script.display(), exit_code, "Script exited non-zero");
            return Err(RemediError::ScriptFailure { exit_code, stderr });
        }

        info!(script = %script.display(), "Script completed");
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            Ok("Script executed successfully".to_string())
        } else {
            Ok(stdout)
        }
    }
}

fn absolutize(path: &Path) -> RemediResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn env_name(key: &str) -> String {
    let sanitized: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("REMEDI_PARAM_{}", sanitized)
}
