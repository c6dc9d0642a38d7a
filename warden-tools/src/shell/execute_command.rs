use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use warden_core::permission::{PermissionBroker, PermissionDecision};

use crate::prelude::*;
use crate::shell::policy;

/// Default wall-clock limit for a spawned command
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Input for executing a shell command
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteCommandInput {
    /// The shell command to execute
    pub command: String,

    /// Working directory for the command (relative to the agent's working
    /// directory or absolute). Defaults to the working directory.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

/// Tool for running shell commands under the containment policy.
///
/// Order of checks: allow-list (skips the prompt), approval prompt,
/// unconditional deny-list scan, working-directory containment. Only then
/// does anything spawn. The spawn counter exists so tests can assert a
/// rejected command never forked.
pub struct ExecuteCommandTool {
    broker: Arc<PermissionBroker>,
    timeout: Duration,
    cancel: CancellationToken,
    spawns: AtomicU64,
}

impl ExecuteCommandTool {
    pub fn new(broker: Arc<PermissionBroker>) -> Self {
        Self {
            broker,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cancel: CancellationToken::new(),
            spawns: AtomicU64::new(0),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// How many processes this instance has spawned
    pub fn spawn_count(&self) -> u64 {
        self.spawns.load(Ordering::SeqCst)
    }
}

impl Tool for ExecuteCommandTool {
    type Input = ExecuteCommandInput;

    fn name(&self) -> &str {
        "execute_command"
    }

    fn description(&self) -> &str {
        "Execute a shell command inside the working directory. Common development \
         commands run directly; anything else requires approval. Destructive patterns \
         are always refused."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolOutput, ToolError> {
        let command = input.command.trim();
        if command.is_empty() {
            return Err(ToolError::Custom("No command provided".to_string()));
        }

        if !policy::is_allowed(command) {
            let decision = self
                .broker
                .request(
                    "Execute bash command",
                    &self.broker.working_dir(),
                    Some(command.to_string()),
                )
                .await;
            if decision == PermissionDecision::Denied {
                return Err(ToolError::PermissionDenied(format!(
                    "'{}' is not an approved command",
                    policy::base_command(command)
                )));
            }
        }

        // Deny-list scan happens after approval and before spawn, always.
        if let Some(pattern) = policy::find_denied_pattern(command) {
            return Err(ToolError::SecurityRejection(pattern.to_string()));
        }

        // Unlike file targets, an out-of-tree working directory fails
        // instead of being rebased into the tree.
        let requested_cwd = input.working_dir.as_deref().unwrap_or(std::path::Path::new(""));
        let cwd = self.broker.canonicalize_strict(requested_cwd).map_err(|resolved| {
            ToolError::PathValidation(format!(
                "Working directory {} is outside the working tree",
                resolved.display()
            ))
        })?;
        if !cwd.is_dir() {
            return Err(ToolError::Custom(format!(
                "Working directory {} does not exist",
                cwd.display()
            )));
        }

        self.spawns.fetch_add(1, Ordering::SeqCst);
        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(&cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // wait_with_output drains both pipes while waiting, so a chatty
        // child cannot deadlock on a full pipe buffer. The abort arms drop
        // the pinned future, and kill_on_drop reaps the process.
        let output_fut = child.wait_with_output();
        tokio::pin!(output_fut);
        let output = tokio::select! {
            _ = self.cancel.cancelled() => {
                return Err(ToolError::Custom("Command cancelled".to_string()));
            }
            _ = tokio::time::sleep(self.timeout) => {
                return Err(ToolError::Timeout(self.timeout.as_secs()));
            }
            result = &mut output_fut => result?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            let mut text = stdout;
            if !stderr.trim().is_empty() {
                text.push_str("\n[stderr]\n");
                text.push_str(&stderr);
            }
            Ok(ToolOutput::text(text))
        } else {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            Err(ToolError::Custom(format!(
                "Command exited with status {code}\n{stdout}\n{stderr}"
            )))
        }
    }
}
