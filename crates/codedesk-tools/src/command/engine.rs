//! Command execution engine: an in-memory registry of shell invocations
//! gated by a human approval step.
//!
//! Every command starts `pending` and goes nowhere until the host explicitly
//! approves or rejects it. Approval spawns the command through a platform
//! shell, streams ANSI-stripped output to subscribers, scans the output tail
//! for interactive prompts, and resolves once the process exits. The engine
//! is an owned instance; embedders create one per sandboxed session.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tokio::sync::{mpsc, Mutex, Notify};

use crate::command::ansi::strip_ansi;
use crate::command::prompt::PromptRules;
use crate::sandbox::resolve_workspace_path;

/// Lifecycle of one tracked shell invocation.
///
/// `pending -> {approved -> running -> {completed, failed}, rejected}`,
/// plus `running -> terminated` on an external kill. Terminal states are
/// never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Pending,
    Approved,
    Rejected,
    Running,
    Completed,
    Failed,
    Terminated,
}

impl CommandStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CommandStatus::Completed
                | CommandStatus::Failed
                | CommandStatus::Rejected
                | CommandStatus::Terminated
        )
    }
}

/// Event stream payload for one execution's subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
    /// A stripped output chunk, in stream order, flagged by source stream.
    Output { chunk: String, stderr: bool },
    /// The output tail looks like the process is blocked awaiting input.
    InputRequired { prompt: String },
    /// The execution reached a terminal state.
    Exited {
        status: CommandStatus,
        exit_code: Option<i32>,
    },
}

/// Read-only view of an execution, safe to hand to the UI layer.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionSnapshot {
    pub id: String,
    pub command: String,
    pub cwd: PathBuf,
    pub status: CommandStatus,
    pub output: String,
    pub exit_code: Option<i32>,
    pub requires_input: bool,
    pub input_prompt: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Elapsed run time; still ticking when the command is running.
    pub duration_ms: Option<i64>,
}

/// Final result handed back to whoever awaited the approval.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    pub id: String,
    pub success: bool,
    pub status: CommandStatus,
    pub exit_code: Option<i32>,
    pub output: String,
    pub duration_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Command '{0}' not found")]
    NotFound(String),

    #[error("Command '{0}' is not pending approval")]
    NotPending(String),

    #[error("Command '{0}' is not running")]
    NotRunning(String),

    #[error("Working directory is outside project directory")]
    CwdOutsideProject,

    #[error("Command '{0}' has no attached input stream")]
    StdinUnavailable(String),

    #[error("Failed to write input to command '{0}': {1}")]
    StdinWrite(String, String),
}

struct ExecutionState {
    status: CommandStatus,
    output: String,
    exit_code: Option<i32>,
    requires_input: bool,
    input_prompt: Option<String>,
    /// Last prompt text already announced, so re-scanning the same
    /// unresolved prompt does not re-emit.
    last_emitted_prompt: Option<String>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

struct CommandExecution {
    id: String,
    command: String,
    cwd: PathBuf,
    created_at: DateTime<Utc>,
    state: Mutex<ExecutionState>,
    stdin: Mutex<Option<ChildStdin>>,
    kill_signal: Notify,
    listeners: Mutex<Vec<mpsc::UnboundedSender<ExecutionEvent>>>,
}

impl CommandExecution {
    fn new(id: String, command: String, cwd: PathBuf) -> Self {
        Self {
            id,
            command,
            cwd,
            created_at: Utc::now(),
            state: Mutex::new(ExecutionState {
                status: CommandStatus::Pending,
                output: String::new(),
                exit_code: None,
                requires_input: false,
                input_prompt: None,
                last_emitted_prompt: None,
                started_at: None,
                ended_at: None,
            }),
            stdin: Mutex::new(None),
            kill_signal: Notify::new(),
            listeners: Mutex::new(Vec::new()),
        }
    }

    async fn broadcast(&self, event: ExecutionEvent) {
        let mut listeners = self.listeners.lock().await;
        listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }

    async fn append_chunk(&self, chunk: &str, stderr: bool, rules: &PromptRules) {
        let detected = {
            let mut state = self.state.lock().await;
            state.output.push_str(chunk);
            if stderr {
                None
            } else {
                match rules.detect(&state.output) {
                    Some(prompt)
                        if state.last_emitted_prompt.as_deref() != Some(prompt.as_str()) =>
                    {
                        state.requires_input = true;
                        state.input_prompt = Some(prompt.clone());
                        state.last_emitted_prompt = Some(prompt.clone());
                        Some(prompt)
                    }
                    _ => None,
                }
            }
        };

        self.broadcast(ExecutionEvent::Output {
            chunk: chunk.to_string(),
            stderr,
        })
        .await;

        if let Some(prompt) = detected {
            log::debug!("command '{}' appears to be awaiting input: {}", self.id, prompt);
            self.broadcast(ExecutionEvent::InputRequired { prompt }).await;
        }
    }

    async fn snapshot(&self) -> ExecutionSnapshot {
        let state = self.state.lock().await;
        let duration_ms = state.started_at.map(|started| {
            let end = state.ended_at.unwrap_or_else(Utc::now);
            (end - started).num_milliseconds()
        });
        ExecutionSnapshot {
            id: self.id.clone(),
            command: self.command.clone(),
            cwd: self.cwd.clone(),
            status: state.status,
            output: state.output.clone(),
            exit_code: state.exit_code,
            requires_input: state.requires_input,
            input_prompt: state.input_prompt.clone(),
            created_at: self.created_at,
            started_at: state.started_at,
            ended_at: state.ended_at,
            duration_ms,
        }
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

async fn pump_stream<R>(
    exec: Arc<CommandExecution>,
    mut reader: R,
    stderr: bool,
    rules: Arc<PromptRules>,
) where
    R: AsyncRead + Unpin,
{
    // Raw chunk reads, not lines: an interactive prompt usually arrives
    // without a trailing newline.
    let mut buf = [0u8; 4096];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let chunk = strip_ansi(&String::from_utf8_lossy(&buf[..n]));
                if !chunk.is_empty() {
                    exec.append_chunk(&chunk, stderr, &rules).await;
                }
            }
        }
    }
}

/// Registry and state machine for tracked shell commands.
pub struct CommandEngine {
    executions: DashMap<String, Arc<CommandExecution>>,
    rules: Arc<PromptRules>,
}

impl Default for CommandEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandEngine {
    pub fn new() -> Self {
        Self::with_rules(PromptRules::default())
    }

    /// Engine with a custom prompt-detection rule set.
    pub fn with_rules(rules: PromptRules) -> Self {
        Self {
            executions: DashMap::new(),
            rules: Arc::new(rules),
        }
    }

    fn get(&self, id: &str) -> Result<Arc<CommandExecution>, CommandError> {
        self.executions
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| CommandError::NotFound(id.to_string()))
    }

    /// Registers a command without executing it.
    ///
    /// The working directory defaults to the project root and is
    /// sandbox-checked either way. The command content itself is not
    /// constrained; the approval gate is the control.
    pub async fn prepare(
        &self,
        command: &str,
        project_root: &Path,
        cwd: Option<&str>,
    ) -> Result<ExecutionSnapshot, CommandError> {
        let cwd = resolve_workspace_path(cwd.unwrap_or("."), project_root)
            .ok_or(CommandError::CwdOutsideProject)?;

        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let id = format!("cmd_{}_{}", Utc::now().timestamp_millis(), &suffix[..8]);

        let exec = Arc::new(CommandExecution::new(id.clone(), command.to_string(), cwd));
        let snapshot = exec.snapshot().await;
        self.executions.insert(id.clone(), exec);
        log::info!("command '{}' registered pending approval: {}", id, command);
        Ok(snapshot)
    }

    /// Approves a pending command and runs it to completion.
    ///
    /// Suspends until the process exits, is terminated, or fails to spawn;
    /// other engine operations remain servable while this is in flight.
    pub async fn approve(&self, id: &str) -> Result<CommandOutcome, CommandError> {
        let exec = self.get(id)?;

        {
            let mut state = exec.state.lock().await;
            if state.status != CommandStatus::Pending {
                return Err(CommandError::NotPending(id.to_string()));
            }
            state.status = CommandStatus::Approved;
        }

        let mut cmd = shell_command(&exec.command);
        cmd.current_dir(&exec.cwd)
            .env("TERM", "dumb")
            .env("NO_COLOR", "1")
            .env("CLICOLOR", "0")
            .env("CLICOLOR_FORCE", "0")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                let message = format!("Failed to start shell: {e}");
                log::warn!("command '{}' spawn error: {e}", exec.id);
                let output = {
                    let mut state = exec.state.lock().await;
                    state.status = CommandStatus::Failed;
                    state.output.push_str(&message);
                    let now = Utc::now();
                    state.started_at = Some(now);
                    state.ended_at = Some(now);
                    state.output.clone()
                };
                exec.broadcast(ExecutionEvent::Exited {
                    status: CommandStatus::Failed,
                    exit_code: None,
                })
                .await;
                return Ok(CommandOutcome {
                    id: exec.id.clone(),
                    success: false,
                    status: CommandStatus::Failed,
                    exit_code: None,
                    output,
                    duration_ms: 0,
                    error: Some(message),
                });
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        *exec.stdin.lock().await = child.stdin.take();

        {
            let mut state = exec.state.lock().await;
            state.status = CommandStatus::Running;
            state.started_at = Some(Utc::now());
        }
        log::info!("command '{}' running: {}", exec.id, exec.command);

        let mut pumps = Vec::new();
        if let Some(stream) = stdout {
            pumps.push(tokio::spawn(pump_stream(
                Arc::clone(&exec),
                stream,
                false,
                Arc::clone(&self.rules),
            )));
        }
        if let Some(stream) = stderr {
            pumps.push(tokio::spawn(pump_stream(
                Arc::clone(&exec),
                stream,
                true,
                Arc::clone(&self.rules),
            )));
        }

        let exit_status = tokio::select! {
            status = child.wait() => status.ok(),
            _ = exec.kill_signal.notified() => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                None
            }
        };

        // Let the readers drain whatever the child flushed before exiting.
        for pump in pumps {
            let _ = pump.await;
        }
        *exec.stdin.lock().await = None;

        let outcome = {
            let mut state = exec.state.lock().await;
            state.requires_input = false;
            state.input_prompt = None;

            if state.status == CommandStatus::Running {
                let code = exit_status.and_then(|status| status.code());
                state.exit_code = code;
                state.status = if code == Some(0) {
                    CommandStatus::Completed
                } else {
                    CommandStatus::Failed
                };
                state.ended_at = Some(Utc::now());
            }

            let started = state.started_at.unwrap_or(exec.created_at);
            let ended = state.ended_at.unwrap_or_else(Utc::now);
            let error = match state.status {
                CommandStatus::Completed => None,
                CommandStatus::Terminated => Some("Command terminated".to_string()),
                _ => Some(match state.exit_code {
                    Some(code) => format!("Command exited with code {code}"),
                    None => "Command did not exit normally".to_string(),
                }),
            };

            CommandOutcome {
                id: exec.id.clone(),
                success: state.status == CommandStatus::Completed,
                status: state.status,
                exit_code: state.exit_code,
                output: state.output.clone(),
                duration_ms: (ended - started).num_milliseconds(),
                error,
            }
        };

        log::info!(
            "command '{}' finished: {:?} (exit code {:?})",
            exec.id,
            outcome.status,
            outcome.exit_code
        );
        exec.broadcast(ExecutionEvent::Exited {
            status: outcome.status,
            exit_code: outcome.exit_code,
        })
        .await;
        Ok(outcome)
    }

    /// Rejects a pending command; nothing is spawned.
    pub async fn reject(&self, id: &str) -> Result<ExecutionSnapshot, CommandError> {
        let exec = self.get(id)?;
        {
            let mut state = exec.state.lock().await;
            if state.status != CommandStatus::Pending {
                return Err(CommandError::NotPending(id.to_string()));
            }
            state.status = CommandStatus::Rejected;
            state.ended_at = Some(Utc::now());
        }
        log::info!("command '{}' rejected", id);
        Ok(exec.snapshot().await)
    }

    /// Writes a line of input to a running command's stdin.
    ///
    /// Clears the input-required flag optimistically; the next output chunk
    /// re-detects if the input did not resolve the prompt.
    pub async fn send_input(&self, id: &str, input: &str) -> Result<(), CommandError> {
        let exec = self.get(id)?;
        {
            let state = exec.state.lock().await;
            if state.status != CommandStatus::Running {
                return Err(CommandError::NotRunning(id.to_string()));
            }
        }

        let mut stdin_guard = exec.stdin.lock().await;
        let stdin = stdin_guard
            .as_mut()
            .ok_or_else(|| CommandError::StdinUnavailable(id.to_string()))?;

        let mut payload = input.to_string();
        if !payload.ends_with('\n') {
            payload.push('\n');
        }
        stdin
            .write_all(payload.as_bytes())
            .await
            .map_err(|e| CommandError::StdinWrite(id.to_string(), e.to_string()))?;
        stdin
            .flush()
            .await
            .map_err(|e| CommandError::StdinWrite(id.to_string(), e.to_string()))?;
        drop(stdin_guard);

        let mut state = exec.state.lock().await;
        state.requires_input = false;
        state.input_prompt = None;
        state.last_emitted_prompt = None;
        Ok(())
    }

    /// Best-effort kill of a running command.
    pub async fn terminate(&self, id: &str) -> Result<ExecutionSnapshot, CommandError> {
        let exec = self.get(id)?;
        {
            let mut state = exec.state.lock().await;
            if state.status != CommandStatus::Running {
                return Err(CommandError::NotRunning(id.to_string()));
            }
            state.status = CommandStatus::Terminated;
            state.ended_at = Some(Utc::now());
            state.requires_input = false;
            state.input_prompt = None;
        }
        exec.kill_signal.notify_one();
        log::info!("command '{}' terminated by request", id);
        Ok(exec.snapshot().await)
    }

    /// Read-only status snapshot.
    pub async fn status(&self, id: &str) -> Result<ExecutionSnapshot, CommandError> {
        Ok(self.get(id)?.snapshot().await)
    }

    /// Subscribes to one execution's event stream. Dropping the receiver
    /// unsubscribes.
    pub async fn subscribe(
        &self,
        id: &str,
    ) -> Result<mpsc::UnboundedReceiver<ExecutionEvent>, CommandError> {
        let exec = self.get(id)?;
        let (tx, rx) = mpsc::unbounded_channel();
        exec.listeners.lock().await.push(tx);
        Ok(rx)
    }

    /// Snapshots of every tracked execution, oldest first.
    pub async fn list(&self) -> Vec<ExecutionSnapshot> {
        let execs: Vec<Arc<CommandExecution>> = self
            .executions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut snapshots = Vec::with_capacity(execs.len());
        for exec in execs {
            snapshots.push(exec.snapshot().await);
        }
        snapshots.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        snapshots
    }

    /// Removes every execution in a terminal state; returns how many.
    ///
    /// This is the only reclamation path: entries accumulate until the host
    /// sweeps them.
    pub async fn cleanup(&self) -> usize {
        let execs: Vec<(String, Arc<CommandExecution>)> = self
            .executions
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let mut removed = 0;
        for (id, exec) in execs {
            let terminal = exec.state.lock().await.status.is_terminal();
            if terminal && self.executions.remove(&id).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            log::info!("cleaned up {removed} finished command(s)");
        }
        removed
    }
}
