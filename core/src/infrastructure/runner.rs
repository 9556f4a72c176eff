//! Command runner abstraction for executing per-host shell commands.
//!
//! `CommandRunner` is the trait the fan-out executor uses to run one
//! invocation. `ShellRunner` is the production implementation that spawns
//! `sh -c` locally or `ssh` for remote hosts. `MockRunner` is the test double
//! that records invocations and returns preset per-host outputs.

use std::collections::HashMap;
use std::process::Command;
use std::sync::Mutex;

use tracing::debug;


// ---------------------------------------------------------------------------
// Invocation / ExecOutput
// ---------------------------------------------------------------------------

/// One command to run on behalf of one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Run on this machine; `host` is the target the command acts on
    /// (e.g. the rsync destination).
    Local { host: String, command: String },
    /// Run on `host` over SSH.
    Remote { host: String, command: String },
}

impl Invocation {
    pub fn host(&self) -> &str {
        match self {
            Invocation::Local { host, .. } | Invocation::Remote { host, .. } => host,
        }
    }

    pub fn command(&self) -> &str {
        match self {
            Invocation::Local { command, .. } | Invocation::Remote { command, .. } => command,
        }
    }
}

/// Captured result of one invocation. `error` is `Some` when the command
/// could not be run or exited unsuccessfully; output on stderr alone is not
/// an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub error: Option<String>,
}

impl ExecOutput {
    pub fn success(stdout: &str) -> Self {
        ExecOutput {
            stdout: stdout.to_string(),
            ..Default::default()
        }
    }

    pub fn failure(stdout: &str, stderr: &str, error: &str) -> Self {
        ExecOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            error: Some(error.to_string()),
        }
    }
}


// ---------------------------------------------------------------------------
// CommandRunner
// ---------------------------------------------------------------------------

/// Trait for executing one invocation. Shared across the fan-out threads.
pub trait CommandRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> ExecOutput;
}

/// Production runner: `sh -c <cmd>` for local invocations,
/// `ssh -o StrictHostKeyChecking=no <host> <cmd>` for remote ones.
pub struct ShellRunner;

impl ShellRunner {
    fn command_for(invocation: &Invocation) -> Command {
        match invocation {
            Invocation::Local { command, .. } => {
                let mut cmd = Command::new("sh");
                cmd.arg("-c").arg(command);
                cmd
            }
            Invocation::Remote { host, command } => {
                let mut cmd = Command::new("ssh");
                cmd.args(["-o", "StrictHostKeyChecking=no"])
                    .arg(host)
                    .arg(command);
                cmd
            }
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, invocation: &Invocation) -> ExecOutput {
        let output = match Self::command_for(invocation).output() {
            Ok(output) => output,
            Err(e) => {
                return ExecOutput {
                    error: Some(format!("failed to execute: {}", e)),
                    ..Default::default()
                }
            }
        };
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let error = if output.status.success() {
            None
        } else {
            Some(match output.status.code() {
                Some(code) => format!("exit status {}", code),
                None => "terminated by signal".to_string(),
            })
        };
        debug!(host = invocation.host(), status = %output.status, "command finished");
        ExecOutput { stdout, stderr, error }
    }
}


// ---------------------------------------------------------------------------
// MockRunner
// ---------------------------------------------------------------------------

/// Test-double runner that records invocations and returns pre-configured
/// per-host outputs. Hosts without a preset succeed with empty output.
pub struct MockRunner {
    responses: Mutex<HashMap<String, ExecOutput>>,
    invocations: Mutex<Vec<Invocation>>,
}

impl MockRunner {
    pub fn new() -> Self {
        MockRunner {
            responses: Mutex::new(HashMap::new()),
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn with_responses(responses: Vec<(&str, ExecOutput)>) -> Self {
        let runner = MockRunner::new();
        for (host, output) in responses {
            runner.respond(host, output);
        }
        runner
    }

    /// Set the output returned for `host`.
    pub fn respond(&self, host: &str, output: ExecOutput) {
        lock(&self.responses).insert(host.to_string(), output);
    }

    /// Invocations in the order they were received.
    pub fn invocations(&self) -> Vec<Invocation> {
        lock(&self.invocations).clone()
    }

    /// The command strings received, sorted by host for stable assertions.
    pub fn executed_commands(&self) -> Vec<(String, String)> {
        let mut cmds: Vec<(String, String)> = self
            .invocations()
            .iter()
            .map(|i| (i.host().to_string(), i.command().to_string()))
            .collect();
        cmds.sort();
        cmds
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, invocation: &Invocation) -> ExecOutput {
        lock(&self.invocations).push(invocation.clone());
        lock(&self.responses)
            .get(invocation.host())
            .cloned()
            .unwrap_or_default()
    }
}

// A poisoned lock only means another test thread panicked; the data is still usable.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
