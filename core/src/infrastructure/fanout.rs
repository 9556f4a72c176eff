//! Fan-out executor: run one command on every host of a `HostSet`.
//!
//! Each host gets its own scoped thread. Completion order is arbitrary, but
//! every result carries its host's index in the set, so the returned
//! `RemoteOutput` is always in topology order.

use std::thread;

use tracing::debug;

use crate::builder::RemoteCommand;
use crate::cluster::HostSet;
use crate::command::TargetScope;

use super::runner::{CommandRunner, ExecOutput, Invocation};


// ---------------------------------------------------------------------------
// ExecutionResult / RemoteOutput
// ---------------------------------------------------------------------------

/// Outcome for one host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Position of the host in its `HostSet`.
    pub index: usize,
    pub hostname: String,
    pub stdout: String,
    pub stderr: String,
    /// `Some` when the host failed.
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn from_output(index: usize, hostname: &str, output: ExecOutput) -> Self {
        ExecutionResult {
            index,
            hostname: hostname.to_string(),
            stdout: output.stdout,
            stderr: output.stderr,
            error: output.error,
        }
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Collected results of one fan-out, one per targeted host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteOutput {
    pub results: Vec<ExecutionResult>,
    pub num_errors: usize,
}


// ---------------------------------------------------------------------------
// FanOutExecutor
// ---------------------------------------------------------------------------

/// Dispatches a command to every host concurrently through a `CommandRunner`.
pub struct FanOutExecutor<'r> {
    runner: &'r dyn CommandRunner,
}

impl<'r> FanOutExecutor<'r> {
    pub fn new(runner: &'r dyn CommandRunner) -> Self {
        FanOutExecutor { runner }
    }

    /// The invocation for one host. Master-to-hosts commands run on this
    /// machine; everything else runs on the host itself.
    pub fn invocation(scope: TargetScope, host: &str, command: &RemoteCommand) -> Invocation {
        let command = command.for_host(host);
        let host = host.to_string();
        match scope {
            TargetScope::MasterToHosts => Invocation::Local { host, command },
            TargetScope::MasterOnly | TargetScope::HostsOnly | TargetScope::MasterAndHosts => {
                Invocation::Remote { host, command }
            }
        }
    }

    /// Run `command` on every host and wait for all of them.
    pub fn execute(&self, hosts: &HostSet, command: &RemoteCommand) -> RemoteOutput {
        let scope = hosts.scope();
        let runner = self.runner;

        let mut results: Vec<ExecutionResult> = thread::scope(|s| {
            let handles: Vec<_> = hosts
                .hosts()
                .iter()
                .enumerate()
                .map(|(index, host)| {
                    let invocation = Self::invocation(scope, host, command);
                    debug!(host = %host, command = invocation.command(), "dispatching");
                    let handle = s.spawn(move || runner.run(&invocation));
                    (index, host, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(index, host, handle)| {
                    let output = handle.join().unwrap_or_else(|_| ExecOutput {
                        error: Some("runner panicked".to_string()),
                        ..Default::default()
                    });
                    ExecutionResult::from_output(index, host, output)
                })
                .collect()
        });
        results.sort_by_key(|r| r.index);

        let num_errors = results.iter().filter(|r| r.failed()).count();
        for failed in results.iter().filter(|r| r.failed()) {
            debug!(host = %failed.hostname, error = failed.error.as_deref().unwrap_or(""), "host failed");
        }
        debug!(hosts = results.len(), failed = num_errors, "fan-out complete");
        RemoteOutput { results, num_errors }
    }
}
