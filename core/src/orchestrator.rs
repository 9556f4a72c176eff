//! Cluster orchestrator. Wires the command builder, host sets, fan-out
//! executor, and reporter together.
//!
//! `ClusterOrchestrator` is the only component that causes side effects, and
//! only through its injected `CommandRunner` (`ShellRunner` in production,
//! `MockRunner` in tests) and the output sinks passed to `run`.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::builder::build_command;
use crate::cluster::{local_hostname, ClusterTopology};
use crate::command::Command;
use crate::env::{require, EnvSource, EnvVar};
use crate::error::{ClusterError, ConfigError};
use crate::infrastructure::fanout::FanOutExecutor;
use crate::infrastructure::runner::CommandRunner;
use crate::report::{report_outcome, report_status, AggregateOutcome};


/// Runs cluster commands against one topology.
pub struct ClusterOrchestrator {
    topology: ClusterTopology,
    runner: Box<dyn CommandRunner>,
}

impl fmt::Debug for ClusterOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterOrchestrator")
            .field("topology", &self.topology)
            .finish()
    }
}

impl ClusterOrchestrator {
    pub fn new(topology: ClusterTopology, runner: Box<dyn CommandRunner>) -> Self {
        ClusterOrchestrator { topology, runner }
    }

    /// Run `command` on every target host.
    ///
    /// Checks that this is the coordinator host, validates the environment,
    /// prints the status line, fans out, and reports. Any failure before the
    /// fan-out returns immediately without contacting a host.
    pub fn run<O: Write, E: Write>(
        &self,
        command: Command,
        env: &dyn EnvSource,
        out: &mut O,
        err: &mut E,
    ) -> Result<AggregateOutcome, ClusterError> {
        let local = local_hostname(env)?;
        self.topology.verify_coordinator(&local)?;

        let remote_command = build_command(command, env, Some(&self.topology))?;
        let hosts = self.topology.host_set(command.scope());
        debug!(command = command.name(), hosts = ?hosts.hosts(), "resolved targets");

        report_status(command, hosts.status_count(), out)?;
        let output = FanOutExecutor::new(self.runner.as_ref()).execute(&hosts, &remote_command);
        report_outcome(command, &output.results, out, err)
    }
}


/// Read the installed PXF version from `$GPHOME/pxf/version`.
pub fn pxf_version(env: &dyn EnvSource) -> Result<String, ClusterError> {
    let gphome = require(env, EnvVar::Gphome)?;
    let path: PathBuf = [gphome.as_str(), "pxf", "version"].iter().collect();
    let version = fs::read_to_string(&path).map_err(|source| ConfigError::Version {
        path: path.clone(),
        source,
    })?;
    Ok(version.trim_end().to_string())
}
