//! Remote command synthesis.
//!
//! Turns a `Command` plus validated environment inputs into the exact shell
//! text run for each host. Nothing here spawns processes; the fan-out
//! executor does that.

use crate::cluster::ClusterTopology;
use crate::command::Command;
use crate::env::{CliInputs, EnvSource};
use crate::error::{ClusterError, TopologyError};


/// Subdirectories of `PXF_CONF` copied to every host by `sync`.
pub const SYNC_DIRS: [&str; 3] = ["conf", "lib", "servers"];


// ---------------------------------------------------------------------------
// SyncCommand
// ---------------------------------------------------------------------------

/// Per-host rsync generator for `sync`. Captures only the configuration root;
/// the target host is supplied on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCommand {
    pxf_conf: String,
}

impl SyncCommand {
    pub fn new(pxf_conf: &str) -> Self {
        SyncCommand { pxf_conf: pxf_conf.to_string() }
    }

    pub fn for_host(&self, host: &str) -> String {
        let sources: Vec<String> = SYNC_DIRS
            .iter()
            .map(|dir| format!("'{}/{}'", self.pxf_conf, dir))
            .collect();
        format!(
            "rsync -az -e 'ssh -o StrictHostKeyChecking=no' {} '{}:{}'",
            sources.join(" "),
            host,
            self.pxf_conf
        )
    }
}


// ---------------------------------------------------------------------------
// RemoteCommand
// ---------------------------------------------------------------------------

/// The command text for a fan-out: either one string for every host, or a
/// generator parameterized by host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    Fixed(String),
    Sync(SyncCommand),
}

impl RemoteCommand {
    /// Resolve the text to run for `host`.
    pub fn for_host(&self, host: &str) -> String {
        match self {
            RemoteCommand::Fixed(cmd) => cmd.clone(),
            RemoteCommand::Sync(sync) => sync.for_host(host),
        }
    }
}

/// Validate the environment for `command` and build its remote command.
///
/// `sync` needs a topology to fan out over; building it without one fails
/// with `ClusterNotConfigured` after the environment has been validated.
pub fn build_command(
    command: Command,
    env: &dyn EnvSource,
    topology: Option<&ClusterTopology>,
) -> Result<RemoteCommand, ClusterError> {
    let inputs = CliInputs::resolve(command, env)?;
    match command {
        Command::Sync => {
            if topology.is_none() {
                return Err(TopologyError::ClusterNotConfigured.into());
            }
            let pxf_conf = inputs.pxf_conf.unwrap_or_default();
            Ok(RemoteCommand::Sync(SyncCommand::new(&pxf_conf)))
        }
        Command::Init | Command::Start | Command::Stop | Command::Status | Command::Restart => {
            Ok(RemoteCommand::Fixed(pxf_invocation(&inputs)))
        }
    }
}

/// `[PXF_CONF=<conf> ]<GPHOME>/pxf/bin/pxf <command>`
fn pxf_invocation(inputs: &CliInputs) -> String {
    let mut cmd = String::new();
    if inputs.command.passes_pxf_conf() {
        if let Some(conf) = inputs.pxf_conf.as_deref().filter(|c| !c.is_empty()) {
            cmd.push_str(&format!("PXF_CONF={} ", conf));
        }
    }
    cmd.push_str(&format!("{}/pxf/bin/pxf {}", inputs.gphome, inputs.command.name()));
    cmd
}
