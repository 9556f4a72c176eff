//! The fixed catalog of PXF cluster operations.
//!
//! Each variant carries its execution scope, its user-facing message
//! templates, and the environment variables it needs, as plain constant data
//! selected by an exhaustive `match`.
//!
//! | Command | Scope | Required env |
//! |---------|-------|--------------|
//! | `init` | master and hosts | `GPHOME`, `PXF_CONF` |
//! | `start` | hosts only | `GPHOME` |
//! | `stop` | hosts only | `GPHOME` |
//! | `sync` | master to hosts | `GPHOME`, `PXF_CONF` |
//! | `restart` | hosts only | `GPHOME` |
//! | `status` | hosts only | `GPHOME` |
//!
//! Templates use `%d` placeholders; see [`fill_counts`].

use std::fmt;
use std::str::FromStr;

use crate::env::EnvVar;


// ---------------------------------------------------------------------------
// TargetScope / MessageKind
// ---------------------------------------------------------------------------

/// Where a command runs relative to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetScope {
    /// The coordinator host alone. Not used by any catalog entry.
    MasterOnly,
    /// Every segment host; the coordinator record is skipped.
    HostsOnly,
    /// The coordinator host, the standby host, and every segment host.
    MasterAndHosts,
    /// Runs on the coordinator once per target host (standby and segment
    /// hosts), pushing files out to it.
    MasterToHosts,
}

/// Which message template to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Printed before dispatch; one `%d` (host count).
    Status,
    /// Printed when every host succeeded; two `%d` (succeeded, total).
    Success,
    /// Printed when any host failed; two `%d` (failed, total).
    Error,
}


// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A PXF lifecycle operation fanned out across the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Init,
    Start,
    Stop,
    Sync,
    Status,
    Restart,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Init,
        Command::Start,
        Command::Stop,
        Command::Sync,
        Command::Status,
        Command::Restart,
    ];

    /// The subcommand name, also passed to `pxf` on each host.
    pub fn name(self) -> &'static str {
        match self {
            Command::Init => "init",
            Command::Start => "start",
            Command::Stop => "stop",
            Command::Sync => "sync",
            Command::Status => "status",
            Command::Restart => "restart",
        }
    }

    pub fn scope(self) -> TargetScope {
        match self {
            Command::Init => TargetScope::MasterAndHosts,
            Command::Sync => TargetScope::MasterToHosts,
            Command::Start | Command::Stop | Command::Status | Command::Restart => {
                TargetScope::HostsOnly
            }
        }
    }

    /// Environment variables this command validates, in check order.
    pub fn required_env(self) -> &'static [EnvVar] {
        match self {
            Command::Init | Command::Sync => &[EnvVar::Gphome, EnvVar::PxfConf],
            Command::Start | Command::Stop | Command::Status | Command::Restart => {
                &[EnvVar::Gphome]
            }
        }
    }

    /// Whether the remote invocation is prefixed with `PXF_CONF=<value>`.
    pub fn passes_pxf_conf(self) -> bool {
        matches!(self, Command::Init)
    }

    pub fn message(self, kind: MessageKind) -> &'static str {
        use MessageKind::*;
        match (self, kind) {
            (Command::Init, Status) => "Initializing PXF on master and %d segment hosts...\n",
            (Command::Init, Success) => "PXF initialized successfully on %d out of %d hosts\n",
            (Command::Init, Error) => "PXF failed to initialize on %d out of %d hosts\n",

            (Command::Start, Status) => "Starting PXF on %d segment hosts...\n",
            (Command::Start, Success) => "PXF started successfully on %d out of %d hosts\n",
            (Command::Start, Error) => "PXF failed to start on %d out of %d hosts\n",

            (Command::Stop, Status) => "Stopping PXF on %d segment hosts...\n",
            (Command::Stop, Success) => "PXF stopped successfully on %d out of %d hosts\n",
            (Command::Stop, Error) => "PXF failed to stop on %d out of %d hosts\n",

            (Command::Sync, Status) => "Syncing PXF configuration files to %d hosts...\n",
            (Command::Sync, Success) => "PXF configs synced successfully on %d out of %d hosts\n",
            (Command::Sync, Error) => "PXF configs failed to sync on %d out of %d hosts\n",

            (Command::Restart, Status) => "Restarting PXF on %d segment hosts...\n",
            (Command::Restart, Success) => "PXF restarted successfully on %d out of %d hosts\n",
            (Command::Restart, Error) => "PXF failed to restart on %d out of %d hosts\n",

            (Command::Status, Status) => "Checking status of PXF servers on %d segment hosts...\n",
            (Command::Status, Success) => "PXF is running on %d out of %d hosts\n",
            (Command::Status, Error) => "PXF is not running on %d out of %d hosts\n",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("{} is not a valid pxf command", s))
    }
}


// ---------------------------------------------------------------------------
// Template rendering
// ---------------------------------------------------------------------------

/// Replace each `%d` in `template` with the next value from `counts`.
///
/// Surplus placeholders are left untouched; surplus counts are ignored.
pub fn fill_counts(template: &str, counts: &[usize]) -> String {
    let mut out = String::with_capacity(template.len() + 8);
    let mut values = counts.iter();
    let mut rest = template;
    while let Some(pos) = rest.find("%d") {
        out.push_str(&rest[..pos]);
        match values.next() {
            Some(v) => out.push_str(&v.to_string()),
            None => out.push_str("%d"),
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}
