//! Error taxonomy for cluster commands.
//!
//! Three families mirror the three ways a cluster command can stop: bad local
//! configuration, an unusable topology, or one or more hosts failing remotely.
//! Configuration and topology errors are raised before anything is
//! dispatched; `RemoteExecution` is raised after the fan-out completes.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::env::EnvVar;


// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Missing or unusable local configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingEnvVar(EnvVar),

    #[error("{0} cannot be blank")]
    BlankEnvVar(EnvVar),

    /// The installed PXF version file could not be read.
    #[error("could not read PXF version from {}: {source}", path.display())]
    Version {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}


// ---------------------------------------------------------------------------
// TopologyError
// ---------------------------------------------------------------------------

/// The cluster topology is missing, malformed, or not usable from this host.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("pxf cluster commands should only be run from Greenplum master")]
    NotCoordinator { coordinator: String, local: String },

    #[error("cluster topology must be supplied to build the sync command")]
    ClusterNotConfigured,

    #[error("no cluster topology given: pass --topology or set {}", EnvVar::PxfClusterTopology)]
    Unavailable,

    #[error("cluster topology has no coordinator (content id -1, role primary)")]
    NoCoordinator,

    #[error("cluster topology has more than one coordinator")]
    DuplicateCoordinator,

    #[error("cluster topology has more than one standby coordinator")]
    DuplicateStandby,

    #[error("could not read cluster topology {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse cluster topology: {0}")]
    Parse(String),

    #[error("could not determine local hostname: {0}")]
    Hostname(#[source] io::Error),
}


// ---------------------------------------------------------------------------
// ClusterError
// ---------------------------------------------------------------------------

/// Top-level error returned by every cluster operation.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// One or more hosts reported an error. The message is the per-host
    /// digest, exactly as written to the error channel.
    #[error("{digest}")]
    RemoteExecution {
        failed: usize,
        total: usize,
        digest: String,
    },

    /// Writing a report line failed.
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

impl ClusterError {
    /// Whether the error has already been reported to the user by the
    /// reporter, so the caller should not print it again.
    pub fn is_reported(&self) -> bool {
        matches!(self, ClusterError::RemoteExecution { .. })
    }
}
