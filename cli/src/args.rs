//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use pxf_cluster_core::Command;


/// Manage PXF across a Greenplum cluster.
#[derive(Debug, Parser)]
#[command(name = "pxf", version)]
pub struct Pxf {
    #[command(subcommand)]
    pub action: PxfSubcommand,
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum PxfSubcommand {
    /// Perform <command> on each host in the cluster.
    Cluster(ClusterArgs),
    /// Print the installed PXF version.
    Version,
}

#[derive(Debug, Args)]
pub struct ClusterArgs {
    #[command(subcommand)]
    pub command: ClusterSubcommand,
    /// Cluster topology file (YAML or JSON). Defaults to $PXF_CLUSTER_TOPOLOGY.
    #[arg(long, global = true, value_name = "FILE")]
    pub topology: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ClusterSubcommand {
    /// Initialize the PXF server instances on master, standby and segment hosts.
    Init,
    /// Start the PXF server instances on all segment hosts.
    Start,
    /// Stop the PXF server instances on all segment hosts.
    Stop,
    /// Sync PXF configs from master to standby and segment hosts.
    Sync,
    /// Restart the PXF server instances on all segment hosts.
    Restart,
    /// Get status of the PXF server instances on all segment hosts.
    Status,
}

impl From<ClusterSubcommand> for Command {
    fn from(sub: ClusterSubcommand) -> Self {
        match sub {
            ClusterSubcommand::Init => Command::Init,
            ClusterSubcommand::Start => Command::Start,
            ClusterSubcommand::Stop => Command::Stop,
            ClusterSubcommand::Sync => Command::Sync,
            ClusterSubcommand::Restart => Command::Restart,
            ClusterSubcommand::Status => Command::Status,
        }
    }
}
