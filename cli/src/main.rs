//! The command-line entry point for PXF cluster management.
//!
//! # Usage
//!
//! ```text
//! pxf cluster init
//! pxf cluster start --topology /home/gpadmin/cluster.yaml
//! pxf cluster sync
//! pxf version
//! ```

mod args;

use std::io;
use std::process;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use pxf_cluster_core::cluster::{resolve_topology_path, ClusterTopology};
use pxf_cluster_core::env::ProcessEnv;
use pxf_cluster_core::infrastructure::ShellRunner;
use pxf_cluster_core::orchestrator::{pxf_version, ClusterOrchestrator};
use pxf_cluster_core::ClusterError;

use args::{ClusterArgs, Pxf, PxfSubcommand};


fn main() {
    let cli = Pxf::parse();
    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("pxf: {}", e);
        process::exit(1);
    }

    let result = match &cli.action {
        PxfSubcommand::Cluster(cluster) => run_cluster(cluster),
        PxfSubcommand::Version => pxf_version(&ProcessEnv).map(|v| println!("{}", v)),
    };
    process::exit(exit_code(result));
}


/// Install the tracing subscriber. Logs go to stderr so they never mix with
/// report lines on stdout.
fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let filter_layer = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env()?;
    let fmt_layer = fmt::layer().with_target(true).with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}


fn run_cluster(args: &ClusterArgs) -> Result<(), ClusterError> {
    let env = ProcessEnv;
    let path = resolve_topology_path(args.topology.as_deref(), &env)?;
    let topology = ClusterTopology::load(&path)?;
    let orchestrator = ClusterOrchestrator::new(topology, Box::new(ShellRunner));

    let stdout = io::stdout();
    let stderr = io::stderr();
    orchestrator
        .run(args.command.into(), &env, &mut stdout.lock(), &mut stderr.lock())
        .map(|_| ())
}


/// Map a command result to the process exit code, printing any error the
/// reporter has not already written.
fn exit_code(result: Result<(), ClusterError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            if !e.is_reported() {
                eprintln!("ERROR: {}", e);
            }
            1
        }
    }
}
