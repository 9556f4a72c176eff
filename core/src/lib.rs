//! PXF cluster core.
//!
//! Fans PXF lifecycle commands out to every host of a Greenplum cluster and
//! aggregates the per-host results into one report.
//!
//! - [`command`]: the fixed command catalog (scope, templates, env vars)
//! - [`env`]: environment access and validation
//! - [`builder`]: remote command text per host
//! - [`cluster`]: topology loading, target host sets, coordinator check
//! - [`infrastructure`]: command runners and the fan-out executor
//! - [`report`]: result aggregation and the failure digest
//! - [`orchestrator`]: ties the above together for one invocation

pub mod builder;
pub mod cluster;
pub mod command;
pub mod env;
pub mod error;
pub mod infrastructure;
pub mod orchestrator;
pub mod report;

pub use command::Command;
pub use error::{ClusterError, ConfigError, TopologyError};
