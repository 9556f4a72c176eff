//! Cluster topology and target host resolution.

pub mod hosts;
pub mod topology;

pub use hosts::{local_hostname, HostSet};
pub use topology::{resolve_topology_path, ClusterTopology, Role, SegmentConfig};
