//! Target host sets and the coordinator check.
//!
//! A `HostSet` is derived from the topology per command: the deduplicated
//! hostnames a command targets, in topology order. Deduplication is by
//! hostname, not by role, so a standby coordinator sharing a segment host is
//! targeted once.

use std::ffi::CStr;
use std::io;

use crate::command::TargetScope;
use crate::env::{EnvSource, EnvVar};
use crate::error::TopologyError;

use super::topology::ClusterTopology;


// ---------------------------------------------------------------------------
// HostSet
// ---------------------------------------------------------------------------

/// The hosts one command will run against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSet {
    scope: TargetScope,
    hosts: Vec<String>,
    status_count: usize,
}

impl HostSet {
    pub fn scope(&self) -> TargetScope {
        self.scope
    }

    /// Hostnames in topology order.
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn contains(&self, host: &str) -> bool {
        self.hosts.iter().any(|h| h == host)
    }

    /// The count shown in the pre-dispatch status line. For master-and-hosts
    /// commands this is the number of distinct hosts carrying a worker
    /// segment ("master and N segment hosts"); otherwise it is `len()`.
    pub fn status_count(&self) -> usize {
        self.status_count
    }
}

fn push_unique(hosts: &mut Vec<String>, host: &str) {
    if !hosts.iter().any(|h| h == host) {
        hosts.push(host.to_string());
    }
}

impl ClusterTopology {
    /// Derive the target hosts for a scope.
    pub fn host_set(&self, scope: TargetScope) -> HostSet {
        let coordinator_host = self.coordinator().hostname.clone();
        let standby_host = self.standby().map(|s| s.hostname.as_str());
        let segment_hosts = self.segment_hosts();
        let mut hosts = Vec::new();

        match scope {
            TargetScope::MasterOnly => push_unique(&mut hosts, &coordinator_host),
            TargetScope::HostsOnly => {
                for host in &segment_hosts {
                    push_unique(&mut hosts, host);
                }
            }
            TargetScope::MasterAndHosts => {
                push_unique(&mut hosts, &coordinator_host);
                if let Some(standby) = standby_host {
                    push_unique(&mut hosts, standby);
                }
                for host in &segment_hosts {
                    push_unique(&mut hosts, host);
                }
            }
            TargetScope::MasterToHosts => {
                // Files are copied from the coordinator, never onto it.
                if let Some(standby) = standby_host {
                    push_unique(&mut hosts, standby);
                }
                for host in &segment_hosts {
                    push_unique(&mut hosts, host);
                }
                hosts.retain(|h| *h != coordinator_host);
            }
        }

        let status_count = match scope {
            TargetScope::MasterAndHosts => segment_hosts.len(),
            TargetScope::MasterOnly | TargetScope::HostsOnly | TargetScope::MasterToHosts => {
                hosts.len()
            }
        };
        HostSet { scope, hosts, status_count }
    }

    /// Fail unless `local_hostname` is the coordinator's host.
    pub fn verify_coordinator(&self, local_hostname: &str) -> Result<(), TopologyError> {
        let coordinator = &self.coordinator().hostname;
        if coordinator != local_hostname {
            return Err(TopologyError::NotCoordinator {
                coordinator: coordinator.clone(),
                local: local_hostname.to_string(),
            });
        }
        Ok(())
    }
}


// ---------------------------------------------------------------------------
// Local hostname
// ---------------------------------------------------------------------------

/// The hostname used for the coordinator check: `PXF_MASTER_HOSTNAME` when
/// set to something non-empty, otherwise the OS hostname.
pub fn local_hostname(env: &dyn EnvSource) -> Result<String, TopologyError> {
    match env.value(EnvVar::PxfMasterHostname) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => system_hostname().map_err(TopologyError::Hostname),
    }
}

fn system_hostname() -> io::Result<String> {
    let mut buf = [0 as libc::c_char; 256];
    let ret = unsafe { libc::gethostname(buf.as_mut_ptr(), buf.len()) };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    // gethostname may not terminate on truncation.
    buf[buf.len() - 1] = 0;
    let name = unsafe { CStr::from_ptr(buf.as_ptr()) };
    Ok(name.to_string_lossy().into_owned())
}
