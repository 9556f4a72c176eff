//! The segment configuration table.
//!
//! `ClusterTopology` is an ordered list of `SegmentConfig` records as found in
//! `gp_segment_configuration`: content id `-1` is the coordinator (role
//! primary) or its standby (role mirror); non-negative ids are worker
//! segments, many of which may share a host. The topology is read once from a
//! YAML or JSON file and never mutated afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::env::{EnvSource, EnvVar};
use crate::error::TopologyError;


/// Content id shared by the coordinator and the standby coordinator.
pub const COORDINATOR_CONTENT_ID: i32 = -1;


// ---------------------------------------------------------------------------
// SegmentConfig
// ---------------------------------------------------------------------------

/// Replication role of a segment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Role {
    #[serde(rename = "p", alias = "primary")]
    Primary,
    #[serde(rename = "m", alias = "mirror")]
    Mirror,
}

impl Default for Role {
    fn default() -> Self {
        Role::Primary
    }
}

/// One row of the segment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SegmentConfig {
    pub content_id: i32,
    pub hostname: String,
    #[serde(default)]
    pub data_dir: String,
    #[serde(default)]
    pub role: Role,
}

impl SegmentConfig {
    pub fn new(content_id: i32, hostname: &str, data_dir: &str, role: Role) -> Self {
        SegmentConfig {
            content_id,
            hostname: hostname.to_string(),
            data_dir: data_dir.to_string(),
            role,
        }
    }

    pub fn is_coordinator(&self) -> bool {
        self.content_id == COORDINATOR_CONTENT_ID && self.role == Role::Primary
    }

    pub fn is_standby(&self) -> bool {
        self.content_id == COORDINATOR_CONTENT_ID && self.role == Role::Mirror
    }

    pub fn is_segment(&self) -> bool {
        self.content_id >= 0
    }
}


// ---------------------------------------------------------------------------
// ClusterTopology
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TopologyFile {
    segments: Vec<SegmentConfig>,
}

/// Validated, ordered segment configuration for the whole cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterTopology {
    segments: Vec<SegmentConfig>,
    coordinator: usize,
    standby: Option<usize>,
}

impl ClusterTopology {
    /// Build a topology, checking that there is exactly one coordinator and
    /// at most one standby.
    pub fn new(segments: Vec<SegmentConfig>) -> Result<ClusterTopology, TopologyError> {
        let mut coordinator = None;
        let mut standby = None;
        for (idx, seg) in segments.iter().enumerate() {
            if seg.is_coordinator() {
                if coordinator.replace(idx).is_some() {
                    return Err(TopologyError::DuplicateCoordinator);
                }
            } else if seg.is_standby() && standby.replace(idx).is_some() {
                return Err(TopologyError::DuplicateStandby);
            }
        }
        let coordinator = coordinator.ok_or(TopologyError::NoCoordinator)?;
        Ok(ClusterTopology { segments, coordinator, standby })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<ClusterTopology, TopologyError> {
        let file: TopologyFile =
            serde_yaml::from_str(yaml).map_err(|e| TopologyError::Parse(e.to_string()))?;
        ClusterTopology::new(file.segments)
    }

    pub fn from_json_str(json: &str) -> Result<ClusterTopology, TopologyError> {
        let file: TopologyFile =
            serde_json::from_str(json).map_err(|e| TopologyError::Parse(e.to_string()))?;
        ClusterTopology::new(file.segments)
    }

    /// Load a topology file. `.json` files are parsed as JSON, everything
    /// else as YAML.
    pub fn load(path: &Path) -> Result<ClusterTopology, TopologyError> {
        let content = fs::read_to_string(path).map_err(|source| TopologyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let topology = if is_json {
            ClusterTopology::from_json_str(&content)?
        } else {
            ClusterTopology::from_yaml_str(&content)?
        };
        info!(
            path = %path.display(),
            segments = topology.segments.len(),
            coordinator = %topology.coordinator().hostname,
            "loaded cluster topology"
        );
        Ok(topology)
    }

    /// All records in topology order.
    pub fn segments(&self) -> &[SegmentConfig] {
        &self.segments
    }

    pub fn coordinator(&self) -> &SegmentConfig {
        &self.segments[self.coordinator]
    }

    pub fn standby(&self) -> Option<&SegmentConfig> {
        self.standby.map(|idx| &self.segments[idx])
    }

    /// Hostnames of all worker segments, deduplicated, in topology order.
    pub fn segment_hosts(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = Vec::new();
        for seg in self.segments.iter().filter(|s| s.is_segment()) {
            if !hosts.contains(&seg.hostname.as_str()) {
                hosts.push(&seg.hostname);
            }
        }
        hosts
    }
}

/// Pick the topology file: the explicit path if given, else
/// `PXF_CLUSTER_TOPOLOGY`.
pub fn resolve_topology_path(
    explicit: Option<&Path>,
    env: &dyn EnvSource,
) -> Result<PathBuf, TopologyError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    match env.value(EnvVar::PxfClusterTopology) {
        Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => Err(TopologyError::Unavailable),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const YAML: &str = "\
segments:
  - content_id: -1
    hostname: mdw
    data_dir: /data/gpseg-1
    role: p
  - content_id: 0
    hostname: sdw1
    data_dir: /data/gpseg0
    role: p
  - content_id: 1
    hostname: sdw2
    data_dir: /data/gpseg1
  - content_id: 2
    hostname: sdw1
    data_dir: /data/gpseg2
    role: primary
";

    fn seg(content_id: i32, host: &str, role: Role) -> SegmentConfig {
        SegmentConfig::new(content_id, host, &format!("/data/gpseg{}", content_id), role)
    }

    // -- Construction --

    #[test]
    fn new_finds_coordinator_and_standby() {
        let topo = ClusterTopology::new(vec![
            seg(-1, "mdw", Role::Primary),
            seg(-1, "smdw", Role::Mirror),
            seg(0, "sdw1", Role::Primary),
        ])
        .unwrap();
        assert_eq!(topo.coordinator().hostname, "mdw");
        assert_eq!(topo.standby().unwrap().hostname, "smdw");
    }

    #[test]
    fn new_without_coordinator_fails() {
        let err = ClusterTopology::new(vec![seg(0, "sdw1", Role::Primary)]).unwrap_err();
        assert!(matches!(err, TopologyError::NoCoordinator));
    }

    #[test]
    fn standby_alone_is_not_a_coordinator() {
        let err = ClusterTopology::new(vec![seg(-1, "smdw", Role::Mirror)]).unwrap_err();
        assert!(matches!(err, TopologyError::NoCoordinator));
    }

    #[test]
    fn new_with_two_coordinators_fails() {
        let err = ClusterTopology::new(vec![
            seg(-1, "mdw", Role::Primary),
            seg(-1, "mdw2", Role::Primary),
        ])
        .unwrap_err();
        assert!(matches!(err, TopologyError::DuplicateCoordinator));
    }

    #[test]
    fn new_with_two_standbys_fails() {
        let err = ClusterTopology::new(vec![
            seg(-1, "mdw", Role::Primary),
            seg(-1, "smdw", Role::Mirror),
            seg(-1, "smdw2", Role::Mirror),
        ])
        .unwrap_err();
        assert!(matches!(err, TopologyError::DuplicateStandby));
    }

    // -- Parsing --

    #[test]
    fn parses_yaml_with_role_defaults_and_aliases() {
        let topo = ClusterTopology::from_yaml_str(YAML).unwrap();
        assert_eq!(topo.segments().len(), 4);
        assert!(topo.segments().iter().all(|s| s.role == Role::Primary));
        assert_eq!(topo.segment_hosts(), vec!["sdw1", "sdw2"]);
    }

    #[test]
    fn parses_json() {
        let json = r#"{"segments": [
            {"content_id": -1, "hostname": "mdw", "data_dir": "/d", "role": "p"},
            {"content_id": 0, "hostname": "sdw1", "data_dir": "/d0", "role": "m"}
        ]}"#;
        let topo = ClusterTopology::from_json_str(json).unwrap();
        assert_eq!(topo.segments()[1].role, Role::Mirror);
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = ClusterTopology::from_yaml_str("segments: [[[").unwrap_err();
        assert!(matches!(err, TopologyError::Parse(_)));
    }

    #[test]
    fn load_picks_format_by_extension() {
        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        yaml.write_all(YAML.as_bytes()).unwrap();
        assert_eq!(ClusterTopology::load(yaml.path()).unwrap().segments().len(), 4);

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        json.write_all(br#"{"segments":[{"content_id":-1,"hostname":"mdw"}]}"#)
            .unwrap();
        assert_eq!(ClusterTopology::load(json.path()).unwrap().coordinator().hostname, "mdw");
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClusterTopology::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, TopologyError::Read { .. }));
    }

    // -- resolve_topology_path --

    #[test]
    fn explicit_path_wins() {
        let mut env = HashMap::new();
        env.insert("PXF_CLUSTER_TOPOLOGY".to_string(), "/from/env.yaml".to_string());
        let path = resolve_topology_path(Some(Path::new("/from/flag.yaml")), &env).unwrap();
        assert_eq!(path, PathBuf::from("/from/flag.yaml"));
    }

    #[test]
    fn falls_back_to_env() {
        let mut env = HashMap::new();
        env.insert("PXF_CLUSTER_TOPOLOGY".to_string(), "/from/env.yaml".to_string());
        let path = resolve_topology_path(None, &env).unwrap();
        assert_eq!(path, PathBuf::from("/from/env.yaml"));
    }

    #[test]
    fn nothing_configured_is_unavailable() {
        let env: HashMap<String, String> = HashMap::new();
        let err = resolve_topology_path(None, &env).unwrap_err();
        assert!(matches!(err, TopologyError::Unavailable));
    }
}
