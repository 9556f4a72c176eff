//! Environment variables read by the cluster commands.
//!
//! Lookups go through the `EnvSource` trait so command building can be tested
//! against a plain `HashMap` instead of mutating the process environment.

use std::collections::HashMap;
use std::fmt;

use crate::command::Command;
use crate::error::ConfigError;


// ---------------------------------------------------------------------------
// EnvVar
// ---------------------------------------------------------------------------

/// An environment variable known to the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvVar {
    /// Greenplum installation root; PXF lives under `$GPHOME/pxf`.
    Gphome,
    /// PXF user configuration root (`conf`, `lib`, `servers`).
    PxfConf,
    /// Overrides the OS hostname when checking for the coordinator.
    PxfMasterHostname,
    /// Path to the cluster topology file.
    PxfClusterTopology,
}

impl EnvVar {
    pub fn name(self) -> &'static str {
        match self {
            EnvVar::Gphome => "GPHOME",
            EnvVar::PxfConf => "PXF_CONF",
            EnvVar::PxfMasterHostname => "PXF_MASTER_HOSTNAME",
            EnvVar::PxfClusterTopology => "PXF_CLUSTER_TOPOLOGY",
        }
    }
}

impl fmt::Display for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}


// ---------------------------------------------------------------------------
// EnvSource
// ---------------------------------------------------------------------------

/// Read-only view of an environment.
pub trait EnvSource {
    /// Return the value of `name`, or `None` if it is unset.
    fn lookup(&self, name: &str) -> Option<String>;

    /// Look up a known variable.
    fn value(&self, var: EnvVar) -> Option<String> {
        self.lookup(var.name())
    }
}

/// The real process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        // Non-UTF-8 values are treated as set but unusable.
        std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
    }
}

impl EnvSource for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Return the value of `var`, failing if it is unset or empty.
pub fn require(env: &dyn EnvSource, var: EnvVar) -> Result<String, ConfigError> {
    match env.value(var) {
        None => Err(ConfigError::MissingEnvVar(var)),
        Some(value) if value.is_empty() => Err(ConfigError::BlankEnvVar(var)),
        Some(value) => Ok(value),
    }
}


// ---------------------------------------------------------------------------
// CliInputs
// ---------------------------------------------------------------------------

/// Validated environment inputs for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliInputs {
    pub command: Command,
    pub gphome: String,
    /// Only populated for commands that require `PXF_CONF`.
    pub pxf_conf: Option<String>,
}

impl CliInputs {
    /// Validate the command's required variables in declared order. The
    /// first missing or blank variable is returned; later ones are not
    /// checked. Every command requires `GPHOME` first.
    pub fn resolve(command: Command, env: &dyn EnvSource) -> Result<CliInputs, ConfigError> {
        let gphome = require(env, EnvVar::Gphome)?;
        let pxf_conf = if command.required_env().contains(&EnvVar::PxfConf) {
            Some(require(env, EnvVar::PxfConf)?)
        } else {
            None
        };
        Ok(CliInputs { command, gphome, pxf_conf })
    }
}
