//! Process supervisor collaborator
//!
//! The engine registers service definitions and asks for reconciliation and
//! per-service stops; actually running processes is the supervisor's job.

pub mod runit;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use runit::RunitSupervisor;

/// A supervised service identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Unique service name
    pub name: String,
    /// Directory where the supervisor keeps this service's definition
    pub path: PathBuf,
}

/// Command line for one service within a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub run: Vec<String>,
}

/// Aggregate set of service definitions registered under one name.
///
/// Serializes as a map of service name to entry; the template name only
/// selects the file it is written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTemplate {
    #[serde(skip)]
    pub name: String,
    #[serde(flatten)]
    pub entries: BTreeMap<String, ServiceEntry>,
}

impl ServiceTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn add_entry(&mut self, service: impl Into<String>, run: Vec<String>) {
        self.entries.insert(service.into(), ServiceEntry { run });
    }
}

/// Errors reported by a supervisor.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize service template: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Command {
        program: String,
        status: std::process::ExitStatus,
        output: String,
    },
}

impl SupervisorError {
    /// Standard output captured from a failed supervisor command.
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Command { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Operations the engine consumes from a process supervisor.
pub trait Supervisor {
    /// Root under which per-service definitions live.
    fn service_root(&self) -> &Path;

    /// Persist a template, returning where it was written.
    fn write(&self, template: &ServiceTemplate) -> Result<PathBuf, SupervisorError>;

    /// Reconcile running services against the written templates.
    fn rebuild(&self) -> Result<String, SupervisorError>;

    /// Stop one service.
    fn stop(&self, service: &Service) -> Result<String, SupervisorError>;
}
