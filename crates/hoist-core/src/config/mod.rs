//! Configuration for hoist
//!
//! `hoist.toml` describes the supervisor to drive and the launchables it
//! manages:
//!
//! ```toml
//! [supervisor]
//! service_root = "/var/service"
//! stop_policy = "abort"
//!
//! [launchables.web]
//! location = "https://artifacts.example.com/web/web_abc123.tar.gz"
//! run_as = "web"
//! config_dir = "/data/pods/web/env"
//! root_dir = "/data/pods/web"
//! ```

pub mod reader;
pub mod store;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::launchable::{ARTIFACT_SUFFIX, Launchable, StopPolicy, artifact_version, is_valid_version};
use crate::supervisor::RunitSupervisor;
use crate::supervisor::runit::{
    DEFAULT_SERVICE_ROOT, DEFAULT_SERVICEBUILDER, DEFAULT_SV, DEFAULT_TEMPLATE_DIR,
};

pub use reader::ConfigReader;
pub use store::{CONFIG_PATH_ENV, ConfigStore};

/// Root structure of hoist.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoistConfig {
    #[serde(default)]
    pub supervisor: SupervisorConfig,

    #[serde(default)]
    pub launchables: BTreeMap<String, LaunchableEntry>,
}

/// runit supervisor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    #[serde(default = "default_service_root")]
    pub service_root: PathBuf,

    /// Directory servicebuilder reads templates from
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    #[serde(default = "default_servicebuilder")]
    pub servicebuilder: PathBuf,

    #[serde(default = "default_sv")]
    pub sv: PathBuf,

    #[serde(default)]
    pub stop_policy: StopPolicy,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            service_root: default_service_root(),
            template_dir: default_template_dir(),
            servicebuilder: default_servicebuilder(),
            sv: default_sv(),
            stop_policy: StopPolicy::default(),
        }
    }
}

fn default_service_root() -> PathBuf {
    PathBuf::from(DEFAULT_SERVICE_ROOT)
}

fn default_template_dir() -> PathBuf {
    PathBuf::from(DEFAULT_TEMPLATE_DIR)
}

fn default_servicebuilder() -> PathBuf {
    PathBuf::from(DEFAULT_SERVICEBUILDER)
}

fn default_sv() -> PathBuf {
    PathBuf::from(DEFAULT_SV)
}

impl SupervisorConfig {
    pub fn runit(&self) -> RunitSupervisor {
        RunitSupervisor::new(&self.service_root, &self.template_dir)
            .with_binaries(&self.servicebuilder, &self.sv)
    }
}

/// A launchable as configured; the table key is its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchableEntry {
    /// URL or path of the `.tar.gz` artifact
    pub location: String,
    pub run_as: String,
    pub config_dir: PathBuf,
    pub root_dir: PathBuf,
}

impl HoistConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate hoist.toml content
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: HoistConfig =
            toml::from_str(content).context("Failed to parse hoist configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (id, entry) in &self.launchables {
            entry
                .validate()
                .with_context(|| format!("Invalid launchable '{}'", id))?;
        }
        Ok(())
    }

    /// Build the launchable configured under `id`.
    pub fn launchable(&self, id: &str) -> anyhow::Result<Launchable> {
        let entry = self
            .launchables
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("Launchable '{}' is not configured", id))?;
        Ok(entry.to_launchable(id))
    }
}

impl LaunchableEntry {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.location.trim().is_empty() {
            anyhow::bail!("location must not be empty");
        }
        if !self.location.ends_with(ARTIFACT_SUFFIX) {
            anyhow::bail!(
                "location '{}' must name a {} artifact",
                self.location,
                ARTIFACT_SUFFIX
            );
        }
        let version = artifact_version(&self.location);
        if !is_valid_version(version) {
            anyhow::bail!(
                "location '{}' does not name a version (got '{}')",
                self.location,
                version
            );
        }
        if self.run_as.trim().is_empty() {
            anyhow::bail!("run_as must not be empty");
        }
        if self.config_dir.as_os_str().is_empty() {
            anyhow::bail!("config_dir must not be empty");
        }
        if self.root_dir.as_os_str().is_empty() {
            anyhow::bail!("root_dir must not be empty");
        }
        Ok(())
    }

    pub fn to_launchable(&self, id: &str) -> Launchable {
        Launchable {
            id: id.to_string(),
            location: self.location.clone(),
            run_as: self.run_as.clone(),
            config_dir: self.config_dir.clone(),
            root_dir: self.root_dir.clone(),
        }
    }
}
