//! Application context wiring configuration to engine collaborators.

use std::path::{Path, PathBuf};

use crate::config::{ConfigStore, HoistConfig};
use crate::fetch::{self, HttpFetcher};
use crate::launchable::{Launchable, StopPolicy};
use crate::supervisor::RunitSupervisor;

/// Loaded configuration plus the services built from it.
///
/// Frontends create this once and hand it to commands.
#[derive(Debug, Clone)]
pub struct AppContext {
    config_path: PathBuf,
    config: HoistConfig,
    supervisor: RunitSupervisor,
}

impl AppContext {
    /// Locate and load configuration, see [`ConfigStore::locate`].
    pub fn load(explicit_config: Option<PathBuf>) -> anyhow::Result<Self> {
        let store = ConfigStore::locate(explicit_config)?;
        let config = store.load()?;
        Ok(Self::new(store.config_path().to_path_buf(), config))
    }

    pub fn new(config_path: PathBuf, config: HoistConfig) -> Self {
        let supervisor = config.supervisor.runit();
        Self {
            config_path,
            config,
            supervisor,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> &HoistConfig {
        &self.config
    }

    pub fn supervisor(&self) -> &RunitSupervisor {
        &self.supervisor
    }

    pub fn stop_policy(&self) -> StopPolicy {
        self.config.supervisor.stop_policy
    }

    pub fn launchable(&self, id: &str) -> anyhow::Result<Launchable> {
        self.config.launchable(id)
    }

    pub fn fetcher(&self) -> anyhow::Result<HttpFetcher> {
        Ok(fetch::default_fetcher()?)
    }
}
