//! Config store for locating and loading hoist.toml.

use std::path::{Path, PathBuf};

use super::HoistConfig;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Resolve the config location: an explicit path wins, then
    /// `CONFIG_PATH`, then `<config dir>/hoist/hoist.toml`.
    pub fn locate(explicit: Option<PathBuf>) -> anyhow::Result<Self> {
        let env_path = std::env::var_os(CONFIG_PATH_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self::resolve(explicit, env_path, dirs::config_dir())
    }

    fn resolve(
        explicit: Option<PathBuf>,
        env_path: Option<PathBuf>,
        config_dir: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let config_path = match explicit.or(env_path) {
            Some(path) => path,
            None => config_dir
                .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
                .join("hoist")
                .join("hoist.toml"),
        };
        Ok(Self { config_path })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the config; a missing file yields the defaults.
    pub fn load(&self) -> anyhow::Result<HoistConfig> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(HoistConfig::new());
        }
        HoistConfig::from_file(&self.config_path)
    }
}
