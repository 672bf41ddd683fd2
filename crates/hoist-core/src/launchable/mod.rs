//! Launchables: versioned, installable artifacts and their lifecycle.
//!
//! A launchable owns "where things live". Installs are keyed by version
//! under `<root>/installs/<version>`, so re-installing a version is a no-op
//! and a new version lands in a sibling directory. Nothing discovered inside
//! an install is cached; every call re-reads the filesystem.

pub mod descriptor;
pub mod executable;
pub mod hooks;
pub mod lifecycle;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::archive::extract_tar_gz;
use crate::error::{LaunchableError, Result};
use crate::fetch::Fetcher;

pub use executable::Executable;
pub use hooks::HookResult;
pub use lifecycle::{ServiceLifecycle, StopPolicy};

/// Suffix stripped from the artifact file name to derive its version.
pub const ARTIFACT_SUFFIX: &str = ".tar.gz";

/// Final path segment of `location` with [`ARTIFACT_SUFFIX`] stripped.
pub fn artifact_version(location: &str) -> &str {
    let file_name = location.rsplit('/').next().unwrap_or(location);
    file_name.strip_suffix(ARTIFACT_SUFFIX).unwrap_or(file_name)
}

/// Staging directories are created private; the install has to be
/// traversable by the run-as user.
#[cfg(unix)]
fn open_up(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o755))
        .map_err(|e| LaunchableError::io("set permissions on", dir, e))
}

#[cfg(not(unix))]
fn open_up(_dir: &Path) -> Result<()> {
    Ok(())
}

/// True when `version` can name its own directory under `installs/`.
///
/// Empty, `.` and `..` versions would alias the installs directory or the
/// launchable root.
pub fn is_valid_version(version: &str) -> bool {
    !matches!(version, "" | "." | "..")
}

/// A particular install of an artifact plus its run identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Launchable {
    /// Unique identifier, used to name generated services
    pub id: String,
    /// Where the artifact is fetched from
    pub location: String,
    /// User the executables run as
    pub run_as: String,
    /// Environment directory handed to `chpst -C`
    pub config_dir: PathBuf,
    /// Root holding every install of this launchable
    pub root_dir: PathBuf,
}

impl Launchable {
    /// Artifact version, derived from the location's final path segment.
    ///
    /// Locations follow `<app>_<version-string>.tar.gz`; the suffix is
    /// stripped when present.
    pub fn version(&self) -> &str {
        artifact_version(&self.location)
    }

    /// `<root>/installs/<version>`
    pub fn install_dir(&self) -> PathBuf {
        self.root_dir.join("installs").join(self.version())
    }

    /// Fetch and unpack the artifact unless this version is already installed.
    ///
    /// The archive is downloaded into a temporary directory, extracted into a
    /// staging sibling of the install directory and renamed into place, so a
    /// failed extraction never leaves a half-populated install behind.
    pub fn install(&self, fetcher: &dyn Fetcher) -> Result<()> {
        let version = self.version();
        if !is_valid_version(version) {
            return Err(LaunchableError::InvalidVersion {
                location: self.location.clone(),
                version: version.to_string(),
            });
        }

        let install_dir = self.install_dir();
        if fs::metadata(&install_dir).is_ok() {
            tracing::debug!(launchable = %self.id, version, "Already installed");
            return Ok(());
        }

        tracing::info!(launchable = %self.id, version, location = %self.location, "Installing");

        let download_dir = tempfile::Builder::new()
            .prefix("hoist-")
            .tempdir()
            .map_err(|e| LaunchableError::io("create download directory", std::env::temp_dir(), e))?;
        let archive_path = download_dir.path().join(version);

        fetcher
            .fetch(&self.location, &archive_path)
            .map_err(|source| LaunchableError::Fetch {
                location: self.location.clone(),
                source,
            })?;

        let archive = File::open(&archive_path)
            .map_err(|e| LaunchableError::io("open", &archive_path, e))?;

        let installs_dir = self.root_dir.join("installs");
        fs::create_dir_all(&installs_dir)
            .map_err(|e| LaunchableError::io("create directory", &installs_dir, e))?;

        // Removed on drop unless renamed into place; an empty archive still
        // yields an (empty) install directory.
        let staging = tempfile::Builder::new()
            .prefix(&format!(".{}.partial-", version))
            .tempdir_in(&installs_dir)
            .map_err(|e| LaunchableError::io("create staging directory in", &installs_dir, e))?;

        open_up(staging.path())?;
        extract_tar_gz(archive, staging.path())?;

        if let Err(source) = fs::rename(staging.path(), &install_dir) {
            if fs::metadata(&install_dir).is_ok() {
                tracing::debug!(launchable = %self.id, version, "Concurrent install won");
                return Ok(());
            }
            return Err(LaunchableError::io("move install into", &install_dir, source));
        }

        tracing::info!(launchable = %self.id, version, path = %install_dir.display(), "Installed");
        Ok(())
    }

    /// Runnable units inside the installed artifact.
    ///
    /// Fails when the launch entry point is missing, which includes the
    /// never-installed case.
    pub fn executables(&self, service_root: &Path) -> Result<Vec<Executable>> {
        executable::discover(self, service_root)
    }

    /// Run the optional `bin/enable` hook.
    ///
    /// An absent hook is a successful no-op with empty output.
    pub fn enable(&self) -> Result<String> {
        self.optional_hook(hooks::ENABLE)
    }

    /// Run the optional `bin/disable` hook.
    pub fn disable(&self) -> Result<String> {
        self.optional_hook(hooks::DISABLE)
    }

    /// Run a hook script from the install's `bin/` directory.
    pub fn hook(&self, script: &str) -> Result<HookResult> {
        hooks::run(&self.install_dir(), script)
    }

    fn optional_hook(&self, script: &str) -> Result<String> {
        match self.hook(script)? {
            HookResult::Ran { output } => Ok(output),
            HookResult::Absent => {
                tracing::debug!(launchable = %self.id, script, "No hook script, skipping");
                Ok(String::new())
            }
        }
    }
}
