//! Discovery of runnable units inside an installed launchable.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::Launchable;
use crate::error::{LaunchableError, Result};
use crate::supervisor::Service;

/// Separates the launchable id from a launch script name in service names.
pub const SERVICE_NAME_SEPARATOR: &str = "__";

/// One runnable unit, mapped 1:1 to a supervised service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Executable {
    pub service: Service,
    /// Script or binary the service invokes
    pub exec_path: PathBuf,
}

impl Executable {
    fn new(name: String, service_root: &Path, exec_path: PathBuf) -> Self {
        let path = service_root.join(&name);
        Self {
            service: Service { name, path },
            exec_path,
        }
    }

    pub fn name(&self) -> &str {
        &self.service.name
    }
}

/// `<install>/bin/launch`
pub fn launch_path(launchable: &Launchable) -> PathBuf {
    launchable.install_dir().join("bin").join("launch")
}

/// Inspect `bin/launch` and produce the executables it describes.
///
/// A file yields a single executable named after the launchable. A directory
/// yields one executable per entry, named `<id>__<entry>`, sorted by entry
/// name so generated services are stable across runs.
pub(crate) fn discover(launchable: &Launchable, service_root: &Path) -> Result<Vec<Executable>> {
    let launch = launch_path(launchable);
    let metadata = fs::metadata(&launch).map_err(|e| LaunchableError::io("stat", &launch, e))?;

    if !metadata.is_dir() {
        return Ok(vec![Executable::new(
            launchable.id.clone(),
            service_root,
            launch,
        )]);
    }

    let mut names = fs::read_dir(&launch)
        .and_then(|entries| {
            entries
                .map(|entry| entry.map(|e| e.file_name()))
                .collect::<std::io::Result<Vec<_>>>()
        })
        .map_err(|e| LaunchableError::io("read directory", &launch, e))?;
    names.sort();

    Ok(names
        .into_iter()
        .map(|entry| {
            let name = format!(
                "{}{}{}",
                launchable.id,
                SERVICE_NAME_SEPARATOR,
                entry.to_string_lossy()
            );
            let exec_path = launch.join(&entry);
            Executable::new(name, service_root, exec_path)
        })
        .collect())
}
