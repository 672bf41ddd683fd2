//! Optional lifecycle hook scripts (`bin/enable`, `bin/disable`).

use std::fs;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{LaunchableError, Result};

pub const ENABLE: &str = "enable";
pub const DISABLE: &str = "disable";

/// Outcome of invoking a hook script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookResult {
    /// The script ran and exited successfully
    Ran { output: String },
    /// No such script in the install
    Absent,
}

/// Run `<install_dir>/bin/<script>` with its standard output captured.
///
/// Only a missing script maps to [`HookResult::Absent`]. Everything else,
/// including a script that exists but cannot be executed, is an error. There
/// is no timeout; a hung script blocks the caller.
pub(crate) fn run(install_dir: &Path, script: &str) -> Result<HookResult> {
    let path = install_dir.join("bin").join(script);

    match fs::metadata(&path) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HookResult::Absent),
        Err(e) => return Err(LaunchableError::io("stat", &path, e)),
    }

    tracing::debug!(script = %path.display(), "Running hook");
    let output = Command::new(&path)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .map_err(|e| LaunchableError::io("run", &path, e))?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if !output.status.success() {
        return Err(LaunchableError::Hook {
            script: path,
            status: output.status,
            output: stdout,
        });
    }

    Ok(HookResult::Ran { output: stdout })
}
