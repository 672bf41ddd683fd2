//! Error types for launchable lifecycle operations.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use crate::fetch::FetchError;
use crate::supervisor::SupervisorError;

pub type Result<T> = std::result::Result<T, LaunchableError>;

/// Errors surfaced by the lifecycle engine.
///
/// Nothing here is retried or treated as fatal; every variant is handed back
/// to the caller, who owns retry policy.
#[derive(Debug, thiserror::Error)]
pub enum LaunchableError {
    #[error("Failed to fetch {location}: {source}")]
    Fetch {
        location: String,
        #[source]
        source: FetchError,
    },

    #[error("Artifact location '{location}' yields unusable version '{version}'")]
    InvalidVersion { location: String, version: String },

    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to extract archive into {}: {source}", .dest.display())]
    Archive {
        dest: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Hook script {} exited with {status}", .script.display())]
    Hook {
        script: PathBuf,
        status: ExitStatus,
        output: String,
    },

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error("Failed to stop service {service}: {source}")]
    StopFailed {
        service: String,
        outputs: Vec<String>,
        #[source]
        source: SupervisorError,
    },
}

impl LaunchableError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// True when the root cause is a missing file or directory.
    ///
    /// `executables()` on a launchable that was never installed fails this way.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            Self::Fetch {
                source: FetchError::Io(source),
                ..
            } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Captured standard output of a failed hook script.
    pub fn hook_output(&self) -> Option<&str> {
        match self {
            Self::Hook { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Per-executable stop outputs collected before a stop failure.
    pub fn stop_outputs(&self) -> Option<&[String]> {
        match self {
            Self::StopFailed { outputs, .. } => Some(outputs),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_detected_through_io_variant() {
        let err = LaunchableError::io(
            "stat",
            "/srv/app/installs/v1/bin/launch",
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(err.is_not_found());
        assert!(err.to_string().contains("/srv/app/installs/v1/bin/launch"));
    }

    #[test]
    fn permission_denied_is_not_not_found() {
        let err = LaunchableError::io(
            "stat",
            "/srv/app",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(!err.is_not_found());
        assert!(err.hook_output().is_none());
        assert!(err.stop_outputs().is_none());
    }
}
