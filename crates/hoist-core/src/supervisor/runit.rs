//! runit-backed supervisor driven through `servicebuilder` and `sv`.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{Service, ServiceTemplate, Supervisor, SupervisorError};

pub const DEFAULT_SERVICE_ROOT: &str = "/var/service";
pub const DEFAULT_TEMPLATE_DIR: &str = "/etc/servicebuilder.d";
pub const DEFAULT_SERVICEBUILDER: &str = "/usr/bin/servicebuilder";
pub const DEFAULT_SV: &str = "/usr/bin/sv";

/// Supervisor backed by runit.
///
/// Templates land in `template_dir` as `<name>.yaml`. The content is JSON,
/// which every YAML reader accepts, so servicebuilder can consume it as-is.
#[derive(Debug, Clone)]
pub struct RunitSupervisor {
    service_root: PathBuf,
    template_dir: PathBuf,
    servicebuilder: PathBuf,
    sv: PathBuf,
}

impl Default for RunitSupervisor {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_ROOT, DEFAULT_TEMPLATE_DIR)
    }
}

impl RunitSupervisor {
    pub fn new(service_root: impl Into<PathBuf>, template_dir: impl Into<PathBuf>) -> Self {
        Self {
            service_root: service_root.into(),
            template_dir: template_dir.into(),
            servicebuilder: PathBuf::from(DEFAULT_SERVICEBUILDER),
            sv: PathBuf::from(DEFAULT_SV),
        }
    }

    pub fn with_binaries(mut self, servicebuilder: impl Into<PathBuf>, sv: impl Into<PathBuf>) -> Self {
        self.servicebuilder = servicebuilder.into();
        self.sv = sv.into();
        self
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Path a template with the given name is written to.
    pub fn template_path(&self, name: &str) -> PathBuf {
        self.template_dir.join(format!("{}.yaml", name))
    }

    fn run(&self, program: &Path, args: &[&OsStr]) -> Result<String, SupervisorError> {
        let program_name = program.display().to_string();
        tracing::debug!(program = %program_name, ?args, "Running supervisor command");

        let output = Command::new(program)
            .args(args)
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| SupervisorError::Spawn {
                program: program_name.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            return Err(SupervisorError::Command {
                program: program_name,
                status: output.status,
                output: stdout,
            });
        }
        Ok(stdout)
    }
}

impl Supervisor for RunitSupervisor {
    fn service_root(&self) -> &Path {
        &self.service_root
    }

    fn write(&self, template: &ServiceTemplate) -> Result<PathBuf, SupervisorError> {
        let io_err = |action: &'static str, path: &Path| {
            let path = path.to_path_buf();
            move |source| SupervisorError::Io {
                action,
                path,
                source,
            }
        };

        fs::create_dir_all(&self.template_dir)
            .map_err(io_err("create directory", &self.template_dir))?;

        let path = self.template_path(&template.name);
        let tmp_path = self
            .template_dir
            .join(format!(".{}.yaml.{}.tmp", template.name, std::process::id()));

        let bytes = serde_json::to_vec_pretty(template)?;
        fs::write(&tmp_path, bytes).map_err(io_err("write", &tmp_path))?;
        fs::rename(&tmp_path, &path).map_err(io_err("rename", &tmp_path))?;

        tracing::debug!(path = %path.display(), services = template.entries.len(), "Wrote service template");
        Ok(path)
    }

    fn rebuild(&self) -> Result<String, SupervisorError> {
        self.run(
            &self.servicebuilder,
            &[
                OsStr::new("-c"),
                self.template_dir.as_os_str(),
                OsStr::new("-d"),
                self.service_root.as_os_str(),
            ],
        )
    }

    fn stop(&self, service: &Service) -> Result<String, SupervisorError> {
        self.run(&self.sv, &[OsStr::new("stop"), service.path.as_os_str()])
    }
}
