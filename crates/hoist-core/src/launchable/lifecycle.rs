//! Lifecycle sequencing against a process supervisor.
//!
//! Registering service definitions (`start`) and flipping the runtime switch
//! (`enable`) are separate steps, so definitions can be re-registered without
//! disturbing the enabled state. `launch` and `halt` compose them in mirror
//! order.

use serde::{Deserialize, Serialize};

use super::{Executable, Launchable, descriptor};
use crate::error::{LaunchableError, Result};
use crate::supervisor::{Supervisor, SupervisorError};

/// What `stop` does when the supervisor fails to stop one executable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopPolicy {
    /// Return at the first failure without touching the remaining services
    #[default]
    #[serde(alias = "abort-on-first-failure")]
    Abort,
    /// Attempt every service and report the first failure afterwards
    #[serde(alias = "continue-on-failure")]
    Continue,
}

/// A launchable bound to the supervisor that runs its services.
pub struct ServiceLifecycle<'a> {
    launchable: &'a Launchable,
    supervisor: &'a dyn Supervisor,
    stop_policy: StopPolicy,
}

impl<'a> ServiceLifecycle<'a> {
    pub fn new(launchable: &'a Launchable, supervisor: &'a dyn Supervisor) -> Self {
        Self {
            launchable,
            supervisor,
            stop_policy: StopPolicy::default(),
        }
    }

    pub fn with_stop_policy(mut self, stop_policy: StopPolicy) -> Self {
        self.stop_policy = stop_policy;
        self
    }

    pub fn launchable(&self) -> &Launchable {
        self.launchable
    }

    pub fn executables(&self) -> Result<Vec<Executable>> {
        self.launchable.executables(self.supervisor.service_root())
    }

    /// Write one service per executable and ask the supervisor to reconcile.
    ///
    /// No rollback happens when the write or rebuild fails.
    pub fn build_services(&self) -> Result<()> {
        let executables = self.executables()?;
        let template = descriptor::service_template(self.launchable, &executables);

        let path = self.supervisor.write(&template)?;
        tracing::info!(
            launchable = %self.launchable.id,
            services = executables.len(),
            path = %path.display(),
            "Wrote service definitions"
        );

        let output = self.supervisor.rebuild()?;
        tracing::debug!(launchable = %self.launchable.id, output = %output.trim_end(), "Rebuilt services");
        Ok(())
    }

    /// Ensure service definitions exist and are registered.
    ///
    /// Spawning the processes is left to the supervisor's reconciliation.
    pub fn start(&self) -> Result<()> {
        self.build_services()
    }

    /// Stop every executable's service in discovery order.
    ///
    /// Outputs are collected per service, including the failing one's. Under
    /// [`StopPolicy::Abort`] the first failure returns immediately and later
    /// services are never stopped.
    pub fn stop(&self) -> Result<Vec<String>> {
        let executables = self.executables()?;
        let mut outputs = Vec::with_capacity(executables.len());
        let mut first_failure: Option<(String, SupervisorError)> = None;

        for executable in &executables {
            match self.supervisor.stop(&executable.service) {
                Ok(output) => {
                    tracing::info!(service = %executable.name(), "Stopped service");
                    outputs.push(output);
                }
                Err(source) => {
                    tracing::warn!(service = %executable.name(), error = %source, "Failed to stop service");
                    outputs.push(source.output().unwrap_or_default().to_string());
                    let service = executable.name().to_string();
                    match self.stop_policy {
                        StopPolicy::Abort => {
                            return Err(LaunchableError::StopFailed {
                                service,
                                outputs,
                                source,
                            });
                        }
                        StopPolicy::Continue if first_failure.is_none() => {
                            first_failure = Some((service, source));
                        }
                        StopPolicy::Continue => {}
                    }
                }
            }
        }

        match first_failure {
            Some((service, source)) => Err(LaunchableError::StopFailed {
                service,
                outputs,
                source,
            }),
            None => Ok(outputs),
        }
    }

    /// Bring the launchable fully into service: start, then enable.
    pub fn launch(&self) -> Result<()> {
        self.start()?;
        let output = self.launchable.enable()?;
        tracing::info!(launchable = %self.launchable.id, version = self.launchable.version(), "Launched");
        if !output.is_empty() {
            tracing::debug!(launchable = %self.launchable.id, output = %output.trim_end(), "Enable hook output");
        }
        Ok(())
    }

    /// Take the launchable fully out of service: disable, then stop.
    pub fn halt(&self) -> Result<()> {
        let output = self.launchable.disable()?;
        if !output.is_empty() {
            tracing::debug!(launchable = %self.launchable.id, output = %output.trim_end(), "Disable hook output");
        }
        self.stop()?;
        tracing::info!(launchable = %self.launchable.id, "Halted");
        Ok(())
    }
}
