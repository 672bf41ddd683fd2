//! Supervised-service descriptors for discovered executables.
//!
//! Every executable runs through the same wrapper chain: lift resource
//! limits, drop to the launchable's user and scope the environment to its
//! config directory. The shape is fixed and not configurable per call.

use super::{Executable, Launchable};
use crate::supervisor::ServiceTemplate;

pub const NOLIMIT: &str = "/usr/bin/nolimit";
pub const CHPST: &str = "/usr/bin/chpst";

/// `nolimit chpst -u <run-as> -C <config-dir> <exec-path>`
pub fn invocation(launchable: &Launchable, executable: &Executable) -> Vec<String> {
    vec![
        NOLIMIT.to_string(),
        CHPST.to_string(),
        "-u".to_string(),
        launchable.run_as.clone(),
        "-C".to_string(),
        launchable.config_dir.to_string_lossy().to_string(),
        executable.exec_path.to_string_lossy().to_string(),
    ]
}

/// Template named after the launchable with one entry per executable.
pub fn service_template(launchable: &Launchable, executables: &[Executable]) -> ServiceTemplate {
    let mut template = ServiceTemplate::new(&launchable.id);
    for executable in executables {
        template.add_entry(executable.name(), invocation(launchable, executable));
    }
    template
}
