#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

use hoist_core::fetch::FetchError;
use hoist_core::launchable::Launchable;
use hoist_core::supervisor::{Service, ServiceTemplate, Supervisor, SupervisorError};

/// Supervisor double that records every call in order.
pub struct RecordingSupervisor {
    root: PathBuf,
    pub calls: RefCell<Vec<String>>,
    pub templates: RefCell<Vec<ServiceTemplate>>,
    /// Services whose stop fails, with the output to report
    pub failing_stops: Vec<(String, String)>,
    pub fail_write: bool,
}

impl RecordingSupervisor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            calls: RefCell::new(Vec::new()),
            templates: RefCell::new(Vec::new()),
            failing_stops: Vec::new(),
            fail_write: false,
        }
    }

    pub fn failing_stop(mut self, service: &str, output: &str) -> Self {
        self.failing_stops
            .push((service.to_string(), output.to_string()));
        self
    }

    pub fn failing_write(mut self) -> Self {
        self.fail_write = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

fn command_failure(program: &str, output: &str) -> SupervisorError {
    SupervisorError::Command {
        program: program.to_string(),
        status: exit_status(1),
        output: output.to_string(),
    }
}

#[cfg(unix)]
fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8)
}

#[cfg(not(unix))]
fn exit_status(_code: i32) -> std::process::ExitStatus {
    std::process::ExitStatus::default()
}

impl Supervisor for RecordingSupervisor {
    fn service_root(&self) -> &Path {
        &self.root
    }

    fn write(&self, template: &ServiceTemplate) -> Result<PathBuf, SupervisorError> {
        self.calls.borrow_mut().push(format!("write {}", template.name));
        if self.fail_write {
            return Err(SupervisorError::Io {
                action: "write",
                path: self.root.join(&template.name),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            });
        }
        self.templates.borrow_mut().push(template.clone());
        Ok(self.root.join(format!("{}.yaml", template.name)))
    }

    fn rebuild(&self) -> Result<String, SupervisorError> {
        self.calls.borrow_mut().push("rebuild".to_string());
        Ok("rebuilt\n".to_string())
    }

    fn stop(&self, service: &Service) -> Result<String, SupervisorError> {
        self.calls.borrow_mut().push(format!("stop {}", service.name));
        match self
            .failing_stops
            .iter()
            .find(|(name, _)| name == &service.name)
        {
            Some((_, output)) => Err(command_failure("sv", output)),
            None => Ok(format!("ok: {}\n", service.name)),
        }
    }
}

pub fn launchable(root: &Path, version: &str) -> Launchable {
    Launchable {
        id: "web".to_string(),
        location: format!("https://artifacts.example.com/web/{}.tar.gz", version),
        run_as: "web".to_string(),
        config_dir: root.join("env"),
        root_dir: root.join("pods/web"),
    }
}

/// Build a `.tar.gz` holding the given files; directories are added for
/// every parent so extraction has to skip them.
pub fn tar_gz(files: &[(&str, &[u8], u32)]) -> Vec<u8> {
    gzip(&tar_with(files, &[]))
}

/// Like [`tar_gz`], but a block of garbage follows the files where the next
/// header should be.
pub fn tar_gz_with_garbage(files: &[(&str, &[u8], u32)]) -> Vec<u8> {
    gzip(&tar_with(files, &[0xAB; 512]))
}

fn tar_with(files: &[(&str, &[u8], u32)], trailer: &[u8]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    let mut dirs_added = Vec::new();

    for (path, data, mode) in files {
        let mut parent = Path::new(path).parent();
        let mut parents = Vec::new();
        while let Some(dir) = parent.filter(|d| !d.as_os_str().is_empty()) {
            parents.push(dir.to_path_buf());
            parent = dir.parent();
        }
        for dir in parents.into_iter().rev() {
            if dirs_added.contains(&dir) {
                continue;
            }
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            header.set_mode(0o700);
            header.set_cksum();
            builder
                .append_data(&mut header, format!("{}/", dir.display()), std::io::empty())
                .unwrap();
            dirs_added.push(dir);
        }

        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder.append_data(&mut header, path, *data).unwrap();
    }

    builder.get_mut().extend_from_slice(trailer);
    builder.into_inner().unwrap()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Fetcher double serving fixed archive bytes and counting calls.
pub fn serving(bytes: Vec<u8>, calls: &RefCell<usize>) -> impl Fn(&str, &Path) -> Result<(), FetchError> + '_ {
    move |_location: &str, dest: &Path| {
        *calls.borrow_mut() += 1;
        fs::write(dest, &bytes)?;
        Ok(())
    }
}

pub fn unreachable_fetcher(_location: &str, _dest: &Path) -> Result<(), FetchError> {
    Err(FetchError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "artifact server unreachable",
    )))
}

#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}
