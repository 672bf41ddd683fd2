//! Gzip-compressed tar extraction
//!
//! Only regular files are materialized. Directory entries are skipped because
//! parent directories are created on demand for every file, and each file gets
//! the permission bits recorded in its header.

use std::fs::{self, OpenOptions};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::EntryType;

use crate::error::{LaunchableError, Result};

/// Unpack a `.tar.gz` stream into `dest`.
///
/// Decompression and archive-format errors abort the extraction. No checksum
/// is verified; artifact integrity belongs to the fetcher.
pub fn extract_tar_gz<R: Read>(reader: R, dest: &Path) -> Result<()> {
    let archive_err = |source: io::Error| LaunchableError::Archive {
        dest: dest.to_path_buf(),
        source,
    };

    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    let mut written = 0usize;

    for entry in archive.entries().map_err(archive_err)? {
        let mut entry = entry.map_err(archive_err)?;

        match entry.header().entry_type() {
            EntryType::Regular | EntryType::Continuous => {}
            EntryType::Directory => continue,
            other => {
                tracing::debug!(entry_type = ?other, "Skipping non-regular archive entry");
                continue;
            }
        }

        let relative = entry.path().map_err(archive_err)?.into_owned();
        let Some(target) = enclosed_path(dest, &relative) else {
            tracing::warn!(path = %relative.display(), "Skipping archive entry outside destination");
            continue;
        };
        let mode = entry.header().mode().map_err(archive_err)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| LaunchableError::io("create directory", parent, e))?;
        }

        let mut file = open_for_write(&target, mode)
            .map_err(|e| LaunchableError::io("create file", &target, e))?;
        io::copy(&mut entry, &mut file).map_err(archive_err)?;
        set_mode(&target, mode).map_err(|e| LaunchableError::io("set permissions on", &target, e))?;
        written += 1;
    }

    tracing::debug!(dest = %dest.display(), files = written, "Extracted archive");
    Ok(())
}

/// Join an archive path onto `dest`, refusing absolute paths and `..`.
fn enclosed_path(dest: &Path, relative: &Path) -> Option<PathBuf> {
    let mut out = dest.to_path_buf();
    let mut depth = 0usize;
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (depth > 0).then_some(out)
}

#[cfg(unix)]
fn open_for_write(path: &Path, mode: u32) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode & 0o7777)
        .open(path)
}

#[cfg(not(unix))]
fn open_for_write(path: &Path, _mode: u32) -> io::Result<fs::File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

// Creation modes are filtered through the umask; apply the header mode exactly.
#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
