//! Filesystem utilities for atomic operations.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{DashError, Result};
use crate::storage::Ownership;

/// Path of the temporary sibling used while replacing `path`.
///
/// The temp file lives in the same directory as the target so the final
/// rename never crosses a filesystem boundary.
pub fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let parent = parent_dir(path);
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| DashError::Persistence(format!("Invalid file path: {}", path.display())))?;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| DashError::Persistence(format!("System time error: {}", e)))?
        .as_nanos();
    Ok(parent.join(format!(
        ".{}.{}.{}.tmp",
        filename,
        std::process::id(),
        nanos
    )))
}

/// Replace the contents of `path` with `data` atomically.
///
/// Readers observe either the previous complete file or the new one. The
/// optional ownership is applied to the temp file before the rename so the
/// target never appears with the wrong owner. On failure the previous file is
/// untouched and the temp file is removed.
///
/// The destination is only ever replaced by a single `fs::rename`, which
/// overwrites an existing file on every supported platform. It is never
/// removed first.
pub fn write_atomic(path: &Path, data: &[u8], owner: Option<&Ownership>) -> Result<()> {
    let temp_path = temp_path_for(path)?;

    let result = write_temp(&temp_path, data, owner).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|e| {
            DashError::Persistence(format!(
                "Atomic rename to {} failed: {}",
                path.display(),
                e
            ))
        })
    });
    if result.is_err() {
        remove_temp(&temp_path);
    }
    result
}

/// Create an empty file at `path` if none exists, along with missing parent directories.
///
/// Existing content is never truncated.
pub fn ensure_file(path: &Path) -> Result<()> {
    if path.is_file() {
        return Ok(());
    }
    let parent = parent_dir(path);
    fs::create_dir_all(parent).map_err(|e| {
        DashError::Persistence(format!(
            "Failed to create directory {}: {}",
            parent.display(),
            e
        ))
    })?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            DashError::Persistence(format!("Failed to create {}: {}", path.display(), e))
        })?;
    Ok(())
}

fn write_temp(temp_path: &Path, data: &[u8], owner: Option<&Ownership>) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)
        .map_err(|e| DashError::Persistence(format!("Temp file create failed: {}", e)))?;
    file.write_all(data)
        .map_err(|e| DashError::Persistence(format!("Temp file write failed: {}", e)))?;
    file.sync_all()
        .map_err(|e| DashError::Persistence(format!("Temp file sync failed: {}", e)))?;

    if let Some(owner) = owner {
        apply_ownership(temp_path, owner)?;
    }
    Ok(())
}

#[cfg(unix)]
fn apply_ownership(path: &Path, owner: &Ownership) -> Result<()> {
    if owner.is_empty() {
        return Ok(());
    }
    std::os::unix::fs::chown(path, owner.uid, owner.gid).map_err(|e| {
        DashError::Persistence(format!(
            "Failed to change owner of {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(not(unix))]
fn apply_ownership(path: &Path, owner: &Ownership) -> Result<()> {
    if !owner.is_empty() {
        tracing::warn!(path = %path.display(), "file ownership is not supported on this platform");
    }
    Ok(())
}

fn remove_temp(temp_path: &Path) {
    if let Err(err) = fs::remove_file(temp_path) {
        if err.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %temp_path.display(), error = %err, "failed to remove temp file");
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
