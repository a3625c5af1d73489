//! Newline-delimited JSON backing files.
//!
//! One file per collection, one JSON object per line, no trailing delimiter.
//! An empty file is a valid empty collection. Writes go through
//! [`crate::fs::write_atomic`], so a reader sees either the previous complete
//! file or the new one.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use super::types::Ownership;
use crate::error::{DashError, Result};

/// Create an empty backing file at `path` if none exists.
pub fn ensure(path: &Path) -> Result<()> {
    crate::fs::ensure_file(path)
}

/// Read every record object from the backing file.
///
/// Blank lines are skipped, so a trailing newline written by another tool is
/// tolerated.
///
/// # Errors
///
/// Returns `DashError::Persistence` if the file cannot be read, or
/// `DashError::Serialization` naming the first line that is not a JSON object
/// (including a line that is not valid UTF-8).
pub fn load(path: &Path) -> Result<Vec<Map<String, Value>>> {
    let contents = fs::read(path).map_err(|e| {
        DashError::Persistence(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse(&contents).map_err(|(line, reason)| {
        DashError::Serialization(format!("{} line {}: {}", path.display(), line, reason))
    })
}

/// Replace the backing file with `objects`, one per line.
///
/// # Errors
///
/// Returns `DashError::Persistence` on any I/O failure; the previous file is
/// left intact in that case.
pub fn save(path: &Path, objects: &[Map<String, Value>], owner: Option<&Ownership>) -> Result<()> {
    let contents = render(objects)?;
    crate::fs::write_atomic(path, contents.as_bytes(), owner)
}

/// Serialize `objects` exactly as [`save`] writes them.
pub fn render(objects: &[Map<String, Value>]) -> Result<String> {
    let lines = objects
        .iter()
        .map(serde_json::to_string)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

fn parse(contents: &[u8]) -> std::result::Result<Vec<Map<String, Value>>, (usize, String)> {
    let mut objects = Vec::new();
    for (index, line) in contents.split(|&byte| byte == b'\n').enumerate() {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<Value>(line) {
            Ok(Value::Object(object)) => objects.push(object),
            Ok(_) => return Err((index + 1, "not a JSON object".to_string())),
            Err(e) => return Err((index + 1, e.to_string())),
        }
    }
    Ok(objects)
}
