use crate::errors::{ExitError, Result};

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Sibling path the payload is staged at before being renamed into place.
fn staging_path(file_path: &Path) -> PathBuf {
    let fname = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    file_path.with_file_name(format!(".{}.tmp", fname))
}

/// Writes ``value`` as pretty JSON to ``file_path``. The file either holds the complete
/// payload or is left untouched.
pub fn write_json_atomically<T: Serialize>(file_path: &Path, value: &T) -> Result<()> {
    if let Some(p) = file_path.parent() {
        if !p.as_os_str().is_empty() {
            fs::create_dir_all(p)?;
        }
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ExitError::json(&file_path.display().to_string(), e))?;

    let staged = staging_path(file_path);
    if let Err(e) = fs::write(&staged, json) {
        fs::remove_file(&staged).ok();
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&staged, file_path) {
        fs::remove_file(&staged).ok();
        return Err(e.into());
    }
    debug!("Wrote {}", file_path.display());
    Ok(())
}

/// Parses ``data`` as JSON, describing it as ``what`` in errors.
pub fn parse_json<T: DeserializeOwned>(what: &str, data: &str) -> Result<T> {
    serde_json::from_str(data).map_err(|e| ExitError::json(what, e))
}

/// Reads and parses the JSON file at ``file_path``.
pub fn read_json<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let data = fs::read_to_string(file_path)?;
    debug!("Read {}", file_path.display());
    parse_json(&file_path.display().to_string(), &data)
}
