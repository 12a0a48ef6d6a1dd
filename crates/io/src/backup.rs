// JSON backup files for the product store

use std::path::Path;

use crate::error::IoError;
pub use crate::store::Backup;

/// Write a backup as pretty-printed JSON.
pub fn write_backup(path: &Path, backup: &Backup) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(backup).map_err(|e| IoError::Json(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| IoError::Write(format!("{}: {e}", path.display())))
}

pub fn read_backup(path: &Path) -> Result<Backup, IoError> {
    let content = std::fs::read_to_string(path).map_err(|e| IoError::Open {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| IoError::Json(e.to_string()))
}
