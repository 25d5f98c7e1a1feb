//! Shared filesystem helpers for the cache directories.

use std::fs;
use std::io::Write;
use std::path::Path;

use color_eyre::{eyre::eyre, Result};
use tempfile::NamedTempFile;

/// Create `dir` if absent.
///
/// Losing a directory-creation race to a concurrent writer counts as
/// success; the directory existing is the only postcondition.
pub fn ensure_dir(dir: &Path) -> Result<()> {
  fs::create_dir_all(dir)
    .map_err(|e| eyre!("Failed to create cache directory {}: {}", dir.display(), e))
}

/// Write `bytes` to `path` atomically.
///
/// Stages into a temporary file in the target directory and renames it into
/// place: `path` either holds the complete document or does not exist.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
  let dir = path
    .parent()
    .ok_or_else(|| eyre!("Cache path {} has no parent directory", path.display()))?;

  let mut staging = NamedTempFile::new_in(dir)
    .map_err(|e| eyre!("Failed to create staging file in {}: {}", dir.display(), e))?;

  staging
    .write_all(bytes)
    .map_err(|e| eyre!("Failed to write staging file for {}: {}", path.display(), e))?;

  staging
    .persist(path)
    .map_err(|e| eyre!("Failed to move staging file into {}: {}", path.display(), e))?;

  Ok(())
}
