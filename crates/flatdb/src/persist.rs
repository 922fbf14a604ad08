//! Whole-file reads and atomic whole-file writes.

use std::fs;
use std::io::{self, Write as _};
use std::path::Path;

use tracing::warn;

/// Reads the whole file at `path`.
///
/// Returns [`None`] if the file doesn't exist.
pub fn read_file(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Replaces the file at `path` with `bytes`.
///
/// The bytes are written and synced to a temporary file in the same directory, which is then
/// renamed over `path`. Readers see either the previous content or the new one, never a partial
/// write. On failure the previous file is left untouched and the temporary file is removed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::other("table path has no parent directory"))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| io::Error::other("table path has no file name"))?;

    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;

    // keep the permissions of the file being replaced
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }

    temp.persist(path).map_err(|err| err.error)?;

    // the rename is already done
    if let Err(err) = sync_dir(dir) {
        warn!(dir = %dir.display(), "failed to sync directory after rename: {err}");
    }

    Ok(())
}

/// Syncs the directory entry of a rename to disk.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
