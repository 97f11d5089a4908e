//! Writing rendered build output

use crate::{Error, NormalizedPath, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Replace the file at `path` with a rendered build.
///
/// The stream is staged in a hidden sibling file and renamed into place, so
/// readers of the output file see either the previous build or the complete
/// new one. The staging file is removed when any step fails.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let target = path.to_native();

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let staging = staging_path(&target);
    let result = stage(&staging, &target, content)
        .and_then(|()| fs::rename(&staging, &target).map_err(|e| Error::io(&target, e)));

    if result.is_err() {
        if let Err(e) = fs::remove_file(&staging) {
            tracing::debug!(path = %staging.display(), error = %e, "Staging file not removed");
        }
    }
    result
}

/// `.<name>.<pid>.kust` next to the target, on the same filesystem.
fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.{}.kust", std::process::id()))
}

fn stage(staging: &Path, target: &Path, content: &[u8]) -> Result<()> {
    let mut file: File = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(staging)
        .map_err(|e| Error::io(staging, e))?;

    let lock_failed = |_| Error::LockFailed {
        path: target.to_path_buf(),
    };
    file.lock_exclusive().map_err(lock_failed)?;
    file.write_all(content).map_err(|e| Error::io(staging, e))?;
    file.sync_all().map_err(|e| Error::io(staging, e))?;
    file.unlock().map_err(lock_failed)
}
