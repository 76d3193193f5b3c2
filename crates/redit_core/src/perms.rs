//! Permission-bit bookkeeping across the edit lifecycle.
//!
//! The backend's checkout/checkin primitives alter mode bits as a side
//! effect; the mode captured before any store interaction is the one
//! restored at the very end of the session.

use crate::error::{ReditError, Result};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Captures a file's mode bits, rejecting multiply-linked files up front
/// (their identity under mode manipulation is ambiguous).
pub fn capture(path: &Path) -> Result<u32> {
    let meta = fs::metadata(path)?;
    let links = link_count(&meta);
    if links > 1 {
        return Err(ReditError::MultipleHardLinks {
            path: path.to_path_buf(),
            count: links,
        });
    }
    Ok(mode_bits(&meta))
}

/// Removes all write bits. Failures are warned and non-fatal: the backend
/// will complain on its own if it needed a read-only working copy.
pub fn strip_write(path: &Path) {
    match fs::metadata(path) {
        Ok(meta) => {
            let stripped = mode_bits(&meta) & !0o222;
            apply_mode(path, stripped);
        }
        Err(e) => warn!(path = %path.display(), "cannot stat for write-strip: {}", e),
    }
}

/// Restores previously captured mode bits. Failures are warned and
/// non-fatal.
pub fn restore(path: &Path, mode: u32) {
    apply_mode(path, mode);
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(mode)) {
        warn!(path = %path.display(), mode = format!("{:o}", mode), "chmod failed: {}", e);
    }
}

#[cfg(unix)]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(unix)]
fn link_count(meta: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.nlink()
}

#[cfg(not(unix))]
fn apply_mode(path: &Path, mode: u32) {
    let mut perms = match fs::metadata(path) {
        Ok(m) => m.permissions(),
        Err(_) => return,
    };
    perms.set_readonly(mode & 0o200 == 0);
    let _ = fs::set_permissions(path, perms);
}

#[cfg(not(unix))]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

#[cfg(not(unix))]
fn link_count(_meta: &fs::Metadata) -> u64 {
    1
}
