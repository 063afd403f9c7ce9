//! Atomic in-place replacement of the target executable.
//!
//! The candidate is written to a sibling temp file first so the final
//! rename stays on one filesystem and is therefore atomic. The swap is
//! `target -> .name.old`, then `.name.new -> target`; the two renames
//! are strictly ordered and the first must have fully succeeded (or
//! been rolled back) before the second is attempted. At no observable
//! point does the target path reference a half-written file.
//!
//! Caller precondition: this process must not hold an open handle on
//! the target — on Windows a file cannot be renamed while open by the
//! same process.

use crate::errors::UpdateError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Replaces the file at `target` with `candidate`, with rollback.
///
/// On success the previous binary is gone (or hidden, where removal is
/// blocked by the platform). On failure the previous binary is back at
/// `target`, except in the dual-failure case reported as
/// [`UpdateError::Rollback`].
pub fn install(target: &Path, candidate: &[u8]) -> Result<(), UpdateError> {
    let new_path = sibling(target, "new")?;
    let old_path = sibling(target, "old")?;

    fs::write(&new_path, candidate).map_err(UpdateError::Install)?;
    copy_permissions(target, &new_path).map_err(UpdateError::Install)?;

    // A stale backup from a previous failed run would block the rename.
    match fs::remove_file(&old_path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(UpdateError::Install(e)),
        _ => {}
    }

    // Move the current binary out of the way. Failing here leaves the
    // target untouched.
    fs::rename(target, &old_path).map_err(UpdateError::Install)?;

    if let Err(install_err) = fs::rename(&new_path, target) {
        // Put the old binary back. If even that fails, the target is in
        // a renamed-but-not-restored state and both causes must be
        // visible to the operator.
        return match fs::rename(&old_path, target) {
            Ok(()) => Err(UpdateError::Install(install_err)),
            Err(rollback_err) => Err(UpdateError::Rollback {
                install: install_err,
                rollback: rollback_err,
            }),
        };
    }

    if let Err(err) = fs::remove_file(&old_path) {
        // Windows may refuse while a handle is still transitioning;
        // hiding the leftover is good enough, never fatal.
        warn!(path = %old_path.display(), error = %err, "could not remove backup binary, hiding it instead");
        if let Err(err) = hide_file(&old_path) {
            warn!(path = %old_path.display(), error = %err, "could not hide backup binary");
        }
    }

    Ok(())
}

/// Builds the hidden sibling path `.<name>.<suffix>` next to `target`.
fn sibling(target: &Path, suffix: &str) -> Result<PathBuf, UpdateError> {
    let name = target.file_name().ok_or_else(|| {
        UpdateError::Install(io::Error::new(
            io::ErrorKind::InvalidInput,
            "update target has no file name",
        ))
    })?;
    Ok(target.with_file_name(format!(".{}.{}", name.to_string_lossy(), suffix)))
}

#[cfg(unix)]
fn copy_permissions(from: &Path, to: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(from)?.permissions().mode();
    fs::set_permissions(to, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn copy_permissions(_from: &Path, _to: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(windows)]
fn hide_file(path: &Path) -> io::Result<()> {
    use std::os::windows::ffi::OsStrExt;
    use winapi::um::fileapi::SetFileAttributesW;
    use winapi::um::winnt::FILE_ATTRIBUTE_HIDDEN;

    let wide: Vec<u16> = path.as_os_str().encode_wide().chain(std::iter::once(0)).collect();
    let ok = unsafe { SetFileAttributesW(wide.as_ptr(), FILE_ATTRIBUTE_HIDDEN) };
    if ok == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(windows))]
fn hide_file(_path: &Path) -> io::Result<()> {
    Ok(())
}
