//! Error types for the update engine.
//!
//! Every failure mode of an orchestration run maps to one variant of
//! [`UpdateError`], so callers can tell a network problem from a
//! corrupted transfer from a broken install without string matching.

use thiserror::Error;

/// Errors produced during an update run.
///
/// Patch-path failures (`Transport`, `PatchApply`, `HashMismatch` while
/// patching) are recovered internally by falling back to the full
/// binary download; everything that escapes to the caller went through
/// that fallback already or happened past the point of no return.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The version manifest could not be fetched or parsed.
    #[error("update manifest unavailable: {0}")]
    Manifest(anyhow::Error),

    /// Fetched content does not match the checksum from the manifest.
    #[error("new binary does not match the manifest checksum")]
    HashMismatch,

    /// The binary patch could not be fetched sensibly or applied.
    #[error("binary patch failed: {0}")]
    PatchApply(anyhow::Error),

    /// The full replacement binary could not be fetched or decompressed.
    #[error("full binary download failed: {0}")]
    FullBinary(anyhow::Error),

    /// The transport returned an error, or violated its contract by
    /// returning success with no body.
    #[error("transport request failed: {0}")]
    Transport(anyhow::Error),

    /// The rename sequence failed but the previous binary was restored.
    #[error("install failed: {0}")]
    Install(#[source] std::io::Error),

    /// The rename sequence failed *and* restoring the previous binary
    /// failed. The target may be left renamed-but-not-restored; both
    /// causes are carried so operators can see the whole picture.
    #[error("install failed ({install}) and rollback failed ({rollback}); manual recovery may be required")]
    Rollback {
        install: std::io::Error,
        rollback: std::io::Error,
    },

    /// Filesystem errors outside the install sequence (reading the
    /// current binary, resolving the target path).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
