//! The pluggable binary diff/patch transform.
//!
//! The engine never depends on a concrete diff algorithm; it only needs
//! `patch(old, diff(old, new)) == new`. [`Bsdiff`] is the default
//! implementation, matching the format the companion generator tooling
//! produces. Alternative transforms slot in through
//! [`Updater::with_patcher`](crate::Updater::with_patcher).

use anyhow::Result;

/// Produces a compact patch turning `old` into `new`.
///
/// Only used by tooling and tests; the runtime engine consumes patches,
/// it does not produce them.
pub trait Differ: Send + Sync {
    fn diff(&self, old: &[u8], new: &[u8]) -> Result<Vec<u8>>;
}

/// Applies a patch produced by the matching [`Differ`].
pub trait Patcher: Send + Sync {
    fn patch(&self, old: &[u8], patch: &[u8]) -> Result<Vec<u8>>;
}

/// bsdiff-format transform, the default for both directions.
pub struct Bsdiff;

impl Differ for Bsdiff {
    fn diff(&self, old: &[u8], new: &[u8]) -> Result<Vec<u8>> {
        let mut patch = Vec::new();
        bsdiff::diff(old, new, &mut patch)?;
        Ok(patch)
    }
}

impl Patcher for Bsdiff {
    fn patch(&self, old: &[u8], patch: &[u8]) -> Result<Vec<u8>> {
        let mut new = Vec::new();
        let mut reader = patch;
        bsdiff::patch(old, &mut reader, &mut new)?;
        Ok(new)
    }
}
