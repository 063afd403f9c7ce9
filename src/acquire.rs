//! Candidate binary acquisition: incremental patch and full download.
//!
//! Neither path verifies the checksum — verification belongs to the
//! orchestrator so it is applied uniformly to both.

use crate::errors::UpdateError;
use crate::patcher::Patcher;
use crate::requester::Requester;
use anyhow::anyhow;
use flate2::read::GzDecoder;
use std::io::Read;
use tracing::debug;
use urlencoding::encode;

/// Where to fetch an incremental patch from.
pub struct PatchSource<'a> {
    pub diff_url: &'a str,
    pub app: &'a str,
    pub from_version: &'a str,
    pub to_version: &'a str,
    pub platform: &'a str,
}

/// Where to fetch a full replacement binary from.
pub struct BinarySource<'a> {
    pub bin_url: &'a str,
    pub app: &'a str,
    pub to_version: &'a str,
    pub platform: &'a str,
}

/// Fetches the patch for `from_version -> to_version` and applies it to
/// the old binary, yielding the candidate new binary.
///
/// Transport errors propagate as [`UpdateError::Transport`]; a failed
/// transform becomes [`UpdateError::PatchApply`].
pub async fn fetch_and_apply_patch(
    requester: &dyn Requester,
    patcher: &dyn Patcher,
    old: &[u8],
    source: &PatchSource<'_>,
) -> Result<Vec<u8>, UpdateError> {
    let url = format!(
        "{}{}/{}/{}/{}",
        source.diff_url,
        encode(source.app),
        encode(source.from_version),
        encode(source.to_version),
        encode(source.platform)
    );
    debug!(%url, "fetching binary patch");

    let patch = requester
        .fetch(&url)
        .await
        .map_err(UpdateError::Transport)?
        .ok_or_else(|| UpdateError::Transport(anyhow!("requester returned success with no body for {}", url)))?;

    patcher.patch(old, &patch).map_err(UpdateError::PatchApply)
}

/// Fetches the gzip-compressed full binary and inflates it in memory.
pub async fn fetch_full_binary(
    requester: &dyn Requester,
    source: &BinarySource<'_>,
) -> Result<Vec<u8>, UpdateError> {
    let url = format!(
        "{}{}/{}/{}.gz",
        source.bin_url,
        encode(source.app),
        encode(source.to_version),
        encode(source.platform)
    );
    debug!(%url, "fetching full binary");

    let compressed = requester
        .fetch(&url)
        .await
        .map_err(UpdateError::FullBinary)?
        .ok_or_else(|| UpdateError::FullBinary(anyhow!("requester returned success with no body for {}", url)))?;

    let mut binary = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut binary)
        .map_err(|e| UpdateError::FullBinary(anyhow!("could not decompress binary: {}", e)))?;

    Ok(binary)
}
