//! Version manifest fetching and parsing.
//!
//! The update server publishes one small JSON document per application
//! and platform:
//!
//! ```json
//! { "Version": "2.0", "Sha256": "<base64 digest>" }
//! ```
//!
//! The digest is the SHA-256 of the *uncompressed* new binary and is
//! verified uniformly against both the patched and the fully downloaded
//! candidate.

use crate::errors::UpdateError;
use crate::requester::Requester;
use anyhow::anyhow;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer};
use tracing::debug;

/// Size of a SHA-256 digest in bytes.
pub const SHA256_LEN: usize = 32;

/// The remote version descriptor, immutable once fetched.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    #[serde(rename = "Version")]
    pub version: String,
    /// SHA-256 digest of the new binary, base64-encoded in transit.
    #[serde(rename = "Sha256", deserialize_with = "base64_bytes")]
    pub sha256: Vec<u8>,
}

fn base64_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = String::deserialize(deserializer)?;
    STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
}

/// Fetches and validates the manifest for one app/platform pair.
///
/// The request target is `{api_url}{app}/{platform}.json` with both
/// path segments URL-escaped; `api_url` is expected to end with `/`.
/// No retry happens here; retry policy belongs to the transport.
pub async fn fetch_manifest(
    requester: &dyn Requester,
    api_url: &str,
    app: &str,
    platform: &str,
) -> Result<VersionManifest, UpdateError> {
    let url = format!(
        "{}{}/{}.json",
        api_url,
        urlencoding::encode(app),
        urlencoding::encode(platform)
    );
    debug!(%url, "fetching version manifest");

    let body = requester
        .fetch(&url)
        .await
        .map_err(UpdateError::Manifest)?
        .ok_or_else(|| UpdateError::Manifest(anyhow!("requester returned success with no body for {}", url)))?;

    let manifest: VersionManifest =
        serde_json::from_slice(&body).map_err(|e| UpdateError::Manifest(anyhow!("malformed manifest: {}", e)))?;

    if manifest.sha256.len() != SHA256_LEN {
        return Err(UpdateError::Manifest(anyhow!(
            "manifest digest is {} bytes, expected {}",
            manifest.sha256.len(),
            SHA256_LEN
        )));
    }

    Ok(manifest)
}
