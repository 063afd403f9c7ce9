//! Content integrity verification.

use sha2::{Digest, Sha256};

/// Returns true when `bytes` hashes to exactly `expected`.
///
/// Pure function, no I/O. The same digest from the manifest is applied
/// to both the patched and the fully downloaded candidate, so a
/// corrupted transfer is caught before any file is touched.
pub fn verify_sha256(bytes: &[u8], expected: &[u8]) -> bool {
    Sha256::digest(bytes).as_slice() == expected
}
