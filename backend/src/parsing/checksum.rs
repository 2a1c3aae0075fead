//! Content checksums for uploaded light curves.

use sha2::{Digest, Sha256};

/// Calculate SHA-256 checksum of raw light-curve text.
///
/// # Returns
/// Hexadecimal string representation of the hash.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Stable source identifier derived from content: `lc-` plus 12 hex chars.
pub fn source_id_for(content: &str) -> String {
    let checksum = calculate_checksum(content);
    format!("lc-{}", &checksum[..12])
}
