//! Canonical hashing of source data for cache keys.

use std::collections::BTreeMap;

use serde_json::Value;
use sha2::Digest;

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

/// Hash of a source-data map in canonical form.
///
/// The map is ordered, so serializing it yields the same bytes for the
/// same logical content regardless of insertion order.
pub fn source_data_hash(data: &BTreeMap<String, Value>) -> String {
    let bytes = serde_json::to_vec(data).unwrap_or_default();
    sha256_hex(&bytes)
}
