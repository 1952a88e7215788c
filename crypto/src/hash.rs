//! Blake2b-256 digests for commitment payloads.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use verdict_types::ContentHash;

type Blake2b256 = Blake2b<U32>;

pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Blake2b256::digest(data));
    out
}

/// Digest of an already-canonical payload text.
///
/// Callers must pass the output of [`canonicalize_str`](crate::canonicalize_str)
/// or [`canonical_json`](crate::canonical_json); two payloads that differ
/// only in key order or whitespace hash differently otherwise.
pub fn digest_canonical(canonical: &str) -> ContentHash {
    ContentHash::new(blake2b_256(canonical.as_bytes()))
}
