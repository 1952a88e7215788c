//! Cryptographic helpers for verdict.
//!
//! - **Blake2b-256** content digests for integrity commitments
//! - **Canonical JSON** so equal payloads always hash identically
//! - **Random identifiers** and voter tokens from the OS entropy source

pub mod canonical;
pub mod error;
pub mod hash;
pub mod token;

pub use canonical::{canonical_json, canonicalize_str, canonicalize_value, digest_payload};
pub use error::CryptoError;
pub use hash::{blake2b_256, digest_canonical};
pub use token::{random_hex, random_id, voter_token, DEFAULT_TOKEN_BYTES};
