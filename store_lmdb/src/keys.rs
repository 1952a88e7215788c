//! Composite keys and typed record access.
//!
//! Keys are id parts joined by a `0x00` separator. Identifiers never contain
//! NUL, so `parent ++ 0x00` is an exact prefix for every child of `parent`.

use std::ops::Bound;

use heed::types::Bytes;
use heed::{Database, RoTxn, RwTxn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::LmdbError;

pub(crate) const SEP: u8 = 0x00;

/// Join key parts with the separator.
pub(crate) fn composite(parts: &[&[u8]]) -> Vec<u8> {
    let len = parts.iter().map(|p| p.len() + 1).sum();
    let mut key = Vec::with_capacity(len);
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(SEP);
        }
        key.extend_from_slice(part);
    }
    key
}

/// The scan prefix covering every key whose first part is `parent`.
pub(crate) fn child_prefix(parent: &[u8]) -> Vec<u8> {
    let mut prefix = parent.to_vec();
    prefix.push(SEP);
    prefix
}

/// Turn `prefix` into the smallest key greater than every key it prefixes.
pub(crate) fn increment_prefix(prefix: &mut Vec<u8>) {
    while let Some(last) = prefix.pop() {
        if last < 0xFF {
            prefix.push(last + 1);
            return;
        }
    }
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

pub(crate) fn get_record<T: DeserializeOwned>(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    key: &[u8],
) -> Result<Option<T>, LmdbError> {
    match db.get(txn, key)? {
        Some(bytes) => Ok(Some(decode(bytes)?)),
        None => Ok(None),
    }
}

pub(crate) fn put_record<T: Serialize>(
    db: &Database<Bytes, Bytes>,
    txn: &mut RwTxn,
    key: &[u8],
    value: &T,
) -> Result<(), LmdbError> {
    let bytes = encode(value)?;
    db.put(txn, key, &bytes)?;
    Ok(())
}

/// Raw `(key, value)` pairs under `prefix`, in key order.
pub(crate) fn scan_raw(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    prefix: &[u8],
) -> Result<Vec<(Vec<u8>, Vec<u8>)>, LmdbError> {
    let mut upper = prefix.to_vec();
    increment_prefix(&mut upper);

    let bounds = if upper.is_empty() {
        (Bound::Included(prefix), Bound::Unbounded)
    } else {
        (Bound::Included(prefix), Bound::Excluded(upper.as_slice()))
    };
    let mut out = Vec::new();
    for result in db.range(txn, &bounds)? {
        let (key, val) = result?;
        out.push((key.to_vec(), val.to_vec()));
    }
    Ok(out)
}

/// Decoded records under `prefix`, in key order.
pub(crate) fn scan_records<T: DeserializeOwned>(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    prefix: &[u8],
) -> Result<Vec<T>, LmdbError> {
    scan_raw(db, txn, prefix)?
        .into_iter()
        .map(|(_, val)| decode(&val))
        .collect()
}

pub(crate) fn utf8(bytes: Vec<u8>) -> Result<String, LmdbError> {
    String::from_utf8(bytes).map_err(|e| LmdbError::Serialization(e.to_string()))
}
