//! LMDB storage backend for verdict.
//!
//! Implements all storage traits from `verdict-store` using the `heed` LMDB
//! bindings. Each record family maps to one named database within a single
//! environment, so conditional operations spanning families (a ballot plus
//! its member's consumed flag) commit in one write transaction.

pub mod ballot;
pub mod commitment;
pub mod electorate;
pub mod entry;
pub mod environment;
pub mod error;
pub mod event;
mod keys;
pub mod participation;
pub mod poll;

#[cfg(test)]
mod fixtures;

pub use environment::{LmdbStore, CURRENT_SCHEMA_VERSION, DEFAULT_MAP_SIZE};
pub use error::LmdbError;
