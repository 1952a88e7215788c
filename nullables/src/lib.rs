//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies (clock, storage, notification delivery) are
//! abstracted behind traits. This crate provides implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! `NullStore` doubles as the node's `memory` storage backend.

pub mod clock;
pub mod notifier;
pub mod store;

pub use clock::NullClock;
pub use notifier::NullNotifier;
pub use store::NullStore;
