//! HTTP API for a verdict node.
//!
//! Organizers manage events, polls, entries and the electorate; members
//! submit ballots; auditors read commitments and verify them. All of it is
//! JSON over `/api/v1`, with errors as `{"error": code, "message": text}`.

pub mod error;
pub mod handlers;
pub mod pagination;
pub mod server;

pub use error::{RpcError, RpcResult};
pub use server::{router, RpcServer};
