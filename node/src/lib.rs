//! The verdict node.
//!
//! [`VerdictNode`] ties the domain crates to a storage backend, a clock and a
//! notifier, and is the single entry point for the RPC layer and the daemon:
//! - event, poll, entry and electorate setup (`admin`)
//! - ballot submission, tallies and tie-breakers (`voting`)
//! - manual and date-driven status transitions (`status`)
//! - commitments, verification and participation history (`integrity`)

pub mod admin;
pub mod config;
pub mod error;
pub mod integrity;
pub mod locks;
pub mod metrics;
pub mod node;
pub mod notify;
pub mod requests;
pub mod scheduler;
pub mod shutdown;
pub mod status;
pub mod tracing_spans;
pub mod voting;

pub use config::{NodeConfig, StorageBackend};
pub use error::NodeError;
pub use locks::MemberLocks;
pub use metrics::NodeMetrics;
pub use node::VerdictNode;
pub use notify::{ChannelNotifier, FanoutNotifier, LogNotifier};
pub use requests::{NewEntry, NewEvent, NewPoll};
pub use scheduler::spawn_reconcile_loop;
pub use shutdown::ShutdownController;
