//! Abstract storage traits for verdict.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits, usually
//! through the combined [`Store`] object.
//!
//! Operations that guard an invariant (`update_event_if_status`,
//! `cast_ballot`, `upsert_commitment`, `anchor_if_unset`) are conditional
//! and must be atomic within the backend.

pub mod ballot;
pub mod commitment;
pub mod electorate;
pub mod entry;
pub mod error;
pub mod event;
pub mod participation;
pub mod poll;

pub use ballot::{BallotStore, CastOutcome, PollSnapshot};
pub use commitment::CommitmentStore;
pub use electorate::ElectorateStore;
pub use entry::EntryStore;
pub use error::StoreError;
pub use event::EventStore;
pub use participation::ParticipationStore;
pub use poll::PollStore;

/// Every record family in one object, as held by the node.
pub trait Store:
    EventStore
    + PollStore
    + EntryStore
    + ElectorateStore
    + BallotStore
    + CommitmentStore
    + ParticipationStore
    + Send
    + Sync
{
}

impl<T> Store for T where
    T: EventStore
        + PollStore
        + EntryStore
        + ElectorateStore
        + BallotStore
        + CommitmentStore
        + ParticipationStore
        + Send
        + Sync
{
}
