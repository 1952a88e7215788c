use serde::{Deserialize, Serialize};
use thiserror::Error;
use verdict_store::StoreError;
use verdict_types::{EventId, EventStatus};

/// The guard that stopped a manual status change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum TransitionGuard {
    #[error("event is finalized")]
    Finalized,
    #[error("voting has closed")]
    VotingClosed,
    #[error("event has ended")]
    EventEnded,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Error)]
#[error("status transition {from} -> {to} denied: {guard}")]
pub struct TransitionDenied {
    pub from: EventStatus,
    pub to: EventStatus,
    pub guard: TransitionGuard,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Denied(#[from] TransitionDenied),

    /// The stored status moved between read and conditional write.
    #[error("event {event} changed status concurrently (expected {expected})")]
    Conflict { event: EventId, expected: EventStatus },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
