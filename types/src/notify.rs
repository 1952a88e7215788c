//! Outbound notifications.
//!
//! The core fires these and never waits on delivery; whatever implements
//! [`Notifier`] owns retries, templates and transport.

use crate::event::EventStatus;
use crate::hash::ContentHash;
use crate::id::{CommitmentId, EntryId, EventId, PollId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// An event entered a status that locks project submissions.
    SubmissionsLocked { event: EventId, status: EventStatus },
    EventFinalized { event: EventId },
    TieBreakerCreated {
        parent: PollId,
        tie_breaker: PollId,
        entries: Vec<EntryId>,
    },
    /// A stored commitment no longer matches its payload.
    IntegrityFailure {
        event: EventId,
        commitment: CommitmentId,
        stored: ContentHash,
        recomputed: ContentHash,
    },
}

/// Fire-and-forget sink for [`Notification`]s. Must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}
