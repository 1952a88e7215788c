//! Denormalized "who did what in which event" records for reporting.

use crate::id::{EventId, PollId};
use crate::poll::Role;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationAction {
    Registered,
    Voted,
    EditedVote,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationRecord {
    pub event_id: EventId,
    pub poll_id: PollId,
    /// Normalized email of the participant.
    pub identity: String,
    pub role: Role,
    pub action: ParticipationAction,
    pub at: Timestamp,
}
