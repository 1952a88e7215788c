//! Aggregate view over participation records.

use std::collections::BTreeSet;

use serde::Serialize;
use verdict_types::{EventId, ParticipationAction, ParticipationRecord, PollId};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ParticipationSummary {
    /// Distinct events touched, in id order.
    pub events: Vec<EventId>,
    pub registrations: u32,
    /// Distinct polls with at least one ballot.
    pub polls_voted: u32,
    pub edits: u32,
}

pub fn summarize(records: &[ParticipationRecord]) -> ParticipationSummary {
    let mut events = BTreeSet::new();
    let mut voted: BTreeSet<&PollId> = BTreeSet::new();
    let mut summary = ParticipationSummary::default();
    for r in records {
        events.insert(r.event_id.clone());
        match r.action {
            ParticipationAction::Registered => summary.registrations += 1,
            ParticipationAction::Voted => {
                voted.insert(&r.poll_id);
            }
            ParticipationAction::EditedVote => {
                voted.insert(&r.poll_id);
                summary.edits += 1;
            }
        }
    }
    summary.events = events.into_iter().collect();
    summary.polls_voted = voted.len() as u32;
    summary
}
