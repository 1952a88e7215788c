//! Entries ("teams") competing in polls.

use crate::id::{EntryId, EventId, PollId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A candidate being voted on.
///
/// An entry is created in one poll (`home_poll`) and may be attached by
/// reference to tie-breaker polls derived from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub event_id: EventId,
    pub home_poll: PollId,
    pub display_name: String,
    /// Free-form project metadata (title, repository, demo link, ...).
    pub metadata: BTreeMap<String, String>,
    /// Identity of the team owner, compared against ballots for self-vote gating.
    pub owner_identity: Option<String>,
    /// Set when this entry was copied from another poll of the same event.
    pub duplicated_from: Option<EntryId>,
    pub created_at: Timestamp,
}

impl Entry {
    /// Whether `identity` owns this entry (case-insensitive, trimmed).
    pub fn is_owned_by(&self, identity: &str) -> bool {
        self.owner_identity
            .as_deref()
            .is_some_and(|owner| owner.trim().eq_ignore_ascii_case(identity.trim()))
    }
}
