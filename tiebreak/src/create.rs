//! Tie-breaker poll creation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;
use verdict_store::{BallotStore, EntryStore, PollStore};
use verdict_tally::{compute_tally, validate_poll};
use verdict_types::{EntryId, Poll, PollId, Timestamp};

use crate::error::TieBreakError;

/// An organizer's confirmation to break a tie.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TieBreakRequest {
    pub parent: PollId,
    pub entries: Vec<EntryId>,
    pub name: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Replace active tie-breakers of the same parent that share an entry
    /// instead of rejecting the request.
    #[serde(default)]
    pub supersede: bool,
}

/// A freshly created tie-breaker.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TieBreaker {
    pub poll: Poll,
    /// Earlier tie-breakers this one superseded.
    pub superseded: Vec<PollId>,
}

/// Create a tie-breaker poll over entries that are exactly tied in the
/// parent's current tally.
///
/// The new poll inherits the parent's voting rules, takes the caller's name
/// and window, references the tied entries without copying them and starts
/// with an empty electorate.
pub fn create_tie_breaker<S>(store: &S, request: &TieBreakRequest, now: Timestamp) -> Result<TieBreaker, TieBreakError>
where
    S: PollStore + EntryStore + BallotStore + ?Sized,
{
    let parent = match store.get_poll(&request.parent) {
        Ok(poll) => poll,
        Err(e) if e.is_not_found() => return Err(TieBreakError::UnknownPoll(request.parent.clone())),
        Err(e) => return Err(e.into()),
    };
    if request.entries.len() < 2 {
        return Err(TieBreakError::TooFewEntries);
    }
    let mut seen = HashSet::new();
    if let Some(dup) = request.entries.iter().find(|e| !seen.insert(*e)) {
        return Err(TieBreakError::DuplicateEntry(dup.clone()));
    }

    let tally = compute_tally(&store.poll_snapshot(&parent.id)?);
    let mut scores = Vec::with_capacity(request.entries.len());
    for entry in &request.entries {
        let result = tally.result_for(entry).ok_or_else(|| TieBreakError::EntryNotInPoll {
            entry: entry.clone(),
            poll: parent.id.clone(),
        })?;
        scores.push((entry, result.total_score));
    }
    let (first, score) = scores[0];
    if let Some((other, _)) = scores.iter().find(|(_, s)| *s != score) {
        return Err(TieBreakError::NotTied {
            first: first.clone(),
            other: (*other).clone(),
        });
    }

    let mut conflicting = Vec::new();
    for existing in store.tie_breakers_of(&parent.id)? {
        if existing.superseded_by.is_some() {
            continue;
        }
        let members = store.entries_for_poll(&existing.id)?;
        let shared = members.iter().find(|e| request.entries.contains(&e.id));
        if let Some(entry) = shared {
            if !request.supersede {
                return Err(TieBreakError::ConflictingTieBreaker {
                    existing: existing.id.clone(),
                    entry: entry.id.clone(),
                });
            }
            conflicting.push(existing);
        }
    }

    let poll = Poll {
        id: PollId::new(verdict_crypto::random_id("poll")?),
        name: request.name.clone(),
        start_time: request.start_time,
        end_time: request.end_time,
        is_tie_breaker: true,
        tie_breaker_of: Some(parent.id.clone()),
        superseded_by: None,
        created_at: now,
        ..parent.clone()
    };
    validate_poll(&poll)?;

    store.insert_poll(&poll)?;
    for entry in &request.entries {
        store.attach_entry(&poll.id, entry)?;
    }
    let mut superseded = Vec::with_capacity(conflicting.len());
    for mut old in conflicting {
        old.superseded_by = Some(poll.id.clone());
        store.put_poll(&old)?;
        superseded.push(old.id);
    }

    info!(
        parent = %parent.id,
        tie_breaker = %poll.id,
        entries = request.entries.len(),
        superseded = superseded.len(),
        "tie-breaker created"
    );
    Ok(TieBreaker { poll, superseded })
}
