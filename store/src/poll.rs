//! Poll storage trait.

use crate::StoreError;
use verdict_types::{EventId, Poll, PollId};

pub trait PollStore {
    /// Insert a new poll. Fails with `Duplicate` if the id exists.
    fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError>;

    /// Get a poll by id.
    fn get_poll(&self, id: &PollId) -> Result<Poll, StoreError>;

    /// Overwrite an existing poll. Fails with `NotFound` if absent.
    fn put_poll(&self, poll: &Poll) -> Result<(), StoreError>;

    /// Polls of an event, ordered by creation time then id.
    fn polls_for_event(&self, event: &EventId) -> Result<Vec<Poll>, StoreError>;

    /// Tie-breaker polls spawned from `parent`, in creation order.
    fn tie_breakers_of(&self, parent: &PollId) -> Result<Vec<Poll>, StoreError> {
        let parent_poll = self.get_poll(parent)?;
        Ok(self
            .polls_for_event(&parent_poll.event_id)?
            .into_iter()
            .filter(|p| p.tie_breaker_of.as_ref() == Some(parent))
            .collect())
    }
}
