//! Event storage trait.

use crate::StoreError;
use verdict_types::{Event, EventId, EventStatus};

pub trait EventStore {
    /// Insert a new event. Fails with `Duplicate` if the id exists.
    fn insert_event(&self, event: &Event) -> Result<(), StoreError>;

    /// Get an event by id.
    fn get_event(&self, id: &EventId) -> Result<Event, StoreError>;

    /// All events, ordered by id.
    fn list_events(&self) -> Result<Vec<Event>, StoreError>;

    /// Replace the stored event only if its current status is `expected`.
    ///
    /// Returns `false` (and writes nothing) when the stored status differs,
    /// which makes a repeated or concurrent transition a no-op.
    fn update_event_if_status(
        &self,
        event: &Event,
        expected: EventStatus,
    ) -> Result<bool, StoreError>;

    /// Events currently in any of `statuses`.
    fn events_with_status(&self, statuses: &[EventStatus]) -> Result<Vec<Event>, StoreError> {
        Ok(self
            .list_events()?
            .into_iter()
            .filter(|e| statuses.contains(&e.status))
            .collect())
    }
}
