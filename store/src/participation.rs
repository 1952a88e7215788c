//! Participation storage trait. Append-only.

use crate::StoreError;
use verdict_types::{EventId, ParticipationRecord};

pub trait ParticipationStore {
    fn append_participation(&self, record: &ParticipationRecord) -> Result<(), StoreError>;

    /// Records of an event in append order.
    fn participation_for_event(&self, event: &EventId)
        -> Result<Vec<ParticipationRecord>, StoreError>;

    /// Records for a normalized identity across all events, in append order
    /// within each event.
    fn participation_for_identity(
        &self,
        identity: &str,
    ) -> Result<Vec<ParticipationRecord>, StoreError>;
}
