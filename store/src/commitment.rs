//! Commitment storage trait.

use crate::StoreError;
use verdict_types::{Commitment, CommitmentId, CommitmentType, EventId, ExternalAnchor};

pub trait CommitmentStore {
    /// Insert or supersede the row for `(draft.event_id, draft.commitment_type)`.
    ///
    /// On supersede the existing id is kept, `revision` is incremented and any
    /// anchor is cleared. Returns the row as stored.
    fn upsert_commitment(&self, draft: &Commitment) -> Result<Commitment, StoreError>;

    fn get_commitment(&self, id: &CommitmentId) -> Result<Commitment, StoreError>;

    fn find_commitment(
        &self,
        event: &EventId,
        commitment_type: &CommitmentType,
    ) -> Result<Option<Commitment>, StoreError>;

    /// All commitments of an event, ordered by type key.
    fn commitments_for_event(&self, event: &EventId) -> Result<Vec<Commitment>, StoreError>;

    /// Record `anchor` only if the commitment is still at `revision` and has
    /// no anchor yet. Returns whether it was written.
    fn anchor_if_unset(
        &self,
        id: &CommitmentId,
        revision: u32,
        anchor: &ExternalAnchor,
    ) -> Result<bool, StoreError>;
}
