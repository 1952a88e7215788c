//! Entry storage trait.
//!
//! Entries are stored once and attached to polls by reference. A poll's
//! membership list keeps insertion order, which is the stable tie order of
//! the tally.

use crate::StoreError;
use verdict_types::{Entry, EntryId, PollId};

pub trait EntryStore {
    /// Insert an entry and attach it to its home poll.
    fn insert_entry(&self, entry: &Entry) -> Result<(), StoreError>;

    /// Get an entry by id.
    fn get_entry(&self, id: &EntryId) -> Result<Entry, StoreError>;

    /// Attach an existing entry to another poll. Fails with `Duplicate` if
    /// the entry is already a member of that poll.
    fn attach_entry(&self, poll: &PollId, entry: &EntryId) -> Result<(), StoreError>;

    /// Entries of a poll in attachment order.
    fn entries_for_poll(&self, poll: &PollId) -> Result<Vec<Entry>, StoreError>;
}
