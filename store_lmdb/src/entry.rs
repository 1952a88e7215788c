//! LMDB implementation of EntryStore.
//!
//! Membership key format: `poll_id ++ 0 ++ seq_be`, where `seq` is the
//! number of entries already attached to the poll.

use heed::RwTxn;
use verdict_store::{EntryStore, StoreError};
use verdict_types::{Entry, EntryId, PollId};

use crate::keys::{child_prefix, get_record, put_record, scan_raw, utf8};
use crate::{LmdbError, LmdbStore};

impl LmdbStore {
    fn attach_in(&self, wtxn: &mut RwTxn, poll: &PollId, entry: &EntryId) -> Result<(), StoreError> {
        let prefix = child_prefix(poll.as_str().as_bytes());
        let members = scan_raw(&self.dbs.poll_entries, wtxn, &prefix)?;
        if members.iter().any(|(_, id)| id.as_slice() == entry.as_str().as_bytes()) {
            return Err(StoreError::Duplicate(format!(
                "entry {} already in poll {}",
                entry, poll
            )));
        }
        let mut key = prefix;
        key.extend_from_slice(&(members.len() as u64).to_be_bytes());
        self.dbs
            .poll_entries
            .put(wtxn, &key, entry.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }
}

impl EntryStore for LmdbStore {
    fn insert_entry(&self, entry: &Entry) -> Result<(), StoreError> {
        let key = entry.id.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self.dbs.entries.get(&wtxn, key).map_err(LmdbError::from)?.is_some() {
            return Err(StoreError::Duplicate(format!("entry {}", entry.id)));
        }
        put_record(&self.dbs.entries, &mut wtxn, key, entry)?;
        self.attach_in(&mut wtxn, &entry.home_poll, &entry.id)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_entry(&self, id: &EntryId) -> Result<Entry, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        get_record(&self.dbs.entries, &rtxn, id.as_str().as_bytes())?
            .ok_or_else(|| StoreError::NotFound(format!("entry {}", id)))
    }

    fn attach_entry(&self, poll: &PollId, entry: &EntryId) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .dbs
            .entries
            .get(&wtxn, entry.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .is_none()
        {
            return Err(StoreError::NotFound(format!("entry {}", entry)));
        }
        self.attach_in(&mut wtxn, poll, entry)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn entries_for_poll(&self, poll: &PollId) -> Result<Vec<Entry>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        self.entries_in(&rtxn, poll)
    }
}

impl LmdbStore {
    pub(crate) fn entries_in(&self, txn: &heed::RoTxn, poll: &PollId) -> Result<Vec<Entry>, StoreError> {
        let prefix = child_prefix(poll.as_str().as_bytes());
        let mut entries = Vec::new();
        for (_key, id) in scan_raw(&self.dbs.poll_entries, txn, &prefix)? {
            let id = utf8(id)?;
            let entry: Entry = get_record(&self.dbs.entries, txn, id.as_bytes())?.ok_or_else(|| {
                StoreError::Corruption(format!("poll {} lists missing entry {}", poll, id))
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{entry, open_store};

    #[test]
    fn membership_keeps_insertion_order() {
        let (_dir, store) = open_store();
        for id in ["zeta", "alpha", "mid"] {
            store.insert_entry(&entry(id, "p1")).unwrap();
        }
        let names: Vec<_> = store
            .entries_for_poll(&PollId::from("p1"))
            .unwrap()
            .into_iter()
            .map(|e| e.id.into_inner())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn attach_by_reference() {
        let (_dir, store) = open_store();
        store.insert_entry(&entry("a", "p1")).unwrap();
        store.insert_entry(&entry("b", "p1")).unwrap();

        let tb = PollId::from("tb");
        store.attach_entry(&tb, &EntryId::from("b")).unwrap();
        store.attach_entry(&tb, &EntryId::from("a")).unwrap();
        assert!(matches!(
            store.attach_entry(&tb, &EntryId::from("a")),
            Err(StoreError::Duplicate(_))
        ));
        assert!(store
            .attach_entry(&tb, &EntryId::from("ghost"))
            .unwrap_err()
            .is_not_found());

        let in_tb = store.entries_for_poll(&tb).unwrap();
        assert_eq!(in_tb.len(), 2);
        assert_eq!(in_tb[0].id, EntryId::from("b"));
        // Same identity, still homed in the original poll.
        assert_eq!(in_tb[0].home_poll, PollId::from("p1"));
    }
}
