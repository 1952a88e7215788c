//! LMDB implementation of PollStore.
//!
//! Polls are indexed per event under
//! `event_id ++ 0 ++ created_at_be ++ poll_id`, so a prefix scan yields an
//! event's polls in creation order.

use verdict_store::{PollStore, StoreError};
use verdict_types::{EventId, Poll, PollId};

use crate::keys::{child_prefix, get_record, put_record, scan_raw, utf8};
use crate::{LmdbError, LmdbStore};

fn event_poll_key(poll: &Poll) -> Vec<u8> {
    let mut key = child_prefix(poll.event_id.as_str().as_bytes());
    key.extend_from_slice(&poll.created_at.as_secs().to_be_bytes());
    key.extend_from_slice(poll.id.as_str().as_bytes());
    key
}

impl PollStore for LmdbStore {
    fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError> {
        let key = poll.id.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self.dbs.polls.get(&wtxn, key).map_err(LmdbError::from)?.is_some() {
            return Err(StoreError::Duplicate(format!("poll {}", poll.id)));
        }
        put_record(&self.dbs.polls, &mut wtxn, key, poll)?;
        self.dbs
            .event_polls
            .put(&mut wtxn, &event_poll_key(poll), key)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_poll(&self, id: &PollId) -> Result<Poll, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        get_record(&self.dbs.polls, &rtxn, id.as_str().as_bytes())?
            .ok_or_else(|| StoreError::NotFound(format!("poll {}", id)))
    }

    fn put_poll(&self, poll: &Poll) -> Result<(), StoreError> {
        let key = poll.id.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let existing: Poll = get_record(&self.dbs.polls, &wtxn, key)?
            .ok_or_else(|| StoreError::NotFound(format!("poll {}", poll.id)))?;
        if existing.event_id != poll.event_id || existing.created_at != poll.created_at {
            return Err(StoreError::Corruption(format!(
                "poll {} cannot change its event or creation time",
                poll.id
            )));
        }
        put_record(&self.dbs.polls, &mut wtxn, key, poll)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn polls_for_event(&self, event: &EventId) -> Result<Vec<Poll>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = child_prefix(event.as_str().as_bytes());
        let mut polls = Vec::new();
        for (_key, poll_id) in scan_raw(&self.dbs.event_polls, &rtxn, &prefix)? {
            let poll_id = utf8(poll_id)?;
            let poll: Poll = get_record(&self.dbs.polls, &rtxn, poll_id.as_bytes())?
                .ok_or_else(|| {
                    StoreError::Corruption(format!("event index points at missing poll {}", poll_id))
                })?;
            polls.push(poll);
        }
        Ok(polls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{open_store, poll};

    #[test]
    fn polls_listed_in_creation_order() {
        let (_dir, store) = open_store();
        store.insert_poll(&poll("late", "e1", 50)).unwrap();
        store.insert_poll(&poll("early", "e1", 5)).unwrap();
        store.insert_poll(&poll("other", "e2", 1)).unwrap();

        let ids: Vec<_> = store
            .polls_for_event(&EventId::from("e1"))
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![PollId::from("early"), PollId::from("late")]);
    }

    #[test]
    fn put_poll_requires_existing() {
        let (_dir, store) = open_store();
        let mut p = poll("p1", "e1", 5);
        assert!(store.put_poll(&p).unwrap_err().is_not_found());
        store.insert_poll(&p).unwrap();
        p.superseded_by = Some(PollId::from("p2"));
        store.put_poll(&p).unwrap();
        assert_eq!(store.get_poll(&p.id).unwrap().superseded_by, p.superseded_by);
    }

    #[test]
    fn tie_breakers_found_by_parent() {
        let (_dir, store) = open_store();
        store.insert_poll(&poll("parent", "e1", 1)).unwrap();
        let mut tb = poll("tb", "e1", 2);
        tb.is_tie_breaker = true;
        tb.tie_breaker_of = Some(PollId::from("parent"));
        store.insert_poll(&tb).unwrap();

        let found = store.tie_breakers_of(&PollId::from("parent")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, tb.id);
    }
}
