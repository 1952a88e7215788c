//! LMDB implementation of ParticipationStore.
//!
//! Key format: `event_id ++ 0 ++ seq_be`, with `seq` counting the event's
//! existing records.

use verdict_store::{ParticipationStore, StoreError};
use verdict_types::{EventId, ParticipationRecord};

use crate::keys::{child_prefix, put_record, scan_raw, scan_records};
use crate::{LmdbError, LmdbStore};

impl ParticipationStore for LmdbStore {
    fn append_participation(&self, record: &ParticipationRecord) -> Result<(), StoreError> {
        let prefix = child_prefix(record.event_id.as_str().as_bytes());
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let seq = scan_raw(&self.dbs.participation, &wtxn, &prefix)?.len() as u64;
        let mut key = prefix;
        key.extend_from_slice(&seq.to_be_bytes());
        put_record(&self.dbs.participation, &mut wtxn, &key, record)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn participation_for_event(
        &self,
        event: &EventId,
    ) -> Result<Vec<ParticipationRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(scan_records(
            &self.dbs.participation,
            &rtxn,
            &child_prefix(event.as_str().as_bytes()),
        )?)
    }

    fn participation_for_identity(
        &self,
        identity: &str,
    ) -> Result<Vec<ParticipationRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let all: Vec<ParticipationRecord> = scan_records(&self.dbs.participation, &rtxn, &[])?;
        Ok(all.into_iter().filter(|r| r.identity == identity).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::open_store;
    use verdict_types::{ParticipationAction, PollId, Role, Timestamp};

    fn record(event: &str, identity: &str, action: ParticipationAction, at: u64) -> ParticipationRecord {
        ParticipationRecord {
            event_id: EventId::from(event),
            poll_id: PollId::from("p1"),
            identity: identity.to_string(),
            role: Role::Voter,
            action,
            at: Timestamp::new(at),
        }
    }

    #[test]
    fn append_order_is_preserved() {
        let (_dir, store) = open_store();
        store.append_participation(&record("e1", "a@x", ParticipationAction::Registered, 5)).unwrap();
        store.append_participation(&record("e1", "a@x", ParticipationAction::Voted, 3)).unwrap();
        store.append_participation(&record("e2", "a@x", ParticipationAction::Voted, 9)).unwrap();
        store.append_participation(&record("e1", "b@x", ParticipationAction::Voted, 4)).unwrap();

        let e1 = store.participation_for_event(&EventId::from("e1")).unwrap();
        let actions: Vec<_> = e1.iter().map(|r| r.action).collect();
        assert_eq!(
            actions,
            vec![
                ParticipationAction::Registered,
                ParticipationAction::Voted,
                ParticipationAction::Voted
            ]
        );

        assert_eq!(store.participation_for_identity("a@x").unwrap().len(), 3);
        assert!(store.participation_for_identity("c@x").unwrap().is_empty());
    }
}
