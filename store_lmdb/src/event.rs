//! LMDB implementation of EventStore.

use verdict_store::{EventStore, StoreError};
use verdict_types::{Event, EventId, EventStatus};

use crate::keys::{get_record, put_record, scan_records};
use crate::{LmdbError, LmdbStore};

impl EventStore for LmdbStore {
    fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        let key = event.id.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self.dbs.events.get(&wtxn, key).map_err(LmdbError::from)?.is_some() {
            return Err(StoreError::Duplicate(format!("event {}", event.id)));
        }
        put_record(&self.dbs.events, &mut wtxn, key, event)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_event(&self, id: &EventId) -> Result<Event, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        get_record(&self.dbs.events, &rtxn, id.as_str().as_bytes())?
            .ok_or_else(|| StoreError::NotFound(format!("event {}", id)))
    }

    fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(scan_records(&self.dbs.events, &rtxn, &[])?)
    }

    fn update_event_if_status(
        &self,
        event: &Event,
        expected: EventStatus,
    ) -> Result<bool, StoreError> {
        let key = event.id.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let current: Event = get_record(&self.dbs.events, &wtxn, key)?
            .ok_or_else(|| StoreError::NotFound(format!("event {}", event.id)))?;
        if current.status != expected {
            return Ok(false);
        }
        put_record(&self.dbs.events, &mut wtxn, key, event)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }
}
