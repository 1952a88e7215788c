//! LMDB implementation of CommitmentStore.
//!
//! Rows are keyed `event_id ++ 0 ++ type_key`, which enforces one commitment
//! per `(event, type)`. A secondary index maps commitment ids back to the row.

use verdict_store::{CommitmentStore, StoreError};
use verdict_types::{Commitment, CommitmentId, CommitmentType, EventId, ExternalAnchor};

use crate::keys::{child_prefix, composite, get_record, put_record, scan_records};
use crate::{LmdbError, LmdbStore};

fn row_key(event: &EventId, commitment_type: &CommitmentType) -> Vec<u8> {
    composite(&[event.as_str().as_bytes(), commitment_type.as_key().as_bytes()])
}

impl CommitmentStore for LmdbStore {
    fn upsert_commitment(&self, draft: &Commitment) -> Result<Commitment, StoreError> {
        let key = row_key(&draft.event_id, &draft.commitment_type);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let stored = match get_record::<Commitment>(&self.dbs.commitments, &wtxn, &key)? {
            Some(existing) => Commitment {
                id: existing.id,
                revision: existing.revision.saturating_add(1),
                anchor: None,
                ..draft.clone()
            },
            None => {
                let id_key = draft.id.as_str().as_bytes();
                if self
                    .dbs
                    .commitment_ids
                    .get(&wtxn, id_key)
                    .map_err(LmdbError::from)?
                    .is_some()
                {
                    return Err(StoreError::Duplicate(format!("commitment {}", draft.id)));
                }
                self.dbs
                    .commitment_ids
                    .put(&mut wtxn, id_key, &key)
                    .map_err(LmdbError::from)?;
                Commitment {
                    revision: 0,
                    anchor: None,
                    ..draft.clone()
                }
            }
        };

        put_record(&self.dbs.commitments, &mut wtxn, &key, &stored)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(stored)
    }

    fn get_commitment(&self, id: &CommitmentId) -> Result<Commitment, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let key = self
            .dbs
            .commitment_ids
            .get(&rtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| StoreError::NotFound(format!("commitment {}", id)))?;
        get_record(&self.dbs.commitments, &rtxn, key)?.ok_or_else(|| {
            StoreError::Corruption(format!("id index points at missing commitment {}", id))
        })
    }

    fn find_commitment(
        &self,
        event: &EventId,
        commitment_type: &CommitmentType,
    ) -> Result<Option<Commitment>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(get_record(
            &self.dbs.commitments,
            &rtxn,
            &row_key(event, commitment_type),
        )?)
    }

    fn commitments_for_event(&self, event: &EventId) -> Result<Vec<Commitment>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(scan_records(
            &self.dbs.commitments,
            &rtxn,
            &child_prefix(event.as_str().as_bytes()),
        )?)
    }

    fn anchor_if_unset(
        &self,
        id: &CommitmentId,
        revision: u32,
        anchor: &ExternalAnchor,
    ) -> Result<bool, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let key = self
            .dbs
            .commitment_ids
            .get(&wtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| StoreError::NotFound(format!("commitment {}", id)))?
            .to_vec();
        let mut row: Commitment = get_record(&self.dbs.commitments, &wtxn, &key)?.ok_or_else(|| {
            StoreError::Corruption(format!("id index points at missing commitment {}", id))
        })?;
        if row.revision != revision || row.anchor.is_some() {
            return Ok(false);
        }
        row.anchor = Some(anchor.clone());
        put_record(&self.dbs.commitments, &mut wtxn, &key, &row)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }
}

impl LmdbStore {
    /// Overwrite a stored commitment row without recomputing anything.
    ///
    /// Only for exercising tamper detection; bypasses every invariant.
    #[doc(hidden)]
    pub fn overwrite_commitment_raw(&self, row: &Commitment) -> Result<(), StoreError> {
        let key = row_key(&row.event_id, &row.commitment_type);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        put_record(&self.dbs.commitments, &mut wtxn, &key, row)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{commitment, open_store};
    use verdict_types::Timestamp;

    #[test]
    fn upsert_keeps_one_row_per_type() {
        let (_dir, store) = open_store();
        let first = store
            .upsert_commitment(&commitment("c1", "e1", CommitmentType::Rules, "{}"))
            .unwrap();
        assert_eq!(first.revision, 0);

        let second = store
            .upsert_commitment(&commitment("c2", "e1", CommitmentType::Rules, "{\"a\":1}"))
            .unwrap();
        assert_eq!(second.id, CommitmentId::from("c1"));
        assert_eq!(second.revision, 1);
        assert_eq!(second.payload, "{\"a\":1}");

        store
            .upsert_commitment(&commitment("c3", "e1", CommitmentType::Results, "[]"))
            .unwrap();
        let all = store.commitments_for_event(&EventId::from("e1")).unwrap();
        assert_eq!(all.len(), 2);
        assert!(store.get_commitment(&CommitmentId::from("c2")).unwrap_err().is_not_found());
    }

    #[test]
    fn anchor_once_per_revision() {
        let (_dir, store) = open_store();
        let row = store
            .upsert_commitment(&commitment("c1", "e1", CommitmentType::Results, "[]"))
            .unwrap();
        let anchor = ExternalAnchor {
            tx_ref: "0xabc".into(),
            block_ref: Some(42),
            anchored_at: Timestamp::new(60),
        };
        assert!(store.anchor_if_unset(&row.id, 0, &anchor).unwrap());
        assert!(!store.anchor_if_unset(&row.id, 0, &anchor).unwrap());

        // Upsert clears the anchor and moves to revision 1.
        store
            .upsert_commitment(&commitment("cx", "e1", CommitmentType::Results, "[1]"))
            .unwrap();
        let fresh = store.get_commitment(&row.id).unwrap();
        assert!(fresh.anchor.is_none());
        assert!(!store.anchor_if_unset(&row.id, 0, &anchor).unwrap());
        assert!(store.anchor_if_unset(&row.id, 1, &anchor).unwrap());
    }

    #[test]
    fn raw_overwrite_bypasses_hash() {
        let (_dir, store) = open_store();
        let mut row = store
            .upsert_commitment(&commitment("c1", "e1", CommitmentType::Rules, "{}"))
            .unwrap();
        row.payload = "{\"tampered\":true}".into();
        store.overwrite_commitment_raw(&row).unwrap();
        let stored = store.get_commitment(&row.id).unwrap();
        assert_eq!(stored.payload, row.payload);
        assert_eq!(stored.hash, row.hash);
    }
}
