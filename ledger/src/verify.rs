//! Tamper detection.

use serde::Serialize;
use tracing::{debug, error};
use verdict_crypto::digest_canonical;
use verdict_store::CommitmentStore;
use verdict_types::{Commitment, CommitmentId, CommitmentType, ContentHash, EventId};

use crate::error::LedgerError;

/// Outcome of re-hashing one stored commitment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub commitment: CommitmentId,
    pub event_id: EventId,
    pub commitment_type: CommitmentType,
    pub valid: bool,
    pub stored_hash: ContentHash,
    pub recomputed_hash: ContentHash,
}

/// Per-type results for one event. `valid` is the AND of all of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventVerification {
    pub event_id: EventId,
    pub valid: bool,
    pub results: Vec<Verification>,
}

impl EventVerification {
    pub fn failures(&self) -> impl Iterator<Item = &Verification> {
        self.results.iter().filter(|v| !v.valid)
    }
}

fn check(row: &Commitment) -> Verification {
    let recomputed = digest_canonical(&row.payload);
    let valid = recomputed == row.hash;
    if valid {
        debug!(commitment = %row.id, "commitment verified");
    } else {
        error!(
            event = %row.event_id,
            commitment = %row.id,
            kind = %row.commitment_type,
            stored = %row.hash,
            recomputed = %recomputed,
            "integrity mismatch"
        );
    }
    Verification {
        commitment: row.id.clone(),
        event_id: row.event_id.clone(),
        commitment_type: row.commitment_type.clone(),
        valid,
        stored_hash: row.hash,
        recomputed_hash: recomputed,
    }
}

/// Recompute the digest of the payload as currently stored.
pub fn verify<S: CommitmentStore + ?Sized>(store: &S, id: &CommitmentId) -> Result<Verification, LedgerError> {
    match store.get_commitment(id) {
        Ok(row) => Ok(check(&row)),
        Err(e) if e.is_not_found() => Err(LedgerError::UnknownCommitment(id.clone())),
        Err(e) => Err(e.into()),
    }
}

/// Verify every commitment of an event. An event without commitments is
/// trivially valid.
pub fn verify_all<S: CommitmentStore + ?Sized>(store: &S, event: &EventId) -> Result<EventVerification, LedgerError> {
    let results: Vec<Verification> = store
        .commitments_for_event(event)?
        .iter()
        .map(check)
        .collect();
    Ok(EventVerification {
        event_id: event.clone(),
        valid: results.iter().all(|v| v.valid),
        results,
    })
}

/// Turn a failed verification into [`LedgerError::IntegrityMismatch`].
pub fn require_valid(v: &Verification) -> Result<(), LedgerError> {
    if v.valid {
        Ok(())
    } else {
        Err(LedgerError::IntegrityMismatch {
            commitment: v.commitment.clone(),
            stored: v.stored_hash,
            recomputed: v.recomputed_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::commit;
    use serde_json::json;
    use verdict_nullables::NullStore;
    use verdict_types::Timestamp;

    fn tamper(store: &NullStore, id: &CommitmentId, payload: &str) {
        let mut row = store.get_commitment(id).unwrap();
        row.payload = payload.to_string();
        store.overwrite_commitment_raw(&row).unwrap();
    }

    #[test]
    fn fresh_commitment_verifies() {
        let store = NullStore::new();
        let c = commit(&store, &EventId::from("e"), CommitmentType::Rules, &json!({"x": 1}), Timestamp::new(0)).unwrap();
        let v = verify(&store, &c.id).unwrap();
        assert!(v.valid);
        assert_eq!(v.recomputed_hash, c.hash);
        assert!(require_valid(&v).is_ok());
    }

    #[test]
    fn tampered_payload_is_reported_not_fixed() {
        let store = NullStore::new();
        let c = commit(&store, &EventId::from("e"), CommitmentType::Results, &json!({"a": 3}), Timestamp::new(0)).unwrap();
        tamper(&store, &c.id, r#"{"a":4}"#);

        let v = verify(&store, &c.id).unwrap();
        assert!(!v.valid);
        assert_eq!(v.stored_hash, c.hash);
        let err = require_valid(&v).unwrap_err();
        assert!(err.is_integrity_failure());

        // Still mismatched on the next look.
        assert_eq!(store.get_commitment(&c.id).unwrap().payload, r#"{"a":4}"#);
        assert!(!verify(&store, &c.id).unwrap().valid);
    }

    #[test]
    fn verify_all_is_conjunction() {
        let store = NullStore::new();
        let event = EventId::from("e");
        assert!(verify_all(&store, &event).unwrap().valid);

        commit(&store, &event, CommitmentType::Rules, &json!(1), Timestamp::new(0)).unwrap();
        let results = commit(&store, &event, CommitmentType::Results, &json!(2), Timestamp::new(0)).unwrap();
        let report = verify_all(&store, &event).unwrap();
        assert!(report.valid);
        assert_eq!(report.results.len(), 2);

        tamper(&store, &results.id, "3");
        let report = verify_all(&store, &event).unwrap();
        assert!(!report.valid);
        let failed: Vec<_> = report.failures().map(|v| v.commitment_type.clone()).collect();
        assert_eq!(failed, vec![CommitmentType::Results]);
    }

    #[test]
    fn unknown_commitment() {
        let store = NullStore::new();
        assert!(matches!(
            verify(&store, &CommitmentId::from("x")),
            Err(LedgerError::UnknownCommitment(_))
        ));
    }
}
