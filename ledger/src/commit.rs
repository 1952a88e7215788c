//! Writing and anchoring commitments.

use serde::Serialize;
use tracing::info;
use verdict_crypto::{digest_payload, random_id};
use verdict_store::CommitmentStore;
use verdict_types::{Commitment, CommitmentId, CommitmentType, EventId, ExternalAnchor, Timestamp};

use crate::error::LedgerError;

/// Canonicalize `payload`, digest it and upsert the `(event, type)` row.
///
/// Committing over an existing row keeps its id, bumps its revision and
/// drops any external anchor.
pub fn commit<S, T>(
    store: &S,
    event: &EventId,
    commitment_type: CommitmentType,
    payload: &T,
    now: Timestamp,
) -> Result<Commitment, LedgerError>
where
    S: CommitmentStore + ?Sized,
    T: Serialize + ?Sized,
{
    let (canonical, hash) = digest_payload(payload)?;
    let draft = Commitment {
        id: CommitmentId::new(random_id("cmt")?),
        event_id: event.clone(),
        commitment_type,
        hash,
        payload: canonical,
        anchor: None,
        revision: 0,
        committed_at: now,
    };
    let stored = store.upsert_commitment(&draft)?;
    info!(
        event = %stored.event_id,
        commitment = %stored.id,
        kind = %stored.commitment_type,
        revision = stored.revision,
        hash = %stored.hash,
        "commitment written"
    );
    Ok(stored)
}

/// Record an external reference for the current revision of a commitment.
/// Each revision can be anchored once.
pub fn anchor<S: CommitmentStore + ?Sized>(
    store: &S,
    id: &CommitmentId,
    tx_ref: impl Into<String>,
    block_ref: Option<u64>,
    now: Timestamp,
) -> Result<Commitment, LedgerError> {
    let current = match store.get_commitment(id) {
        Ok(c) => c,
        Err(e) if e.is_not_found() => return Err(LedgerError::UnknownCommitment(id.clone())),
        Err(e) => return Err(e.into()),
    };
    let anchor = ExternalAnchor {
        tx_ref: tx_ref.into(),
        block_ref,
        anchored_at: now,
    };
    if !store.anchor_if_unset(id, current.revision, &anchor)? {
        return Err(LedgerError::AlreadyAnchored(id.clone()));
    }
    info!(commitment = %id, tx_ref = %anchor.tx_ref, "commitment anchored");
    Ok(Commitment {
        anchor: Some(anchor),
        ..current
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use verdict_crypto::digest_canonical;
    use verdict_nullables::NullStore;

    fn event() -> EventId {
        EventId::from("e1")
    }

    #[test]
    fn commit_stores_canonical_text() {
        let store = NullStore::new();
        let c = commit(
            &store,
            &event(),
            CommitmentType::Rules,
            &json!({"b": 2, "a": 1}),
            Timestamp::new(5),
        )
        .unwrap();
        assert_eq!(c.payload, r#"{"a":1,"b":2}"#);
        assert_eq!(c.hash, digest_canonical(&c.payload));
        assert_eq!(c.revision, 0);
        assert!(c.id.as_str().starts_with("cmt_"));
    }

    #[test]
    fn recommit_supersedes_and_clears_anchor() {
        let store = NullStore::new();
        let first = commit(&store, &event(), CommitmentType::Results, &json!([1]), Timestamp::new(1)).unwrap();
        anchor(&store, &first.id, "tx-1", Some(7), Timestamp::new(2)).unwrap();

        let second = commit(&store, &event(), CommitmentType::Results, &json!([2]), Timestamp::new(3)).unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.revision, 1);
        assert!(second.anchor.is_none());
        assert_ne!(second.hash, first.hash);
    }

    #[test]
    fn anchor_once_per_revision() {
        let store = NullStore::new();
        let c = commit(&store, &event(), CommitmentType::Rules, &json!({}), Timestamp::new(1)).unwrap();
        let anchored = anchor(&store, &c.id, "tx-1", None, Timestamp::new(2)).unwrap();
        assert_eq!(anchored.anchor.as_ref().map(|a| a.tx_ref.as_str()), Some("tx-1"));
        assert!(matches!(
            anchor(&store, &c.id, "tx-2", None, Timestamp::new(3)),
            Err(LedgerError::AlreadyAnchored(_))
        ));
        assert_eq!(
            store.get_commitment(&c.id).unwrap().anchor.map(|a| a.tx_ref),
            Some("tx-1".to_string())
        );
    }

    #[test]
    fn anchor_unknown_commitment() {
        let store = NullStore::new();
        assert!(matches!(
            anchor(&store, &CommitmentId::from("nope"), "tx", None, Timestamp::new(0)),
            Err(LedgerError::UnknownCommitment(_))
        ));
    }
}
