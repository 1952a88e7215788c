//! Commitments, verification and participation history.

use serde::Serialize;
use tracing::warn;
use verdict_ledger::{EventVerification, Verification};
use verdict_participation::ParticipationSummary;
use verdict_store::{CommitmentStore, PollStore};
use verdict_tally::Tally;
use verdict_types::{Commitment, CommitmentId, CommitmentType, EventId, Notification, ParticipationRecord};

use crate::error::NodeError;
use crate::node::{not_found_as, VerdictNode};
use crate::tracing_spans::verify_span;

/// Payload of an event's `results` commitment.
#[derive(Serialize)]
struct ResultsPayload<'a> {
    event_id: &'a EventId,
    polls: Vec<Tally>,
}

impl VerdictNode {
    /// Commit an arbitrary payload for `event`.
    pub fn commit<T: Serialize + ?Sized>(
        &self,
        event: &EventId,
        commitment_type: CommitmentType,
        payload: &T,
    ) -> Result<Commitment, NodeError> {
        self.load_event(event)?;
        Ok(verdict_ledger::commit(
            &*self.store,
            event,
            commitment_type,
            payload,
            self.now(),
        )?)
    }

    /// Commit the current tally of every poll of `event`.
    pub fn commit_results(&self, event: &EventId) -> Result<Commitment, NodeError> {
        let polls = self.store.polls_for_event(event)?;
        let mut tallies = Vec::with_capacity(polls.len());
        for poll in &polls {
            tallies.push(self.compute_tally(&poll.id)?);
        }
        let payload = ResultsPayload {
            event_id: event,
            polls: tallies,
        };
        self.commit(event, CommitmentType::Results, &payload)
    }

    pub fn get_commitment(&self, id: &CommitmentId) -> Result<Commitment, NodeError> {
        self.store
            .get_commitment(id)
            .map_err(|e| not_found_as(e, || NodeError::UnknownCommitment(id.clone())))
    }

    pub fn commitments_for_event(&self, event: &EventId) -> Result<Vec<Commitment>, NodeError> {
        self.load_event(event)?;
        Ok(self.store.commitments_for_event(event)?)
    }

    /// Re-hash one stored commitment. A mismatch is reported in the result,
    /// counted and announced, never repaired.
    pub fn verify(&self, id: &CommitmentId) -> Result<Verification, NodeError> {
        let row = self.get_commitment(id)?;
        let _span = verify_span(row.event_id.as_str()).entered();
        let verification = verdict_ledger::verify(&*self.store, id)?;
        if !verification.valid {
            self.integrity_failed(&verification);
        }
        Ok(verification)
    }

    /// Verify every commitment of `event`.
    pub fn verify_all(&self, event: &EventId) -> Result<EventVerification, NodeError> {
        let _span = verify_span(event.as_str()).entered();
        self.load_event(event)?;
        let report = verdict_ledger::verify_all(&*self.store, event)?;
        for failure in report.failures() {
            self.integrity_failed(failure);
        }
        Ok(report)
    }

    /// Record an external reference for a commitment whose stored payload
    /// still matches its hash.
    pub fn anchor(
        &self,
        id: &CommitmentId,
        tx_ref: &str,
        block_ref: Option<u64>,
    ) -> Result<Commitment, NodeError> {
        if tx_ref.trim().is_empty() {
            return Err(NodeError::InvalidRequest("anchor reference is empty".into()));
        }
        let verification = self.verify(id)?;
        verdict_ledger::require_valid(&verification)?;
        Ok(verdict_ledger::anchor(&*self.store, id, tx_ref, block_ref, self.now())?)
    }

    fn integrity_failed(&self, failure: &Verification) {
        self.metrics.integrity_failures.inc();
        warn!(
            event = %failure.event_id,
            commitment = %failure.commitment,
            "integrity failure reported"
        );
        self.notify(Notification::IntegrityFailure {
            event: failure.event_id.clone(),
            commitment: failure.commitment.clone(),
            stored: failure.stored_hash,
            recomputed: failure.recomputed_hash,
        });
    }

    // ── Participation ───────────────────────────────────────────────────

    pub fn participation_for_event(&self, event: &EventId) -> Result<Vec<ParticipationRecord>, NodeError> {
        self.load_event(event)?;
        Ok(verdict_participation::for_event(&*self.store, event)?)
    }

    pub fn participation_for_identity(&self, identity: &str) -> Result<Vec<ParticipationRecord>, NodeError> {
        Ok(verdict_participation::for_identity(&*self.store, identity)?)
    }

    pub fn participation_summary(&self, identity: &str) -> Result<ParticipationSummary, NodeError> {
        let records = self.participation_for_identity(identity)?;
        Ok(verdict_participation::summarize(&records))
    }
}
