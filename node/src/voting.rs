//! Ballots, tallies and tie-breakers.

use std::time::Instant;

use tracing::{debug, info};
use verdict_electorate::{resolve_member, Credential};
use verdict_store::{BallotStore, PollStore};
use verdict_tally::{BallotRequest, SubmitOutcome, Tally};
use verdict_tiebreak::{TieBreakRequest, TieBreaker, TieGroup};
use verdict_types::{normalize_email, Ballot, EventStatus, MemberRef, Notification, PollId};

use crate::error::NodeError;
use crate::node::{not_found_as, VerdictNode};
use crate::tracing_spans::{submit_span, tally_span};

/// Serialization key for one member's submissions.
fn member_key(poll: &PollId, credential: &Credential) -> String {
    match credential {
        Credential::VoterToken(token) => format!("{}/voter/{}", poll, token),
        Credential::JudgeEmail(email) => format!("{}/judge/{}", poll, normalize_email(email)),
    }
}

fn tie_breaker_key(parent: &PollId) -> String {
    format!("tiebreak/{}", parent)
}

impl VerdictNode {
    /// Validate and store a ballot.
    ///
    /// Submissions by the same member are serialized; different members
    /// proceed in parallel. Rejections come back as
    /// [`SubmitOutcome::Rejected`], not as errors.
    pub fn submit_ballot(&self, request: &BallotRequest) -> Result<SubmitOutcome, NodeError> {
        let _span = submit_span(request.poll_id.as_str()).entered();
        let key = member_key(&request.poll_id, &request.credential);
        let outcome = self.locks.with_lock(&key, || {
            verdict_tally::submit_ballot(&*self.store, request, self.now())
        })?;

        match &outcome {
            SubmitOutcome::Accepted { ballot, replaced, .. } => {
                self.metrics.ballots_accepted.inc();
                self.record_vote(request, ballot, replaced.is_some());
            }
            SubmitOutcome::AlreadyVoted { .. } => self.metrics.ballots_already_voted.inc(),
            SubmitOutcome::Rejected(reason) => {
                self.metrics
                    .ballots_rejected
                    .with_label_values(&[reason.code()])
                    .inc();
            }
        }
        Ok(outcome)
    }

    fn record_vote(&self, request: &BallotRequest, ballot: &Ballot, edited: bool) {
        let member = match resolve_member(&*self.store, &request.poll_id, &request.credential) {
            Ok(Some(member)) => member,
            Ok(None) => return,
            Err(e) => {
                debug!(poll = %request.poll_id, error = %e, "member lookup for participation failed");
                return;
            }
        };
        match self.store.get_poll(&ballot.poll_id) {
            Ok(poll) => verdict_participation::record_ballot(
                &*self.store,
                &poll.event_id,
                &member,
                edited,
                ballot.cast_at,
            ),
            Err(e) => debug!(poll = %ballot.poll_id, error = %e, "poll lookup for participation failed"),
        }
    }

    pub fn get_ballot(&self, poll: &PollId, member: &MemberRef) -> Result<Option<Ballot>, NodeError> {
        self.load_poll(poll)?;
        Ok(self.store.get_ballot(poll, member)?)
    }

    /// Recompute a poll's results from every stored ballot.
    pub fn compute_tally(&self, poll: &PollId) -> Result<Tally, NodeError> {
        let _span = tally_span(poll.as_str()).entered();
        let started = Instant::now();
        let snapshot = self
            .store
            .poll_snapshot(poll)
            .map_err(|e| not_found_as(e, || NodeError::UnknownPoll(poll.clone())))?;
        let tally = verdict_tally::compute_tally(&snapshot);
        self.metrics
            .tally_duration_ms
            .observe(started.elapsed().as_secs_f64() * 1000.0);
        self.metrics.tallies_computed.inc();
        Ok(tally)
    }

    /// Results as shown to members: available once the poll is public or
    /// its event is finalized.
    pub fn public_results(&self, poll: &PollId) -> Result<Tally, NodeError> {
        let record = self.load_poll(poll)?;
        let event = self.load_event(&record.event_id)?;
        if !record.is_public_results && event.status != EventStatus::Finalized {
            return Err(NodeError::ResultsNotPublic(poll.clone()));
        }
        self.compute_tally(poll)
    }

    /// The tie group at `cutoff` in the poll's current results, if any.
    pub fn detect_ties(&self, poll: &PollId, cutoff: u32) -> Result<Option<TieGroup>, NodeError> {
        let tally = self.compute_tally(poll)?;
        Ok(verdict_tiebreak::detect_ties(&tally, cutoff))
    }

    pub fn all_tie_groups(&self, poll: &PollId) -> Result<Vec<TieGroup>, NodeError> {
        let tally = self.compute_tally(poll)?;
        Ok(verdict_tiebreak::all_tie_groups(&tally))
    }

    /// Create a tie-breaker poll and recommit the event's rules.
    ///
    /// Creations for the same parent are serialized so the conflict check
    /// and the insert see the same set of active tie-breakers.
    pub fn create_tie_breaker(&self, request: &TieBreakRequest) -> Result<TieBreaker, NodeError> {
        let parent = self.load_poll(&request.parent)?;
        let event = self.load_event(&parent.event_id)?;
        if event.status == EventStatus::Finalized {
            return Err(NodeError::InvalidRequest(format!(
                "event {} is finalized",
                event.id
            )));
        }
        let created = self.locks.with_lock(&tie_breaker_key(&parent.id), || {
            verdict_tiebreak::create_tie_breaker(&*self.store, request, self.now())
        })?;
        info!(
            parent = %parent.id,
            tie_breaker = %created.poll.id,
            superseded = created.superseded.len(),
            "tie-breaker ready"
        );
        self.notify(Notification::TieBreakerCreated {
            parent: parent.id,
            tie_breaker: created.poll.id.clone(),
            entries: request.entries.clone(),
        });
        self.commit_rules(&event.id)?;
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn judge_keys_ignore_email_case() {
        let poll = PollId::from("p");
        let a = member_key(&poll, &Credential::JudgeEmail("Ada@Example.com ".into()));
        let b = member_key(&poll, &Credential::JudgeEmail("ada@example.com".into()));
        assert_eq!(a, b);
    }

    #[test]
    fn voter_and_judge_keys_never_collide() {
        let poll = PollId::from("p");
        let voter = member_key(&poll, &Credential::VoterToken("x@y".into()));
        let judge = member_key(&poll, &Credential::JudgeEmail("x@y".into()));
        assert_ne!(voter, judge);
    }

    #[test]
    fn tie_breaker_keys_stay_apart_from_member_keys() {
        let poll = PollId::from("p");
        let member = member_key(&poll, &Credential::VoterToken("p".into()));
        assert_ne!(tie_breaker_key(&poll), member);
    }
}
