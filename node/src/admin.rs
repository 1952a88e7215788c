//! Organizer-side setup: events, polls, entries and the electorate.

use serde::Serialize;
use tracing::info;
use verdict_electorate::{Turnout, VoterInvite};
use verdict_store::{ElectorateStore, EntryStore, EventStore, PollStore};
use verdict_tally::{resolve_rank_curve, validate_poll, PollRules};
use verdict_types::{
    Commitment, CommitmentType, DeliveryStatus, Entry, EntryId, Event, EventId, EventStatus, Judge,
    Member, MemberRef, Poll, PollId, VoterToken,
};

use crate::error::NodeError;
use crate::node::{not_found_as, VerdictNode};
use crate::requests::{NewEntry, NewEvent, NewPoll};

/// Payload of an event's `rules` commitment.
#[derive(Serialize)]
struct RulesPayload<'a> {
    event_id: &'a EventId,
    polls: Vec<PollRules>,
}

impl VerdictNode {
    // ── Events ──────────────────────────────────────────────────────────

    pub fn create_event(&self, request: NewEvent) -> Result<Event, NodeError> {
        if request.name.trim().is_empty() {
            return Err(NodeError::InvalidRequest("event name is empty".into()));
        }
        let id = EventId::new(verdict_crypto::random_id("evt")?);
        let mut event = Event::new(id, request.name, self.now());
        event.start_date = request.start_date;
        event.end_date = request.end_date;
        event.voting_closes_at = request.voting_closes_at;
        event.submission_deadline = request.submission_deadline;
        self.store.insert_event(&event)?;
        info!(event = %event.id, name = %event.name, "event created");
        Ok(event)
    }

    pub fn get_event(&self, id: &EventId) -> Result<Event, NodeError> {
        self.load_event(id)
    }

    pub fn list_events(&self) -> Result<Vec<Event>, NodeError> {
        Ok(self.store.list_events()?)
    }

    // ── Polls ───────────────────────────────────────────────────────────

    /// Create a poll and recommit the event's rules.
    pub fn create_poll(&self, request: NewPoll) -> Result<Poll, NodeError> {
        let event = self.load_event(&request.event_id)?;
        if event.status == EventStatus::Finalized {
            return Err(NodeError::InvalidRequest(format!(
                "event {} is finalized",
                event.id
            )));
        }
        let poll = Poll {
            id: PollId::new(verdict_crypto::random_id("poll")?),
            event_id: event.id.clone(),
            name: request.name,
            start_time: request.start_time,
            end_time: request.end_time,
            voting_mode: request.voting_mode,
            voting_permissions: request.voting_permissions,
            voter_weight: request.voter_weight,
            judge_weight: request.judge_weight,
            allow_self_vote: request.allow_self_vote,
            require_team_name_gate: request.require_team_name_gate,
            allow_vote_editing: request.allow_vote_editing,
            voting_sequence: request.voting_sequence,
            max_ranked_positions: request.max_ranked_positions,
            min_voter_participation: request.min_voter_participation,
            min_judge_participation: request.min_judge_participation,
            is_public_results: request.is_public_results,
            is_tie_breaker: false,
            tie_breaker_of: None,
            superseded_by: None,
            rank_curve: resolve_rank_curve(request.max_ranked_positions, request.rank_curve),
            created_at: self.now(),
        };
        validate_poll(&poll)?;
        self.store.insert_poll(&poll)?;
        info!(event = %event.id, poll = %poll.id, mode = poll.voting_mode.as_str(), "poll created");
        self.commit_rules(&event.id)?;
        Ok(poll)
    }

    pub fn get_poll(&self, id: &PollId) -> Result<Poll, NodeError> {
        self.load_poll(id)
    }

    pub fn polls_for_event(&self, event: &EventId) -> Result<Vec<Poll>, NodeError> {
        self.load_event(event)?;
        Ok(self.store.polls_for_event(event)?)
    }

    /// Commit the rule set of every poll of `event`.
    pub(crate) fn commit_rules(&self, event: &EventId) -> Result<Commitment, NodeError> {
        let polls = self.store.polls_for_event(event)?;
        let payload = RulesPayload {
            event_id: event,
            polls: polls.iter().map(PollRules::from).collect(),
        };
        Ok(verdict_ledger::commit(
            &*self.store,
            event,
            CommitmentType::Rules,
            &payload,
            self.now(),
        )?)
    }

    // ── Entries ─────────────────────────────────────────────────────────

    pub fn add_entry(&self, request: NewEntry) -> Result<Entry, NodeError> {
        let poll = self.load_poll(&request.poll_id)?;
        if request.display_name.trim().is_empty() {
            return Err(NodeError::InvalidRequest("entry name is empty".into()));
        }
        let entry = Entry {
            id: EntryId::new(verdict_crypto::random_id("entry")?),
            event_id: poll.event_id.clone(),
            home_poll: poll.id.clone(),
            display_name: request.display_name,
            metadata: request.metadata,
            owner_identity: request.owner_identity,
            duplicated_from: None,
            created_at: self.now(),
        };
        self.store.insert_entry(&entry)?;
        info!(poll = %poll.id, entry = %entry.id, "entry added");
        Ok(entry)
    }

    /// Copy an entry into another poll of the same event under a new id.
    pub fn duplicate_entry(&self, entry: &EntryId, target_poll: &PollId) -> Result<Entry, NodeError> {
        let source = self
            .store
            .get_entry(entry)
            .map_err(|e| not_found_as(e, || NodeError::UnknownEntry(entry.clone())))?;
        let target = self.load_poll(target_poll)?;
        if target.event_id != source.event_id {
            return Err(NodeError::InvalidRequest(format!(
                "poll {} belongs to a different event than entry {}",
                target.id, source.id
            )));
        }
        let copy = Entry {
            id: EntryId::new(verdict_crypto::random_id("entry")?),
            home_poll: target.id.clone(),
            duplicated_from: Some(source.id.clone()),
            created_at: self.now(),
            ..source
        };
        self.store.insert_entry(&copy)?;
        info!(from = %entry, to = %copy.id, poll = %target.id, "entry duplicated");
        Ok(copy)
    }

    pub fn entries_for_poll(&self, poll: &PollId) -> Result<Vec<Entry>, NodeError> {
        self.load_poll(poll)?;
        Ok(self.store.entries_for_poll(poll)?)
    }

    // ── Electorate ──────────────────────────────────────────────────────

    pub fn issue_voter_tokens(&self, poll: &PollId, invites: &[VoterInvite]) -> Result<Vec<VoterToken>, NodeError> {
        let poll = self.load_poll(poll)?;
        let now = self.now();
        let tokens =
            verdict_electorate::issue_voter_tokens(&*self.store, &poll, invites, self.config.token_bytes, now)?;
        for token in &tokens {
            verdict_participation::record_registration(
                &*self.store,
                &poll.event_id,
                &Member::Voter(token.clone()),
                now,
            );
        }
        Ok(tokens)
    }

    pub fn add_judge(&self, poll: &PollId, email: &str, name: Option<String>) -> Result<Judge, NodeError> {
        let poll = self.load_poll(poll)?;
        let now = self.now();
        let judge = verdict_electorate::add_judge(&*self.store, &poll, email, name, now)?;
        verdict_participation::record_registration(
            &*self.store,
            &poll.event_id,
            &Member::Judge(judge.clone()),
            now,
        );
        Ok(judge)
    }

    pub fn revoke_member(&self, poll: &PollId, member: &MemberRef, revoked: bool) -> Result<(), NodeError> {
        self.load_poll(poll)?;
        verdict_electorate::revoke_member(&*self.store, poll, member, revoked)?;
        Ok(())
    }

    pub fn update_delivery_status(
        &self,
        poll: &PollId,
        member: &MemberRef,
        status: DeliveryStatus,
    ) -> Result<(), NodeError> {
        self.load_poll(poll)?;
        verdict_electorate::update_delivery_status(&*self.store, poll, member, status)?;
        Ok(())
    }

    pub fn voter_tokens(&self, poll: &PollId) -> Result<Vec<VoterToken>, NodeError> {
        self.load_poll(poll)?;
        Ok(self.store.voter_tokens_for_poll(poll)?)
    }

    pub fn judges(&self, poll: &PollId) -> Result<Vec<Judge>, NodeError> {
        self.load_poll(poll)?;
        Ok(self.store.judges_for_poll(poll)?)
    }

    pub fn turnout(&self, poll: &PollId) -> Result<Turnout, NodeError> {
        self.load_poll(poll)?;
        Ok(verdict_electorate::turnout(&*self.store, poll)?)
    }
}
