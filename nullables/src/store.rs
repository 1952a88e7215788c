//! Nullable store: thread-safe in-memory storage.
//!
//! One `Mutex` per record family. Operations spanning families take the
//! locks in a fixed order (polls, entries, electorate, ballots) so they never
//! deadlock, and conditional writes are checked under the lock.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use verdict_store::{
    BallotStore, CastOutcome, CommitmentStore, ElectorateStore, EntryStore, EventStore,
    ParticipationStore, PollSnapshot, PollStore, StoreError,
};
use verdict_types::{
    normalize_email, Ballot, Commitment, CommitmentId, CommitmentType, DeliveryStatus, Entry,
    EntryId, Event, EventId, EventStatus, Judge, JudgeId, MemberRef, ParticipationRecord, Poll,
    PollId, VoterToken, VoterTokenId,
};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
}

#[derive(Default)]
struct Entries {
    records: HashMap<EntryId, Entry>,
    membership: HashMap<PollId, Vec<EntryId>>,
}

impl Entries {
    fn attach(&mut self, poll: &PollId, entry: &EntryId) -> Result<(), StoreError> {
        let members = self.membership.entry(poll.clone()).or_default();
        if members.contains(entry) {
            return Err(StoreError::Duplicate(format!(
                "entry {} already in poll {}",
                entry, poll
            )));
        }
        members.push(entry.clone());
        Ok(())
    }

    fn for_poll(&self, poll: &PollId) -> Result<Vec<Entry>, StoreError> {
        self.membership
            .get(poll)
            .map(|ids| {
                ids.iter()
                    .map(|id| {
                        self.records.get(id).cloned().ok_or_else(|| {
                            StoreError::Corruption(format!("poll {} lists missing entry {}", poll, id))
                        })
                    })
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[derive(Default)]
struct Electorate {
    voters: BTreeMap<(PollId, VoterTokenId), VoterToken>,
    judges: BTreeMap<(PollId, JudgeId), Judge>,
    judge_emails: HashMap<(PollId, String), JudgeId>,
}

impl Electorate {
    fn voters_for(&self, poll: &PollId) -> Vec<VoterToken> {
        self.voters
            .iter()
            .filter(|((p, _), _)| p == poll)
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn judges_for(&self, poll: &PollId) -> Vec<Judge> {
        self.judges
            .iter()
            .filter(|((p, _), _)| p == poll)
            .map(|(_, j)| j.clone())
            .collect()
    }

    fn is_available(&self, poll: &PollId, member: &MemberRef) -> bool {
        match member {
            MemberRef::Voter(id) => self
                .voters
                .get(&(poll.clone(), id.clone()))
                .is_some_and(|v| !v.revoked),
            MemberRef::Judge(id) => self
                .judges
                .get(&(poll.clone(), id.clone()))
                .is_some_and(|j| !j.revoked),
        }
    }

    fn update(
        &mut self,
        poll: &PollId,
        member: &MemberRef,
        apply: impl FnOnce(&mut bool, &mut DeliveryStatus, &mut bool),
    ) -> Result<(), StoreError> {
        match member {
            MemberRef::Voter(id) => {
                let token = self
                    .voters
                    .get_mut(&(poll.clone(), id.clone()))
                    .ok_or_else(|| StoreError::NotFound(format!("voter token {} in poll {}", id, poll)))?;
                apply(&mut token.revoked, &mut token.delivery_status, &mut token.used);
            }
            MemberRef::Judge(id) => {
                let judge = self
                    .judges
                    .get_mut(&(poll.clone(), id.clone()))
                    .ok_or_else(|| StoreError::NotFound(format!("judge {} in poll {}", id, poll)))?;
                apply(&mut judge.revoked, &mut judge.delivery_status, &mut judge.has_voted);
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct Commitments {
    rows: BTreeMap<(EventId, String), Commitment>,
    ids: HashMap<CommitmentId, (EventId, String)>,
}

/// An in-memory implementation of every storage trait.
#[derive(Default)]
pub struct NullStore {
    events: Mutex<BTreeMap<EventId, Event>>,
    polls: Mutex<HashMap<PollId, Poll>>,
    entries: Mutex<Entries>,
    electorate: Mutex<Electorate>,
    ballots: Mutex<BTreeMap<(PollId, String), Ballot>>,
    commitments: Mutex<Commitments>,
    participation: Mutex<Vec<ParticipationRecord>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a stored commitment row without recomputing anything.
    ///
    /// Simulates a direct storage edit for tamper-detection tests.
    pub fn overwrite_commitment_raw(&self, row: &Commitment) -> Result<(), StoreError> {
        let key = (row.event_id.clone(), row.commitment_type.as_key());
        let mut commitments = lock(&self.commitments)?;
        if !commitments.rows.contains_key(&key) {
            return Err(StoreError::NotFound(format!("commitment {}", row.id)));
        }
        commitments.rows.insert(key, row.clone());
        Ok(())
    }

    /// Number of stored ballots across all polls.
    pub fn ballot_count(&self) -> usize {
        lock(&self.ballots).map(|b| b.len()).unwrap_or(0)
    }
}

impl EventStore for NullStore {
    fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        let mut events = lock(&self.events)?;
        if events.contains_key(&event.id) {
            return Err(StoreError::Duplicate(format!("event {}", event.id)));
        }
        events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    fn get_event(&self, id: &EventId) -> Result<Event, StoreError> {
        lock(&self.events)?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("event {}", id)))
    }

    fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        Ok(lock(&self.events)?.values().cloned().collect())
    }

    fn update_event_if_status(
        &self,
        event: &Event,
        expected: EventStatus,
    ) -> Result<bool, StoreError> {
        let mut events = lock(&self.events)?;
        let current = events
            .get_mut(&event.id)
            .ok_or_else(|| StoreError::NotFound(format!("event {}", event.id)))?;
        if current.status != expected {
            return Ok(false);
        }
        *current = event.clone();
        Ok(true)
    }
}

impl PollStore for NullStore {
    fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError> {
        let mut polls = lock(&self.polls)?;
        if polls.contains_key(&poll.id) {
            return Err(StoreError::Duplicate(format!("poll {}", poll.id)));
        }
        polls.insert(poll.id.clone(), poll.clone());
        Ok(())
    }

    fn get_poll(&self, id: &PollId) -> Result<Poll, StoreError> {
        lock(&self.polls)?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("poll {}", id)))
    }

    fn put_poll(&self, poll: &Poll) -> Result<(), StoreError> {
        let mut polls = lock(&self.polls)?;
        let existing = polls
            .get_mut(&poll.id)
            .ok_or_else(|| StoreError::NotFound(format!("poll {}", poll.id)))?;
        if existing.event_id != poll.event_id || existing.created_at != poll.created_at {
            return Err(StoreError::Corruption(format!(
                "poll {} cannot change its event or creation time",
                poll.id
            )));
        }
        *existing = poll.clone();
        Ok(())
    }

    fn polls_for_event(&self, event: &EventId) -> Result<Vec<Poll>, StoreError> {
        let mut polls: Vec<Poll> = lock(&self.polls)?
            .values()
            .filter(|p| &p.event_id == event)
            .cloned()
            .collect();
        polls.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(polls)
    }
}

impl EntryStore for NullStore {
    fn insert_entry(&self, entry: &Entry) -> Result<(), StoreError> {
        let mut entries = lock(&self.entries)?;
        if entries.records.contains_key(&entry.id) {
            return Err(StoreError::Duplicate(format!("entry {}", entry.id)));
        }
        entries.attach(&entry.home_poll, &entry.id)?;
        entries.records.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    fn get_entry(&self, id: &EntryId) -> Result<Entry, StoreError> {
        lock(&self.entries)?
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("entry {}", id)))
    }

    fn attach_entry(&self, poll: &PollId, entry: &EntryId) -> Result<(), StoreError> {
        let mut entries = lock(&self.entries)?;
        if !entries.records.contains_key(entry) {
            return Err(StoreError::NotFound(format!("entry {}", entry)));
        }
        entries.attach(poll, entry)
    }

    fn entries_for_poll(&self, poll: &PollId) -> Result<Vec<Entry>, StoreError> {
        lock(&self.entries)?.for_poll(poll)
    }
}

impl ElectorateStore for NullStore {
    fn insert_voter_token(&self, token: &VoterToken) -> Result<(), StoreError> {
        let mut electorate = lock(&self.electorate)?;
        let key = (token.poll_id.clone(), token.id.clone());
        if electorate.voters.contains_key(&key) {
            return Err(StoreError::Duplicate(format!("voter token {}", token.id)));
        }
        electorate.voters.insert(key, token.clone());
        Ok(())
    }

    fn insert_judge(&self, judge: &Judge) -> Result<(), StoreError> {
        let mut electorate = lock(&self.electorate)?;
        let key = (judge.poll_id.clone(), judge.id.clone());
        let email = (judge.poll_id.clone(), normalize_email(&judge.email));
        if electorate.judges.contains_key(&key) {
            return Err(StoreError::Duplicate(format!("judge {}", judge.id)));
        }
        if electorate.judge_emails.contains_key(&email) {
            return Err(StoreError::Duplicate(format!(
                "judge email {} in poll {}",
                email.1, judge.poll_id
            )));
        }
        electorate.judge_emails.insert(email, judge.id.clone());
        electorate.judges.insert(key, judge.clone());
        Ok(())
    }

    fn get_voter_token(&self, poll: &PollId, id: &VoterTokenId) -> Result<VoterToken, StoreError> {
        lock(&self.electorate)?
            .voters
            .get(&(poll.clone(), id.clone()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("voter token {} in poll {}", id, poll)))
    }

    fn get_judge(&self, poll: &PollId, id: &JudgeId) -> Result<Judge, StoreError> {
        lock(&self.electorate)?
            .judges
            .get(&(poll.clone(), id.clone()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("judge {} in poll {}", id, poll)))
    }

    fn find_judge_by_email(&self, poll: &PollId, email: &str) -> Result<Option<Judge>, StoreError> {
        let electorate = lock(&self.electorate)?;
        let Some(id) = electorate
            .judge_emails
            .get(&(poll.clone(), normalize_email(email)))
        else {
            return Ok(None);
        };
        Ok(electorate.judges.get(&(poll.clone(), id.clone())).cloned())
    }

    fn voter_tokens_for_poll(&self, poll: &PollId) -> Result<Vec<VoterToken>, StoreError> {
        Ok(lock(&self.electorate)?.voters_for(poll))
    }

    fn judges_for_poll(&self, poll: &PollId) -> Result<Vec<Judge>, StoreError> {
        Ok(lock(&self.electorate)?.judges_for(poll))
    }

    fn set_member_revoked(
        &self,
        poll: &PollId,
        member: &MemberRef,
        revoked: bool,
    ) -> Result<(), StoreError> {
        lock(&self.electorate)?.update(poll, member, |flag, _, _| *flag = revoked)
    }

    fn set_delivery_status(
        &self,
        poll: &PollId,
        member: &MemberRef,
        status: DeliveryStatus,
    ) -> Result<(), StoreError> {
        lock(&self.electorate)?.update(poll, member, |_, delivery, _| *delivery = status)
    }
}

impl BallotStore for NullStore {
    fn cast_ballot(
        &self,
        event: &EventId,
        ballot: &Ballot,
        allow_replace: bool,
    ) -> Result<CastOutcome, StoreError> {
        // Lock order: events, electorate, ballots.
        let events = lock(&self.events)?;
        let mut electorate = lock(&self.electorate)?;
        let mut ballots = lock(&self.ballots)?;

        if !events.get(event).is_some_and(Event::accepts_ballots) {
            return Ok(CastOutcome::SubmissionsClosed);
        }

        if !electorate.is_available(&ballot.poll_id, &ballot.member) {
            return Ok(CastOutcome::MemberUnavailable);
        }

        let key = (ballot.poll_id.clone(), ballot.member.key());
        let outcome = match ballots.get(&key).cloned() {
            Some(existing) if !allow_replace => return Ok(CastOutcome::Existing(existing)),
            Some(previous) => {
                let mut stored = ballot.clone();
                stored.revision = previous.revision.saturating_add(1);
                ballots.insert(key, stored.clone());
                CastOutcome::Replaced {
                    previous,
                    ballot: stored,
                }
            }
            None => {
                let mut stored = ballot.clone();
                stored.revision = 0;
                ballots.insert(key, stored.clone());
                CastOutcome::Recorded(stored)
            }
        };

        electorate.update(&ballot.poll_id, &ballot.member, |_, _, consumed| *consumed = true)?;
        Ok(outcome)
    }

    fn get_ballot(&self, poll: &PollId, member: &MemberRef) -> Result<Option<Ballot>, StoreError> {
        Ok(lock(&self.ballots)?
            .get(&(poll.clone(), member.key()))
            .cloned())
    }

    fn ballots_for_poll(&self, poll: &PollId) -> Result<Vec<Ballot>, StoreError> {
        Ok(lock(&self.ballots)?
            .iter()
            .filter(|((p, _), _)| p == poll)
            .map(|(_, b)| b.clone())
            .collect())
    }

    fn poll_snapshot(&self, poll_id: &PollId) -> Result<PollSnapshot, StoreError> {
        let polls = lock(&self.polls)?;
        let entries = lock(&self.entries)?;
        let electorate = lock(&self.electorate)?;
        let ballots = lock(&self.ballots)?;

        let poll = polls
            .get(poll_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("poll {}", poll_id)))?;
        Ok(PollSnapshot {
            poll,
            entries: entries.for_poll(poll_id)?,
            ballots: ballots
                .iter()
                .filter(|((p, _), _)| p == poll_id)
                .map(|(_, b)| b.clone())
                .collect(),
            voters: electorate.voters_for(poll_id),
            judges: electorate.judges_for(poll_id),
        })
    }
}

impl CommitmentStore for NullStore {
    fn upsert_commitment(&self, draft: &Commitment) -> Result<Commitment, StoreError> {
        let mut commitments = lock(&self.commitments)?;
        let key = (draft.event_id.clone(), draft.commitment_type.as_key());
        let stored = match commitments.rows.get(&key) {
            Some(existing) => Commitment {
                id: existing.id.clone(),
                revision: existing.revision.saturating_add(1),
                anchor: None,
                ..draft.clone()
            },
            None => {
                if commitments.ids.contains_key(&draft.id) {
                    return Err(StoreError::Duplicate(format!("commitment {}", draft.id)));
                }
                commitments.ids.insert(draft.id.clone(), key.clone());
                Commitment {
                    revision: 0,
                    anchor: None,
                    ..draft.clone()
                }
            }
        };
        commitments.rows.insert(key, stored.clone());
        Ok(stored)
    }

    fn get_commitment(&self, id: &CommitmentId) -> Result<Commitment, StoreError> {
        let commitments = lock(&self.commitments)?;
        let key = commitments
            .ids
            .get(id)
            .ok_or_else(|| StoreError::NotFound(format!("commitment {}", id)))?;
        commitments.rows.get(key).cloned().ok_or_else(|| {
            StoreError::Corruption(format!("id index points at missing commitment {}", id))
        })
    }

    fn find_commitment(
        &self,
        event: &EventId,
        commitment_type: &CommitmentType,
    ) -> Result<Option<Commitment>, StoreError> {
        Ok(lock(&self.commitments)?
            .rows
            .get(&(event.clone(), commitment_type.as_key()))
            .cloned())
    }

    fn commitments_for_event(&self, event: &EventId) -> Result<Vec<Commitment>, StoreError> {
        Ok(lock(&self.commitments)?
            .rows
            .iter()
            .filter(|((e, _), _)| e == event)
            .map(|(_, c)| c.clone())
            .collect())
    }

    fn anchor_if_unset(
        &self,
        id: &CommitmentId,
        revision: u32,
        anchor: &verdict_types::ExternalAnchor,
    ) -> Result<bool, StoreError> {
        let mut commitments = lock(&self.commitments)?;
        let key = commitments
            .ids
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("commitment {}", id)))?;
        let row = commitments.rows.get_mut(&key).ok_or_else(|| {
            StoreError::Corruption(format!("id index points at missing commitment {}", id))
        })?;
        if row.revision != revision || row.anchor.is_some() {
            return Ok(false);
        }
        row.anchor = Some(anchor.clone());
        Ok(true)
    }
}

impl ParticipationStore for NullStore {
    fn append_participation(&self, record: &ParticipationRecord) -> Result<(), StoreError> {
        lock(&self.participation)?.push(record.clone());
        Ok(())
    }

    fn participation_for_event(
        &self,
        event: &EventId,
    ) -> Result<Vec<ParticipationRecord>, StoreError> {
        Ok(lock(&self.participation)?
            .iter()
            .filter(|r| &r.event_id == event)
            .cloned()
            .collect())
    }

    fn participation_for_identity(
        &self,
        identity: &str,
    ) -> Result<Vec<ParticipationRecord>, StoreError> {
        let mut records: Vec<ParticipationRecord> = lock(&self.participation)?
            .iter()
            .filter(|r| r.identity == identity)
            .cloned()
            .collect();
        // Match the LMDB backend: grouped by event, append order within each.
        records.sort_by(|a, b| a.event_id.cmp(&b.event_id));
        Ok(records)
    }
}
