//! LMDB implementation of BallotStore.
//!
//! Key format: `poll_id ++ 0 ++ member_key`. `cast_ballot` checks the
//! event and the member, writes the ballot and flips the member's consumed flag inside one
//! write transaction; LMDB allows a single writer at a time, so two casts for
//! the same member can never interleave.

use verdict_store::{BallotStore, CastOutcome, PollSnapshot, StoreError};
use verdict_types::{Ballot, Event, EventId, Judge, MemberRef, Poll, PollId, VoterToken};

use crate::electorate::{judge_key, voter_key};
use crate::keys::{child_prefix, composite, get_record, put_record, scan_records};
use crate::{LmdbError, LmdbStore};

fn ballot_key(poll: &PollId, member: &MemberRef) -> Vec<u8> {
    composite(&[poll.as_str().as_bytes(), member.key().as_bytes()])
}

impl BallotStore for LmdbStore {
    fn cast_ballot(
        &self,
        event: &EventId,
        ballot: &Ballot,
        allow_replace: bool,
    ) -> Result<CastOutcome, StoreError> {
        let poll = &ballot.poll_id;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let open = get_record::<Event>(&self.dbs.events, &wtxn, event.as_str().as_bytes())?
            .is_some_and(|e| e.accepts_ballots());
        if !open {
            return Ok(CastOutcome::SubmissionsClosed);
        }

        let available = match &ballot.member {
            MemberRef::Voter(id) => get_record::<VoterToken>(&self.dbs.voters, &wtxn, &voter_key(poll, id))?
                .is_some_and(|t| !t.revoked),
            MemberRef::Judge(id) => get_record::<Judge>(&self.dbs.judges, &wtxn, &judge_key(poll, id))?
                .is_some_and(|j| !j.revoked),
        };
        if !available {
            return Ok(CastOutcome::MemberUnavailable);
        }

        let key = ballot_key(poll, &ballot.member);
        let previous: Option<Ballot> = get_record(&self.dbs.ballots, &wtxn, &key)?;
        let outcome = match previous {
            Some(existing) if !allow_replace => return Ok(CastOutcome::Existing(existing)),
            Some(previous) => {
                let mut stored = ballot.clone();
                stored.revision = previous.revision.saturating_add(1);
                put_record(&self.dbs.ballots, &mut wtxn, &key, &stored)?;
                CastOutcome::Replaced {
                    previous,
                    ballot: stored,
                }
            }
            None => {
                let mut stored = ballot.clone();
                stored.revision = 0;
                put_record(&self.dbs.ballots, &mut wtxn, &key, &stored)?;
                CastOutcome::Recorded(stored)
            }
        };

        self.mark_consumed_in(&mut wtxn, poll, &ballot.member)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(outcome)
    }

    fn get_ballot(&self, poll: &PollId, member: &MemberRef) -> Result<Option<Ballot>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(get_record(&self.dbs.ballots, &rtxn, &ballot_key(poll, member))?)
    }

    fn ballots_for_poll(&self, poll: &PollId) -> Result<Vec<Ballot>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(scan_records(&self.dbs.ballots, &rtxn, &child_prefix(poll.as_str().as_bytes()))?)
    }

    fn poll_snapshot(&self, poll_id: &PollId) -> Result<PollSnapshot, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = child_prefix(poll_id.as_str().as_bytes());

        let poll: Poll = get_record(&self.dbs.polls, &rtxn, poll_id.as_str().as_bytes())?
            .ok_or_else(|| StoreError::NotFound(format!("poll {}", poll_id)))?;
        let entries = self.entries_in(&rtxn, poll_id)?;
        let ballots = scan_records(&self.dbs.ballots, &rtxn, &prefix)?;
        let voters = scan_records(&self.dbs.voters, &rtxn, &prefix)?;
        let judges = scan_records(&self.dbs.judges, &rtxn, &prefix)?;

        Ok(PollSnapshot {
            poll,
            entries,
            ballots,
            voters,
            judges,
        })
    }
}
