//! Ballot storage trait and the consistent poll snapshot used by the tally.

use crate::StoreError;
use verdict_types::{Ballot, Entry, EventId, Judge, MemberRef, Poll, PollId, VoterToken};

/// Result of an atomic ballot write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CastOutcome {
    /// First ballot for this member; the member is now consumed.
    Recorded(Ballot),
    /// An earlier ballot was replaced; carries the new ballot.
    Replaced { previous: Ballot, ballot: Ballot },
    /// Replacement was not allowed and a ballot already exists; nothing written.
    Existing(Ballot),
    /// The member is missing or revoked; nothing written.
    MemberUnavailable,
    /// The event is missing, not live or has locked submissions; nothing written.
    SubmissionsClosed,
}

/// Everything the tally reads for one poll, taken in a single read.
#[derive(Clone, Debug, PartialEq)]
pub struct PollSnapshot {
    pub poll: Poll,
    /// In attachment order.
    pub entries: Vec<Entry>,
    pub ballots: Vec<Ballot>,
    pub voters: Vec<VoterToken>,
    pub judges: Vec<Judge>,
}

pub trait BallotStore {
    /// Persist `ballot` and mark its member consumed, in one atomic step.
    ///
    /// The write happens only while `event` accepts ballots, checked in the
    /// same step so a concurrent close cannot slip in between.
    ///
    /// When a ballot already exists for the member: with `allow_replace` the
    /// stored ballot is replaced and its revision incremented, otherwise the
    /// existing ballot is returned untouched. The stored ballot's
    /// `revision` is assigned by the store.
    fn cast_ballot(
        &self,
        event: &EventId,
        ballot: &Ballot,
        allow_replace: bool,
    ) -> Result<CastOutcome, StoreError>;

    fn get_ballot(&self, poll: &PollId, member: &MemberRef) -> Result<Option<Ballot>, StoreError>;

    /// Ballots of a poll, ordered by member key.
    fn ballots_for_poll(&self, poll: &PollId) -> Result<Vec<Ballot>, StoreError>;

    /// Poll, entries, ballots and electorate, read with snapshot isolation.
    fn poll_snapshot(&self, poll: &PollId) -> Result<PollSnapshot, StoreError>;
}
