//! Record builders shared by the backend tests.

use std::collections::BTreeMap;

use verdict_types::*;

use crate::LmdbStore;

pub(crate) fn open_store() -> (tempfile::TempDir, LmdbStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = LmdbStore::open(dir.path(), 10 * 1024 * 1024).unwrap();
    (dir, store)
}

pub(crate) fn event(id: &str) -> Event {
    Event::new(EventId::from(id), "Spring Hack", Timestamp::new(10))
}

pub(crate) fn poll(id: &str, event: &str, created_at: u64) -> Poll {
    Poll {
        id: PollId::from(id),
        event_id: EventId::from(event),
        name: format!("poll {id}"),
        start_time: Timestamp::new(100),
        end_time: Timestamp::new(200),
        voting_mode: VotingMode::Single,
        voting_permissions: VotingPermissions::VotersAndJudges,
        voter_weight: 1.0,
        judge_weight: 1.0,
        allow_self_vote: false,
        require_team_name_gate: false,
        allow_vote_editing: false,
        voting_sequence: VotingSequence::Simultaneous,
        max_ranked_positions: None,
        min_voter_participation: None,
        min_judge_participation: None,
        is_public_results: false,
        is_tie_breaker: false,
        tie_breaker_of: None,
        superseded_by: None,
        rank_curve: RankCurve::BallotLength,
        created_at: Timestamp::new(created_at),
    }
}

pub(crate) fn entry(id: &str, poll: &str) -> Entry {
    Entry {
        id: EntryId::from(id),
        event_id: EventId::from("e1"),
        home_poll: PollId::from(poll),
        display_name: format!("Team {id}"),
        metadata: BTreeMap::new(),
        owner_identity: None,
        duplicated_from: None,
        created_at: Timestamp::new(20),
    }
}

pub(crate) fn voter(id: &str, poll: &str) -> VoterToken {
    VoterToken {
        id: VoterTokenId::from(id),
        poll_id: PollId::from(poll),
        email: format!("{id}@example.com"),
        assigned_entry: None,
        used: false,
        revoked: false,
        delivery_status: DeliveryStatus::Pending,
        created_at: Timestamp::new(30),
    }
}

pub(crate) fn judge(id: &str, poll: &str, email: &str) -> Judge {
    Judge {
        id: JudgeId::from(id),
        poll_id: PollId::from(poll),
        email: email.to_string(),
        name: None,
        has_voted: false,
        revoked: false,
        delivery_status: DeliveryStatus::Pending,
        created_at: Timestamp::new(30),
    }
}

pub(crate) fn single_ballot(poll: &str, member: MemberRef, entry: &str) -> Ballot {
    Ballot {
        poll_id: PollId::from(poll),
        member,
        choice: BallotChoice::Single {
            entry: EntryId::from(entry),
        },
        cast_at: Timestamp::new(150),
        revision: 0,
    }
}

pub(crate) fn commitment(id: &str, event: &str, commitment_type: CommitmentType, payload: &str) -> Commitment {
    Commitment {
        id: CommitmentId::from(id),
        event_id: EventId::from(event),
        commitment_type,
        hash: ContentHash::new([7u8; 32]),
        payload: payload.to_string(),
        anchor: None,
        revision: 0,
        committed_at: Timestamp::new(40),
    }
}
