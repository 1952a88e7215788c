//! Fixtures for the tally unit tests.

use std::collections::BTreeMap;

use verdict_types::*;

pub(crate) fn poll(mode: VotingMode) -> Poll {
    Poll {
        id: PollId::from("p1"),
        event_id: EventId::from("e1"),
        name: "Main".into(),
        start_time: Timestamp::new(100),
        end_time: Timestamp::new(200),
        voting_mode: mode,
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
        created_at: Timestamp::new(0),
    }
}

pub(crate) fn live_event() -> Event {
    let mut event = Event::new(EventId::from("e1"), "Hack", Timestamp::new(0));
    event.status = EventStatus::Live;
    event
}

pub(crate) fn entry(id: &str) -> Entry {
    Entry {
        id: EntryId::from(id),
        event_id: EventId::from("e1"),
        home_poll: PollId::from("p1"),
        display_name: format!("Team {id}"),
        metadata: BTreeMap::new(),
        owner_identity: None,
        duplicated_from: None,
        created_at: Timestamp::new(0),
    }
}

pub(crate) fn voter(id: &str) -> VoterToken {
    VoterToken {
        id: VoterTokenId::from(id),
        poll_id: PollId::from("p1"),
        email: format!("{id}@example.com"),
        assigned_entry: None,
        used: false,
        revoked: false,
        delivery_status: DeliveryStatus::Sent,
        created_at: Timestamp::new(0),
    }
}

pub(crate) fn judge(id: &str) -> Judge {
    Judge {
        id: JudgeId::from(id),
        poll_id: PollId::from("p1"),
        email: format!("{id}@judges.example.com"),
        name: None,
        has_voted: false,
        revoked: false,
        delivery_status: DeliveryStatus::Sent,
        created_at: Timestamp::new(0),
    }
}

pub(crate) fn single(entry: &str) -> BallotChoice {
    BallotChoice::Single {
        entry: EntryId::from(entry),
    }
}

pub(crate) fn multiple(entries: &[&str]) -> BallotChoice {
    BallotChoice::Multiple {
        entries: entries.iter().map(|e| EntryId::from(*e)).collect(),
    }
}

pub(crate) fn ranked(rankings: &[(&str, u32, Option<&str>)]) -> BallotChoice {
    BallotChoice::Ranked {
        rankings: rankings
            .iter()
            .map(|(entry, rank, reason)| RankedChoice {
                entry: EntryId::from(*entry),
                rank: *rank,
                reason: reason.map(str::to_string),
            })
            .collect(),
    }
}

pub(crate) fn ballot(member: MemberRef, choice: BallotChoice) -> Ballot {
    Ballot {
        poll_id: PollId::from("p1"),
        member,
        choice,
        cast_at: Timestamp::new(150),
        revision: 0,
    }
}

pub(crate) fn voter_ref(id: &str) -> MemberRef {
    MemberRef::Voter(VoterTokenId::from(id))
}

pub(crate) fn judge_ref(id: &str) -> MemberRef {
    MemberRef::Judge(JudgeId::from(id))
}
