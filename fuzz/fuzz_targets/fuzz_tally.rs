#![no_main]

use libfuzzer_sys::fuzz_target;
use verdict_store::PollSnapshot;
use verdict_tally::compute_tally;
use verdict_types::*;

// Tallies over arbitrary ballot sets never panic, and positions stay dense
// and ordered by score.
fuzz_target!(|data: &[u8]| {
    let Ok(choices) = serde_json::from_slice::<Vec<BallotChoice>>(data) else {
        return;
    };
    let poll = Poll {
        id: PollId::from("p"),
        event_id: EventId::from("e"),
        name: "fuzz".into(),
        start_time: Timestamp::new(0),
        end_time: Timestamp::new(1_000),
        voting_mode: VotingMode::Ranked,
        voting_permissions: VotingPermissions::VotersAndJudges,
        voter_weight: 1.0,
        judge_weight: 1.0,
        allow_self_vote: true,
        require_team_name_gate: false,
        allow_vote_editing: false,
        voting_sequence: VotingSequence::Simultaneous,
        max_ranked_positions: None,
        min_voter_participation: None,
        min_judge_participation: None,
        is_public_results: true,
        is_tie_breaker: false,
        tie_breaker_of: None,
        superseded_by: None,
        rank_curve: RankCurve::BallotLength,
        created_at: Timestamp::new(0),
    };
    let entries: Vec<Entry> = ["a", "b", "c"]
        .iter()
        .map(|id| Entry {
            id: EntryId::from(*id),
            event_id: poll.event_id.clone(),
            home_poll: poll.id.clone(),
            display_name: id.to_string(),
            metadata: Default::default(),
            owner_identity: None,
            duplicated_from: None,
            created_at: Timestamp::new(0),
        })
        .collect();
    let ballots = choices
        .into_iter()
        .enumerate()
        .map(|(i, choice)| Ballot {
            poll_id: poll.id.clone(),
            member: MemberRef::Voter(VoterTokenId::new(format!("v{i}"))),
            choice,
            cast_at: Timestamp::new(1),
            revision: 0,
        })
        .collect();
    let snapshot = PollSnapshot {
        poll,
        entries,
        ballots,
        voters: Vec::new(),
        judges: Vec::new(),
    };
    let tally = compute_tally(&snapshot);
    for (i, result) in tally.entries.iter().enumerate() {
        assert_eq!(result.position as usize, i + 1);
    }
    for pair in tally.entries.windows(2) {
        assert!(pair[0].total_score.total_cmp(&pair[1].total_score).is_ge());
    }
});
