#![no_main]

use libfuzzer_sys::fuzz_target;
use verdict_tally::{validate_ballot, ValidationContext, Verdict};
use verdict_types::*;

fn fixtures(mode: VotingMode) -> (Event, Poll, Vec<Entry>, Member) {
    let mut event = Event::new(EventId::from("e"), "fuzz", Timestamp::new(0));
    event.status = EventStatus::Live;
    let max = (mode == VotingMode::Ranked).then_some(3);
    let poll = Poll {
        id: PollId::from("p"),
        event_id: event.id.clone(),
        name: "fuzz".into(),
        start_time: Timestamp::new(0),
        end_time: Timestamp::new(1_000),
        voting_mode: mode,
        voting_permissions: VotingPermissions::VotersAndJudges,
        voter_weight: 1.0,
        judge_weight: 2.0,
        allow_self_vote: false,
        require_team_name_gate: false,
        allow_vote_editing: false,
        voting_sequence: VotingSequence::Simultaneous,
        max_ranked_positions: max,
        min_voter_participation: None,
        min_judge_participation: None,
        is_public_results: false,
        is_tie_breaker: false,
        tie_breaker_of: None,
        superseded_by: None,
        rank_curve: RankCurve::default_for(max),
        created_at: Timestamp::new(0),
    };
    let entries = ["a", "b", "c", "d"]
        .iter()
        .map(|id| Entry {
            id: EntryId::from(*id),
            event_id: event.id.clone(),
            home_poll: poll.id.clone(),
            display_name: id.to_uppercase(),
            metadata: Default::default(),
            owner_identity: None,
            duplicated_from: None,
            created_at: Timestamp::new(0),
        })
        .collect();
    let member = Member::Judge(Judge {
        id: JudgeId::from("j"),
        poll_id: poll.id.clone(),
        email: "judge@example.com".into(),
        name: None,
        has_voted: false,
        revoked: false,
        delivery_status: DeliveryStatus::Sent,
        created_at: Timestamp::new(0),
    });
    (event, poll, entries, member)
}

// Arbitrary ballot payloads must be classified without panicking, and an
// accepted ranked ballot must satisfy the shape rules.
fuzz_target!(|data: &[u8]| {
    let Ok(choice) = serde_json::from_slice::<BallotChoice>(data) else {
        return;
    };
    let (event, poll, entries, member) = fixtures(choice.mode());
    let ctx = ValidationContext {
        event: &event,
        poll: &poll,
        entries: &entries,
        member: Some(&member),
        existing: None,
        now: Timestamp::new(500),
    };
    if let Ok(Verdict::Accept) = validate_ballot(&ctx, Role::Judge, &choice) {
        if let BallotChoice::Ranked { rankings } = &choice {
            assert!(!rankings.is_empty());
            for r in rankings {
                assert!(r.rank >= 1 && r.rank <= 3);
                assert!(r.reason.as_deref().is_some_and(|s| !s.trim().is_empty()));
            }
        }
    }
});
