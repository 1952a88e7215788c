//! Racing callers through the node facade.

use std::sync::{Arc, Barrier};
use std::thread;

use verdict_electorate::{Credential, VoterInvite};
use verdict_node::{NewEntry, NewEvent, NewPoll, NodeConfig, VerdictNode};
use verdict_nullables::{NullClock, NullNotifier, NullStore};
use verdict_tally::{BallotRequest, SubmitOutcome};
use verdict_tiebreak::TieBreakRequest;
use verdict_types::{BallotChoice, EntryId, EventStatus, Poll, Timestamp, VotingMode};

const RACERS: usize = 8;

fn node() -> (VerdictNode, Arc<NullStore>) {
    let store = Arc::new(NullStore::new());
    let node = VerdictNode::new(
        NodeConfig::in_memory(),
        store.clone(),
        Arc::new(NullClock::new(100)),
        Arc::new(NullNotifier::new()),
    );
    (node, store)
}

fn single_poll(node: &VerdictNode) -> (Poll, Vec<EntryId>) {
    let event = node
        .create_event(NewEvent {
            name: "Race Day".into(),
            ..NewEvent::default()
        })
        .unwrap();
    node.transition_status(&event.id, EventStatus::Live).unwrap();
    let poll = node
        .create_poll(NewPoll::new(
            event.id,
            "Best Project",
            VotingMode::Single,
            Timestamp::new(0),
            Timestamp::new(1_000),
        ))
        .unwrap();
    let entries = ["A", "B"]
        .into_iter()
        .map(|name| {
            node.add_entry(NewEntry {
                poll_id: poll.id.clone(),
                display_name: name.into(),
                metadata: Default::default(),
                owner_identity: None,
            })
            .unwrap()
            .id
        })
        .collect();
    (poll, entries)
}

/// Run `f` on `RACERS` threads released together.
fn race<T: Send>(f: impl Fn(usize) -> T + Sync) -> Vec<T> {
    let start = Barrier::new(RACERS);
    thread::scope(|s| {
        let handles: Vec<_> = (0..RACERS)
            .map(|i| {
                let (start, f) = (&start, &f);
                s.spawn(move || {
                    start.wait();
                    f(i)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

#[test]
fn one_token_submitted_from_many_threads_votes_once() {
    let (node, store) = node();
    let (poll, entries) = single_poll(&node);
    assert!(!poll.allow_vote_editing);
    let token = node
        .issue_voter_tokens(
            &poll.id,
            &[VoterInvite {
                email: "ada@example.com".into(),
                assigned_entry: None,
            }],
        )
        .unwrap()
        .remove(0);

    let outcomes = race(|i| {
        node.submit_ballot(&BallotRequest {
            poll_id: poll.id.clone(),
            credential: Credential::VoterToken(token.id.clone()),
            choice: BallotChoice::Single {
                entry: entries[i % entries.len()].clone(),
            },
        })
        .unwrap()
    });

    let accepted: Vec<_> = outcomes
        .iter()
        .filter_map(|o| match o {
            SubmitOutcome::Accepted { ballot, replaced, .. } => Some((ballot, replaced)),
            _ => None,
        })
        .collect();
    assert_eq!(accepted.len(), 1, "{outcomes:?}");
    let (winner, replaced) = accepted[0];
    assert!(replaced.is_none());

    let receipts: Vec<_> = outcomes
        .iter()
        .filter_map(|o| match o {
            SubmitOutcome::AlreadyVoted { ballot } => Some(ballot),
            _ => None,
        })
        .collect();
    assert_eq!(receipts.len(), RACERS - 1, "{outcomes:?}");
    assert!(receipts.iter().all(|b| *b == winner));

    assert_eq!(store.ballot_count(), 1);
    let turnout = node.turnout(&poll.id).unwrap();
    assert_eq!((turnout.voters.registered, turnout.voters.consumed), (1, 1));
    assert_eq!(node.compute_tally(&poll.id).unwrap().ballots_counted, 1);
}

#[test]
fn concurrent_tie_breakers_for_one_parent_create_exactly_one() {
    let (node, _) = node();
    let (poll, entries) = single_poll(&node);
    let voters = node
        .issue_voter_tokens(
            &poll.id,
            &[
                VoterInvite {
                    email: "v0@example.com".into(),
                    assigned_entry: None,
                },
                VoterInvite {
                    email: "v1@example.com".into(),
                    assigned_entry: None,
                },
            ],
        )
        .unwrap();
    for (voter, entry) in voters.iter().zip(&entries) {
        let outcome = node
            .submit_ballot(&BallotRequest {
                poll_id: poll.id.clone(),
                credential: Credential::VoterToken(voter.id.clone()),
                choice: BallotChoice::Single { entry: entry.clone() },
            })
            .unwrap();
        assert!(outcome.is_accepted());
    }
    let tied = node.detect_ties(&poll.id, 1).unwrap().expect("A and B tie");

    let results = race(|i| {
        node.create_tie_breaker(&TieBreakRequest {
            parent: poll.id.clone(),
            entries: tied.entries.clone(),
            name: format!("Runoff {i}"),
            start_time: Timestamp::new(100),
            end_time: Timestamp::new(2_000),
            supersede: false,
        })
    });

    let created = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(created, 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.code(), "conflicting_tie_breaker");
    }
    let runoffs = node
        .polls_for_event(&poll.event_id)
        .unwrap()
        .into_iter()
        .filter(|p| p.tie_breaker_of.as_ref() == Some(&poll.id))
        .count();
    assert_eq!(runoffs, 1);
}
