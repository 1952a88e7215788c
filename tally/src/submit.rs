//! Ballot submission: load, validate, write through `cast_ballot`.

use serde::{Deserialize, Serialize};
use tracing::debug;
use verdict_electorate::{resolve_member, Credential};
use verdict_store::{BallotStore, CastOutcome, ElectorateStore, EntryStore, EventStore, PollStore};
use verdict_types::{Ballot, BallotChoice, PollId, Timestamp};

use crate::engine::{ballot_points, EntryPoints};
use crate::error::{RejectReason, TallyError, WindowViolation};
use crate::validator::{validate_ballot, ValidationContext, Verdict};

/// A ballot as submitted by a member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BallotRequest {
    pub poll_id: PollId,
    pub credential: Credential,
    pub choice: BallotChoice,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Accepted {
        ballot: Ballot,
        /// Weighted points this ballot awards, per entry.
        points: Vec<EntryPoints>,
        /// The ballot this one replaced, when editing is allowed.
        replaced: Option<Ballot>,
    },
    /// The member already voted; carries the stored ballot unchanged.
    AlreadyVoted { ballot: Ballot },
    Rejected(RejectReason),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Validate and persist one ballot.
///
/// Rejections are `Ok(SubmitOutcome::Rejected)`; `Err` is reserved for an
/// unknown poll and storage failures.
pub fn submit_ballot<S>(store: &S, request: &BallotRequest, now: Timestamp) -> Result<SubmitOutcome, TallyError>
where
    S: EventStore + PollStore + EntryStore + ElectorateStore + BallotStore + ?Sized,
{
    let poll = match store.get_poll(&request.poll_id) {
        Ok(poll) => poll,
        Err(e) if e.is_not_found() => return Err(TallyError::UnknownPoll(request.poll_id.clone())),
        Err(e) => return Err(e.into()),
    };
    let event = store.get_event(&poll.event_id)?;
    let entries = store.entries_for_poll(&poll.id)?;
    let member = resolve_member(store, &poll.id, &request.credential)?;
    let existing = match &member {
        Some(m) => store.get_ballot(&poll.id, &m.member_ref())?,
        None => None,
    };

    let ctx = ValidationContext {
        event: &event,
        poll: &poll,
        entries: &entries,
        member: member.as_ref(),
        existing: existing.as_ref(),
        now,
    };
    match validate_ballot(&ctx, request.credential.role(), &request.choice) {
        Ok(Verdict::Accept) => {}
        Ok(Verdict::AlreadyVoted(ballot)) => {
            debug!(poll = %poll.id, member = %ballot.member, "already voted");
            return Ok(SubmitOutcome::AlreadyVoted { ballot });
        }
        Err(reason) => {
            debug!(poll = %poll.id, reason = ?reason, "ballot rejected");
            return Ok(SubmitOutcome::Rejected(reason));
        }
    }
    let Some(member) = member else {
        return Ok(SubmitOutcome::Rejected(RejectReason::UnknownVoter));
    };

    let ballot = Ballot {
        poll_id: poll.id.clone(),
        member: member.member_ref(),
        choice: request.choice.clone(),
        cast_at: now,
        revision: 0,
    };
    let outcome = match store.cast_ballot(&event.id, &ballot, poll.allow_vote_editing)? {
        CastOutcome::Recorded(ballot) => SubmitOutcome::Accepted {
            points: ballot_points(&poll, &ballot),
            ballot,
            replaced: None,
        },
        CastOutcome::Replaced { previous, ballot } => SubmitOutcome::Accepted {
            points: ballot_points(&poll, &ballot),
            ballot,
            replaced: Some(previous),
        },
        // Lost a race against a concurrent submission by the same member.
        CastOutcome::Existing(ballot) => SubmitOutcome::AlreadyVoted { ballot },
        CastOutcome::MemberUnavailable => SubmitOutcome::Rejected(RejectReason::UnknownVoter),
        // Closed or locked between the read above and the write.
        CastOutcome::SubmissionsClosed => SubmitOutcome::Rejected(RejectReason::OutOfWindow {
            violation: WindowViolation::SubmissionsLocked,
        }),
    };
    if let SubmitOutcome::Accepted { ballot, .. } = &outcome {
        debug!(
            poll = %poll.id,
            member = %ballot.member,
            revision = ballot.revision,
            "ballot accepted"
        );
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShapeError;
    use crate::testutil::*;
    use verdict_nullables::NullStore;
    use verdict_types::{EntryId, EventId, EventStatus, Poll, RankCurve, VoterTokenId, VotingMode};

    fn setup(configure: impl FnOnce(&mut Poll)) -> NullStore {
        let store = NullStore::new();
        store.insert_event(&live_event()).unwrap();
        let mut poll = poll(VotingMode::Single);
        configure(&mut poll);
        store.insert_poll(&poll).unwrap();
        for id in ["a", "b"] {
            store.insert_entry(&entry(id)).unwrap();
        }
        for id in ["t1", "t2"] {
            store.insert_voter_token(&voter(id)).unwrap();
        }
        store.insert_judge(&judge("j1")).unwrap();
        store
    }

    fn request(token: &str, choice: BallotChoice) -> BallotRequest {
        BallotRequest {
            poll_id: PollId::from("p1"),
            credential: Credential::VoterToken(VoterTokenId::from(token)),
            choice,
        }
    }

    fn at(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    #[test]
    fn accepted_ballot_consumes_member() {
        let store = setup(|_| {});
        let outcome = submit_ballot(&store, &request("t1", single("a")), at(150)).unwrap();
        let SubmitOutcome::Accepted { ballot, points, replaced } = outcome else {
            panic!("expected acceptance");
        };
        assert_eq!(ballot.revision, 0);
        assert!(replaced.is_none());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].points, 1.0);
        assert!(store
            .get_voter_token(&PollId::from("p1"), &VoterTokenId::from("t1"))
            .unwrap()
            .used);
    }

    #[test]
    fn resubmission_returns_original() {
        let store = setup(|_| {});
        submit_ballot(&store, &request("t1", single("a")), at(150)).unwrap();
        let again = submit_ballot(&store, &request("t1", single("b")), at(160)).unwrap();
        let SubmitOutcome::AlreadyVoted { ballot } = again else {
            panic!("expected already voted");
        };
        assert_eq!(
            ballot.choice,
            BallotChoice::Single {
                entry: EntryId::from("a")
            }
        );
        assert_eq!(ballot.cast_at, at(150));
        assert_eq!(store.ballot_count(), 1);
    }

    #[test]
    fn editing_replaces_ballot() {
        let store = setup(|p| p.allow_vote_editing = true);
        submit_ballot(&store, &request("t1", single("a")), at(150)).unwrap();
        let outcome = submit_ballot(&store, &request("t1", single("b")), at(160)).unwrap();
        let SubmitOutcome::Accepted { ballot, replaced, .. } = outcome else {
            panic!("expected acceptance");
        };
        assert_eq!(ballot.revision, 1);
        assert_eq!(replaced.map(|b| b.choice), Some(single("a")));
        assert_eq!(store.ballot_count(), 1);
    }

    #[test]
    fn rejections_are_structured() {
        let store = setup(|_| {});
        assert_eq!(
            submit_ballot(&store, &request("t1", single("a")), at(250)).unwrap(),
            SubmitOutcome::Rejected(WindowViolation::Ended.into())
        );
        assert_eq!(
            submit_ballot(&store, &request("nobody", single("a")), at(150)).unwrap(),
            SubmitOutcome::Rejected(RejectReason::UnknownVoter)
        );
        assert_eq!(
            submit_ballot(&store, &request("t1", single("zzz")), at(150)).unwrap(),
            SubmitOutcome::Rejected(
                ShapeError::UnknownEntry {
                    entry: EntryId::from("zzz")
                }
                .into()
            )
        );
        assert_eq!(store.ballot_count(), 0);
    }

    #[test]
    fn locked_event_refuses_ballots() {
        let store = setup(|_| {});
        let mut event = store.get_event(&EventId::from("e1")).unwrap();
        event.submissions_locked = true;
        assert!(store.update_event_if_status(&event, EventStatus::Live).unwrap());

        assert_eq!(
            submit_ballot(&store, &request("t1", single("a")), at(150)).unwrap(),
            SubmitOutcome::Rejected(WindowViolation::SubmissionsLocked.into())
        );
        assert_eq!(store.ballot_count(), 0);
    }

    #[test]
    fn table_curve_without_maximum_bounds_ranks() {
        let store = setup(|p| {
            p.voting_mode = VotingMode::Ranked;
            p.rank_curve = RankCurve::Table {
                points: vec![3.0, 2.0, 1.0],
            };
        });
        assert_eq!(
            submit_ballot(&store, &request("t1", ranked(&[("a", u32::MAX, None)])), at(150)).unwrap(),
            SubmitOutcome::Rejected(ShapeError::RankOutOfRange { rank: u32::MAX, max: 3 }.into())
        );
        assert!(submit_ballot(&store, &request("t1", ranked(&[("a", 3, None)])), at(150))
            .unwrap()
            .is_accepted());
    }

    #[test]
    fn judges_resolve_by_email() {
        let store = setup(|_| {});
        let req = BallotRequest {
            poll_id: PollId::from("p1"),
            credential: Credential::JudgeEmail(" J1@Judges.Example.com ".into()),
            choice: single("b"),
        };
        assert!(submit_ballot(&store, &req, at(150)).unwrap().is_accepted());
    }

    #[test]
    fn unknown_poll_is_an_error() {
        let store = setup(|_| {});
        let mut req = request("t1", single("a"));
        req.poll_id = PollId::from("missing");
        assert!(matches!(
            submit_ballot(&store, &req, at(150)),
            Err(TallyError::UnknownPoll(_))
        ));
    }

    #[test]
    fn outcome_json_carries_reason_code() {
        let json = serde_json::to_value(SubmitOutcome::Rejected(RejectReason::UnknownVoter)).unwrap();
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["reason"], "unknown_voter");
    }
}
