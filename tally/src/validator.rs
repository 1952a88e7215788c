//! Ordered ballot preconditions.
//!
//! Each step is a distinct rejectable check and the first failing step wins:
//!
//! 1. event live, poll not superseded, `start_time <= now <= end_time`
//! 2. role permitted by the poll
//! 3. `voters_first` sequencing for judges
//! 4. credential resolves to a non-revoked member
//! 5. already-consumed member without editing: return the existing ballot
//! 6. self-vote gate
//! 7. mode-specific shape

use std::collections::HashSet;

use verdict_types::{
    Ballot, BallotChoice, Entry, EntryId, Event, EventStatus, Member, Poll, Role,
    Timestamp, VotingSequence,
};

use crate::curve::max_rank;
use crate::error::{RejectReason, ShapeError, WindowViolation};

/// Everything a ballot is validated against.
#[derive(Clone, Copy, Debug)]
pub struct ValidationContext<'a> {
    pub event: &'a Event,
    pub poll: &'a Poll,
    /// The poll's entries, in attachment order.
    pub entries: &'a [Entry],
    /// The member the credential resolved to, if any.
    pub member: Option<&'a Member>,
    /// The member's stored ballot in this poll, if any.
    pub existing: Option<&'a Ballot>,
    pub now: Timestamp,
}

/// A ballot that passed validation.
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    /// Write the ballot (replacing the existing one when editing is allowed).
    Accept,
    /// The member already voted and editing is off; hand back the receipt.
    AlreadyVoted(Ballot),
}

pub fn validate_ballot(
    ctx: &ValidationContext<'_>,
    role: Role,
    choice: &BallotChoice,
) -> Result<Verdict, RejectReason> {
    let poll = ctx.poll;

    check_window(ctx)?;

    if !poll.voting_permissions.allows(role) {
        return Err(RejectReason::RoleNotAllowed { role });
    }

    if poll.voting_sequence == VotingSequence::VotersFirst
        && role == Role::Judge
        && !ctx.event.voter_phase_complete(ctx.now)
    {
        return Err(RejectReason::SequenceViolation);
    }

    let member = match ctx.member {
        Some(m) if !m.is_revoked() && m.role() == role && m.poll_id() == &poll.id => m,
        _ => return Err(RejectReason::UnknownVoter),
    };

    if !poll.allow_vote_editing {
        match ctx.existing {
            Some(existing) => return Ok(Verdict::AlreadyVoted(existing.clone())),
            // Consumed with no ballot on record: not an unconsumed member.
            None if member.is_consumed() => return Err(RejectReason::UnknownVoter),
            None => {}
        }
    }

    if !poll.allow_self_vote {
        check_self_vote(member, ctx.entries, choice)?;
    }

    check_shape(poll, ctx.entries, role, choice)?;
    Ok(Verdict::Accept)
}

fn check_window(ctx: &ValidationContext<'_>) -> Result<(), WindowViolation> {
    if ctx.event.status != EventStatus::Live {
        return Err(WindowViolation::EventNotLive);
    }
    if !ctx.event.accepts_ballots() {
        return Err(WindowViolation::SubmissionsLocked);
    }
    if ctx.poll.superseded_by.is_some() {
        return Err(WindowViolation::Superseded);
    }
    if ctx.now < ctx.poll.start_time {
        return Err(WindowViolation::NotStarted);
    }
    if ctx.now > ctx.poll.end_time {
        return Err(WindowViolation::Ended);
    }
    Ok(())
}

/// A member's own entry is the one they are assigned to, or one whose
/// owner identity is their email.
fn check_self_vote(member: &Member, entries: &[Entry], choice: &BallotChoice) -> Result<(), RejectReason> {
    for id in choice.entries() {
        let assigned = member.assigned_entry() == Some(id);
        let owned = entries
            .iter()
            .find(|e| &e.id == id)
            .is_some_and(|e| e.is_owned_by(member.email()));
        if assigned || owned {
            return Err(RejectReason::SelfVoteForbidden { entry: id.clone() });
        }
    }
    Ok(())
}

fn check_shape(poll: &Poll, entries: &[Entry], role: Role, choice: &BallotChoice) -> Result<(), ShapeError> {
    if choice.mode() != poll.voting_mode {
        return Err(ShapeError::ModeMismatch {
            expected: poll.voting_mode,
            got: choice.mode(),
        });
    }

    let known: HashSet<&EntryId> = entries.iter().map(|e| &e.id).collect();
    let selected = choice.entries();
    if selected.is_empty() {
        return Err(ShapeError::Empty);
    }
    let mut seen = HashSet::with_capacity(selected.len());
    for id in &selected {
        if !known.contains(id) {
            return Err(ShapeError::UnknownEntry { entry: (*id).clone() });
        }
        if !seen.insert(*id) {
            return Err(ShapeError::DuplicateEntry { entry: (*id).clone() });
        }
    }

    if let BallotChoice::Ranked { rankings } = choice {
        let max = max_rank(poll, rankings.len());
        let mut ranks = HashSet::with_capacity(rankings.len());
        for choice in rankings {
            if choice.rank == 0 {
                return Err(ShapeError::ZeroRank);
            }
            if choice.rank > max {
                return Err(ShapeError::RankOutOfRange {
                    rank: choice.rank,
                    max,
                });
            }
            if !ranks.insert(choice.rank) {
                return Err(ShapeError::DuplicateRank { rank: choice.rank });
            }
            let has_reason = choice.reason.as_deref().is_some_and(|r| !r.trim().is_empty());
            if role == Role::Judge && !has_reason {
                return Err(ShapeError::MissingReason {
                    entry: choice.entry.clone(),
                });
            }
        }
    }
    Ok(())
}
