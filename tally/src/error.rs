use serde::{Deserialize, Serialize};
use thiserror::Error;
use verdict_electorate::ElectorateError;
use verdict_store::StoreError;
use verdict_types::{EntryId, PollId, Role, VotingMode};

/// Why a ballot fell outside the voting window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum WindowViolation {
    #[error("the event is not live")]
    EventNotLive,
    #[error("submissions for the event are locked")]
    SubmissionsLocked,
    #[error("the poll has been superseded by a newer tie-breaker")]
    Superseded,
    #[error("voting has not started")]
    NotStarted,
    #[error("voting has ended")]
    Ended,
}

/// What is wrong with a ballot's mode-specific payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeError {
    #[error("ballot is {got:?} but the poll is {expected:?}")]
    ModeMismatch { expected: VotingMode, got: VotingMode },
    #[error("ballot selects no entries")]
    Empty,
    #[error("entry {entry} is not part of this poll")]
    UnknownEntry { entry: EntryId },
    #[error("entry {entry} appears more than once")]
    DuplicateEntry { entry: EntryId },
    #[error("ranks must be positive")]
    ZeroRank,
    #[error("rank {rank} is used more than once")]
    DuplicateRank { rank: u32 },
    #[error("rank {rank} exceeds the maximum of {max}")]
    RankOutOfRange { rank: u32, max: u32 },
    #[error("judges must give a reason for entry {entry}")]
    MissingReason { entry: EntryId },
}

/// A rejected ballot. Recovered by the caller correcting its input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    #[error("outside the voting window: {violation}")]
    OutOfWindow { violation: WindowViolation },
    #[error("role {role} may not vote in this poll")]
    RoleNotAllowed { role: Role },
    #[error("judges must wait for the voter phase to complete")]
    SequenceViolation,
    #[error("credential does not identify an eligible member of this poll")]
    UnknownVoter,
    #[error("members may not vote for their own entry ({entry})")]
    SelfVoteForbidden { entry: EntryId },
    #[error("invalid ballot: {shape}")]
    InvalidBallotShape { shape: ShapeError },
}

impl RejectReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutOfWindow { .. } => "out_of_window",
            Self::RoleNotAllowed { .. } => "role_not_allowed",
            Self::SequenceViolation => "sequence_violation",
            Self::UnknownVoter => "unknown_voter",
            Self::SelfVoteForbidden { .. } => "self_vote_forbidden",
            Self::InvalidBallotShape { .. } => "invalid_ballot_shape",
        }
    }
}

impl From<WindowViolation> for RejectReason {
    fn from(violation: WindowViolation) -> Self {
        Self::OutOfWindow { violation }
    }
}

impl From<ShapeError> for RejectReason {
    fn from(shape: ShapeError) -> Self {
        Self::InvalidBallotShape { shape }
    }
}

/// Failures that are not the voter's fault.
#[derive(Debug, Error)]
pub enum TallyError {
    #[error("unknown poll {0}")]
    UnknownPoll(PollId),

    #[error("electorate error: {0}")]
    Electorate(#[from] ElectorateError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
