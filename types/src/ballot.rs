//! Ballots: immutable records of one accepted vote.

use crate::electorate::MemberRef;
use crate::id::{EntryId, PollId};
use crate::poll::{Role, VotingMode};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// One ranked position inside a ranked ballot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedChoice {
    pub entry: EntryId,
    pub rank: u32,
    /// Mandatory for judges, optional for voters.
    pub reason: Option<String>,
}

/// Mode-specific ballot payload. Each variant carries only its legal fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallotChoice {
    Single { entry: EntryId },
    Multiple { entries: Vec<EntryId> },
    Ranked { rankings: Vec<RankedChoice> },
}

impl BallotChoice {
    pub fn mode(&self) -> VotingMode {
        match self {
            Self::Single { .. } => VotingMode::Single,
            Self::Multiple { .. } => VotingMode::Multiple,
            Self::Ranked { .. } => VotingMode::Ranked,
        }
    }

    /// Every entry this ballot touches, in payload order.
    pub fn entries(&self) -> Vec<&EntryId> {
        match self {
            Self::Single { entry } => vec![entry],
            Self::Multiple { entries } => entries.iter().collect(),
            Self::Ranked { rankings } => rankings.iter().map(|r| &r.entry).collect(),
        }
    }
}

/// An accepted ballot as persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub poll_id: PollId,
    pub member: MemberRef,
    pub choice: BallotChoice,
    pub cast_at: Timestamp,
    /// 0 for the first ballot, incremented on each permitted edit.
    pub revision: u32,
}

impl Ballot {
    pub fn role(&self) -> Role {
        self.member.role()
    }

    pub fn mode(&self) -> VotingMode {
        self.choice.mode()
    }
}
