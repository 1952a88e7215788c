//! Polls: one weighted election with a time window and a tallying mode.

use crate::error::TypesError;
use crate::id::{EventId, PollId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a ballot expresses preference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingMode {
    /// Exactly one entry.
    Single,
    /// One or more distinct entries, each counted once.
    Multiple,
    /// An ordered list of entries with unique ranks.
    Ranked,
}

impl VotingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
            Self::Ranked => "ranked",
        }
    }
}

impl FromStr for VotingMode {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "multiple" => Ok(Self::Multiple),
            "ranked" => Ok(Self::Ranked),
            other => Err(TypesError::UnknownVariant {
                kind: "voting mode",
                value: other.to_string(),
            }),
        }
    }
}

/// The two electorate roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Voter,
    Judge,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Voter => "voter",
            Self::Judge => "judge",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which roles may cast ballots in a poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingPermissions {
    VotersOnly,
    JudgesOnly,
    VotersAndJudges,
}

impl VotingPermissions {
    pub fn allows(&self, role: Role) -> bool {
        match (self, role) {
            (Self::VotersAndJudges, _) => true,
            (Self::VotersOnly, Role::Voter) => true,
            (Self::JudgesOnly, Role::Judge) => true,
            _ => false,
        }
    }
}

/// Whether judges must wait for the voter phase to finish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingSequence {
    Simultaneous,
    VotersFirst,
}

/// Rank → points curve, fixed per poll at creation and applied uniformly.
///
/// Every variant is non-increasing in rank and never negative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankCurve {
    /// Rank 1 earns `positions` points, rank `positions` earns 1.
    Linear { positions: u32 },
    /// Linear over the number of entries ranked in each ballot.
    BallotLength,
    /// Explicit table: `points[r - 1]` for rank `r`; ranks past the end earn 0.
    Table { points: Vec<f64> },
}

impl RankCurve {
    /// The curve a ranked poll gets when none is supplied at creation.
    pub fn default_for(max_ranked_positions: Option<u32>) -> Self {
        match max_ranked_positions {
            Some(positions) => Self::Linear { positions },
            None => Self::BallotLength,
        }
    }
}

/// A poll attached to a parent event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub event_id: EventId,
    pub name: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub voting_mode: VotingMode,
    pub voting_permissions: VotingPermissions,
    pub voter_weight: f64,
    pub judge_weight: f64,
    pub allow_self_vote: bool,
    pub require_team_name_gate: bool,
    pub allow_vote_editing: bool,
    pub voting_sequence: VotingSequence,
    pub max_ranked_positions: Option<u32>,
    /// Minimum voter turnout, in percent.
    pub min_voter_participation: Option<f64>,
    /// Minimum judge turnout, in percent.
    pub min_judge_participation: Option<f64>,
    pub is_public_results: bool,
    pub is_tie_breaker: bool,
    pub tie_breaker_of: Option<PollId>,
    /// Set when a later tie-breaker replaced this one. Superseded polls take no ballots.
    pub superseded_by: Option<PollId>,
    /// Only consulted for ranked polls.
    pub rank_curve: RankCurve,
    pub created_at: Timestamp,
}

impl Poll {
    pub fn weight_for(&self, role: Role) -> f64 {
        match role {
            Role::Voter => self.voter_weight,
            Role::Judge => self.judge_weight,
        }
    }

    /// Inclusive window check: `start_time <= now <= end_time`.
    pub fn window_contains(&self, now: Timestamp) -> bool {
        self.start_time <= now && now <= self.end_time
    }

    pub fn min_participation_for(&self, role: Role) -> Option<f64> {
        match role {
            Role::Voter => self.min_voter_participation,
            Role::Judge => self.min_judge_participation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissions_gate_roles() {
        assert!(VotingPermissions::VotersOnly.allows(Role::Voter));
        assert!(!VotingPermissions::VotersOnly.allows(Role::Judge));
        assert!(!VotingPermissions::JudgesOnly.allows(Role::Voter));
        assert!(VotingPermissions::VotersAndJudges.allows(Role::Judge));
    }

    #[test]
    fn default_curve_follows_max_positions() {
        assert_eq!(
            RankCurve::default_for(Some(3)),
            RankCurve::Linear { positions: 3 }
        );
        assert_eq!(RankCurve::default_for(None), RankCurve::BallotLength);
    }
}
