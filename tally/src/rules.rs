//! Poll configuration checks and the committed view of a poll's rules.

use serde::Serialize;
use thiserror::Error;
use verdict_types::{
    Poll, PollId, RankCurve, Role, Timestamp, VotingMode, VotingPermissions, VotingSequence,
};

use crate::curve::{validate_curve, CurveError};

#[derive(Clone, Debug, PartialEq, Error)]
pub enum PollRuleError {
    #[error("poll must end after it starts")]
    InvalidWindow,
    #[error("{role} weight {value} must be finite and non-negative")]
    InvalidWeight { role: Role, value: f64 },
    #[error("{role} participation threshold {value} must be within 0..=100")]
    InvalidParticipation { role: Role, value: f64 },
    #[error("max ranked positions must be at least 1")]
    InvalidMaxPositions,
    #[error("max ranked positions only applies to ranked polls")]
    MaxPositionsRequiresRanked,
    #[error("invalid rank curve: {0}")]
    InvalidCurve(#[from] CurveError),
}

/// Resolve the curve a poll is created with.
///
/// An explicit curve is kept as given; otherwise ranked polls get
/// `Linear { max_ranked_positions }` when a maximum is set and
/// `BallotLength` when it is not.
pub fn resolve_rank_curve(max_ranked_positions: Option<u32>, requested: Option<RankCurve>) -> RankCurve {
    requested.unwrap_or_else(|| RankCurve::default_for(max_ranked_positions))
}

/// Check a poll's configuration before it is stored.
pub fn validate_poll(poll: &Poll) -> Result<(), PollRuleError> {
    if poll.end_time <= poll.start_time {
        return Err(PollRuleError::InvalidWindow);
    }
    for (role, value) in [(Role::Voter, poll.voter_weight), (Role::Judge, poll.judge_weight)] {
        if !value.is_finite() || value < 0.0 {
            return Err(PollRuleError::InvalidWeight { role, value });
        }
    }
    for (role, threshold) in [
        (Role::Voter, poll.min_voter_participation),
        (Role::Judge, poll.min_judge_participation),
    ] {
        if let Some(value) = threshold {
            if !(0.0..=100.0).contains(&value) {
                return Err(PollRuleError::InvalidParticipation { role, value });
            }
        }
    }
    match (poll.voting_mode, poll.max_ranked_positions) {
        (_, Some(0)) => return Err(PollRuleError::InvalidMaxPositions),
        (VotingMode::Single | VotingMode::Multiple, Some(_)) => {
            return Err(PollRuleError::MaxPositionsRequiresRanked)
        }
        _ => {}
    }
    if poll.voting_mode == VotingMode::Ranked {
        validate_curve(&poll.rank_curve)?;
    }
    Ok(())
}

/// The rule-bearing fields of a poll, as committed to the integrity ledger.
///
/// Fields that change after creation for bookkeeping (`superseded_by`) are
/// left out so the commitment stays stable.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PollRules {
    pub poll_id: PollId,
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
    pub min_voter_participation: Option<f64>,
    pub min_judge_participation: Option<f64>,
    pub is_public_results: bool,
    pub is_tie_breaker: bool,
    pub tie_breaker_of: Option<PollId>,
    pub rank_curve: Option<RankCurve>,
}

impl From<&Poll> for PollRules {
    fn from(poll: &Poll) -> Self {
        Self {
            poll_id: poll.id.clone(),
            name: poll.name.clone(),
            start_time: poll.start_time,
            end_time: poll.end_time,
            voting_mode: poll.voting_mode,
            voting_permissions: poll.voting_permissions,
            voter_weight: poll.voter_weight,
            judge_weight: poll.judge_weight,
            allow_self_vote: poll.allow_self_vote,
            require_team_name_gate: poll.require_team_name_gate,
            allow_vote_editing: poll.allow_vote_editing,
            voting_sequence: poll.voting_sequence,
            max_ranked_positions: poll.max_ranked_positions,
            min_voter_participation: poll.min_voter_participation,
            min_judge_participation: poll.min_judge_participation,
            is_public_results: poll.is_public_results,
            is_tie_breaker: poll.is_tie_breaker,
            tie_breaker_of: poll.tie_breaker_of.clone(),
            rank_curve: (poll.voting_mode == VotingMode::Ranked).then(|| poll.rank_curve.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::poll;

    #[test]
    fn valid_default_poll() {
        assert!(validate_poll(&poll(VotingMode::Single)).is_ok());
        assert!(validate_poll(&poll(VotingMode::Ranked)).is_ok());
    }

    #[test]
    fn window_must_be_positive() {
        let mut p = poll(VotingMode::Single);
        p.end_time = p.start_time;
        assert_eq!(validate_poll(&p), Err(PollRuleError::InvalidWindow));
    }

    #[test]
    fn weights_and_thresholds_are_bounded() {
        let mut p = poll(VotingMode::Single);
        p.judge_weight = -1.0;
        assert!(matches!(
            validate_poll(&p),
            Err(PollRuleError::InvalidWeight { role: Role::Judge, .. })
        ));

        let mut p = poll(VotingMode::Single);
        p.voter_weight = f64::NAN;
        assert!(validate_poll(&p).is_err());

        let mut p = poll(VotingMode::Single);
        p.min_voter_participation = Some(101.0);
        assert!(matches!(
            validate_poll(&p),
            Err(PollRuleError::InvalidParticipation { role: Role::Voter, .. })
        ));
    }

    #[test]
    fn max_positions_only_for_ranked() {
        let mut p = poll(VotingMode::Multiple);
        p.max_ranked_positions = Some(3);
        assert_eq!(validate_poll(&p), Err(PollRuleError::MaxPositionsRequiresRanked));

        let mut p = poll(VotingMode::Ranked);
        p.max_ranked_positions = Some(0);
        assert_eq!(validate_poll(&p), Err(PollRuleError::InvalidMaxPositions));
    }

    #[test]
    fn ranked_poll_curve_is_checked() {
        let mut p = poll(VotingMode::Ranked);
        p.rank_curve = RankCurve::Table {
            points: vec![1.0, 2.0],
        };
        assert!(matches!(validate_poll(&p), Err(PollRuleError::InvalidCurve(_))));
    }

    #[test]
    fn curve_resolution() {
        assert_eq!(
            resolve_rank_curve(Some(3), None),
            RankCurve::Linear { positions: 3 }
        );
        assert_eq!(resolve_rank_curve(None, None), RankCurve::BallotLength);
        let table = RankCurve::Table {
            points: vec![3.0, 2.0, 1.0],
        };
        assert_eq!(resolve_rank_curve(Some(3), Some(table.clone())), table);
    }

    #[test]
    fn committed_rules_ignore_supersession() {
        let mut p = poll(VotingMode::Ranked);
        let before = PollRules::from(&p);
        p.superseded_by = Some(PollId::from("tb2"));
        assert_eq!(PollRules::from(&p), before);
        assert!(PollRules::from(&poll(VotingMode::Single)).rank_curve.is_none());
    }
}
