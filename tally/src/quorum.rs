//! Participation gating.

use serde::Serialize;
use verdict_electorate::Turnout;
use verdict_types::{Poll, Role};

/// Non-fatal conditions attached to a tally.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum TallyWarning {
    /// Observed turnout for `role` is below the poll's threshold. `observed`
    /// is `None` when no member of that role is registered.
    QuorumNotMet {
        role: Role,
        required: f64,
        observed: Option<f64>,
    },
}

/// One warning per role whose configured minimum turnout is not met.
///
/// A role with nobody registered has no turnout and only meets a threshold
/// of zero.
pub fn quorum_warnings(poll: &Poll, turnout: &Turnout) -> Vec<TallyWarning> {
    [Role::Voter, Role::Judge]
        .into_iter()
        .filter_map(|role| {
            let required = poll.min_participation_for(role)?;
            let observed = turnout.for_role(role).percent();
            let met = match observed {
                Some(pct) => pct >= required,
                None => required <= 0.0,
            };
            (!met).then_some(TallyWarning::QuorumNotMet {
                role,
                required,
                observed,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::poll;
    use verdict_electorate::RoleTurnout;
    use verdict_types::VotingMode;

    fn turnout(voters: (u64, u64), judges: (u64, u64)) -> Turnout {
        Turnout {
            voters: RoleTurnout {
                registered: voters.0,
                consumed: voters.1,
            },
            judges: RoleTurnout {
                registered: judges.0,
                consumed: judges.1,
            },
        }
    }

    #[test]
    fn no_thresholds_no_warnings() {
        let poll = poll(VotingMode::Single);
        assert!(quorum_warnings(&poll, &turnout((10, 0), (0, 0))).is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut poll = poll(VotingMode::Single);
        poll.min_voter_participation = Some(50.0);
        assert!(quorum_warnings(&poll, &turnout((4, 2), (0, 0))).is_empty());
        assert_eq!(
            quorum_warnings(&poll, &turnout((4, 1), (0, 0))),
            vec![TallyWarning::QuorumNotMet {
                role: Role::Voter,
                required: 50.0,
                observed: Some(25.0),
            }]
        );
    }

    #[test]
    fn empty_role_fails_positive_threshold() {
        let mut poll = poll(VotingMode::Single);
        poll.min_judge_participation = Some(10.0);
        let warnings = quorum_warnings(&poll, &turnout((4, 4), (0, 0)));
        assert_eq!(
            warnings,
            vec![TallyWarning::QuorumNotMet {
                role: Role::Judge,
                required: 10.0,
                observed: None,
            }]
        );

        poll.min_judge_participation = Some(0.0);
        assert!(quorum_warnings(&poll, &turnout((4, 4), (0, 0))).is_empty());
    }
}
