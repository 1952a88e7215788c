//! Rank → points curves.

use thiserror::Error;
use verdict_types::{Poll, RankCurve};

#[derive(Clone, Debug, PartialEq, Error)]
pub enum CurveError {
    #[error("linear curve needs at least one position")]
    NoPositions,
    #[error("points table is empty")]
    EmptyTable,
    #[error("points table value {value} at rank {rank} is negative or not finite")]
    InvalidPoints { rank: usize, value: f64 },
    #[error("points table increases at rank {rank}")]
    Increasing { rank: usize },
}

/// Points a ranked choice earns before role weighting.
///
/// `ballot_len` is the number of entries ranked in the ballot; only the
/// `BallotLength` curve reads it. Rank 0 and ranks past the end of the curve
/// earn nothing.
pub fn points_for_rank(curve: &RankCurve, rank: u32, ballot_len: usize) -> f64 {
    if rank == 0 {
        return 0.0;
    }
    let linear = |n: u64| {
        let rank = u64::from(rank);
        if rank > n {
            0.0
        } else {
            (n - rank + 1) as f64
        }
    };
    match curve {
        RankCurve::Linear { positions } => linear(u64::from(*positions)),
        RankCurve::BallotLength => linear(ballot_len as u64),
        RankCurve::Table { points } => points.get(rank as usize - 1).copied().unwrap_or(0.0),
    }
}

/// Highest rank a ballot may use in `poll`.
///
/// An explicit `max_ranked_positions` wins. Otherwise `Linear` and `Table`
/// curves stop at their last scoring rank, and `BallotLength` allows ranks
/// up to the number of entries in the ballot (`ballot_len`).
pub fn max_rank(poll: &Poll, ballot_len: usize) -> u32 {
    if let Some(max) = poll.max_ranked_positions {
        return max;
    }
    match &poll.rank_curve {
        RankCurve::Linear { positions } => *positions,
        RankCurve::Table { points } => u32::try_from(points.len()).unwrap_or(u32::MAX),
        RankCurve::BallotLength => u32::try_from(ballot_len).unwrap_or(u32::MAX),
    }
}

/// A curve must be non-negative and non-increasing in rank.
pub fn validate_curve(curve: &RankCurve) -> Result<(), CurveError> {
    match curve {
        RankCurve::Linear { positions: 0 } => Err(CurveError::NoPositions),
        RankCurve::Linear { .. } | RankCurve::BallotLength => Ok(()),
        RankCurve::Table { points } => {
            if points.is_empty() {
                return Err(CurveError::EmptyTable);
            }
            for (i, &value) in points.iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(CurveError::InvalidPoints { rank: i + 1, value });
                }
                if i > 0 && value > points[i - 1] {
                    return Err(CurveError::Increasing { rank: i + 1 });
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_counts_down_to_one() {
        let curve = RankCurve::Linear { positions: 3 };
        let pts: Vec<f64> = (1..=4).map(|r| points_for_rank(&curve, r, 0)).collect();
        assert_eq!(pts, vec![3.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn ballot_length_uses_ballot_size() {
        assert_eq!(points_for_rank(&RankCurve::BallotLength, 1, 2), 2.0);
        assert_eq!(points_for_rank(&RankCurve::BallotLength, 1, 5), 5.0);
        assert_eq!(points_for_rank(&RankCurve::BallotLength, 3, 2), 0.0);
    }

    #[test]
    fn table_lookup_and_tail() {
        let curve = RankCurve::Table {
            points: vec![5.0, 3.0, 1.0],
        };
        assert_eq!(points_for_rank(&curve, 2, 0), 3.0);
        assert_eq!(points_for_rank(&curve, 4, 0), 0.0);
        assert_eq!(points_for_rank(&curve, 0, 0), 0.0);
    }

    #[test]
    fn max_rank_prefers_explicit_limit_then_curve() {
        let mut poll = crate::testutil::poll(verdict_types::VotingMode::Ranked);
        assert_eq!(max_rank(&poll, 4), 4);
        poll.rank_curve = RankCurve::Table {
            points: vec![5.0, 3.0],
        };
        assert_eq!(max_rank(&poll, 4), 2);
        poll.rank_curve = RankCurve::Linear { positions: 6 };
        assert_eq!(max_rank(&poll, 4), 6);
        poll.max_ranked_positions = Some(3);
        assert_eq!(max_rank(&poll, 4), 3);
    }

    #[test]
    fn validation() {
        assert!(validate_curve(&RankCurve::Linear { positions: 1 }).is_ok());
        assert_eq!(
            validate_curve(&RankCurve::Linear { positions: 0 }),
            Err(CurveError::NoPositions)
        );
        assert_eq!(
            validate_curve(&RankCurve::Table { points: vec![] }),
            Err(CurveError::EmptyTable)
        );
        assert_eq!(
            validate_curve(&RankCurve::Table {
                points: vec![2.0, 3.0]
            }),
            Err(CurveError::Increasing { rank: 2 })
        );
        assert!(matches!(
            validate_curve(&RankCurve::Table {
                points: vec![1.0, -1.0]
            }),
            Err(CurveError::InvalidPoints { rank: 2, .. })
        ));
        assert!(validate_curve(&RankCurve::Table {
            points: vec![3.0, 3.0, 0.0]
        })
        .is_ok());
    }
}
