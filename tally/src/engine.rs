//! Recompute-on-read tallying.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;
use verdict_electorate::Turnout;
use verdict_store::PollSnapshot;
use verdict_types::{Ballot, BallotChoice, EntryId, MemberRef, Poll, PollId, Role, VotingMode};

use crate::curve::{max_rank, points_for_rank};
use crate::quorum::{quorum_warnings, TallyWarning};

/// Weighted points one ballot awards to one entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntryPoints {
    pub entry: EntryId,
    /// Rank position for ranked ballots.
    pub rank: Option<u32>,
    pub points: f64,
}

/// Per-entry points of a single ballot, already scaled by the role weight.
///
/// Single and multiple ballots award the role weight once per distinct
/// target. Ranked ballots award the poll's curve value for each rank.
pub fn ballot_points(poll: &Poll, ballot: &Ballot) -> Vec<EntryPoints> {
    let weight = poll.weight_for(ballot.role());
    let mut seen = HashSet::new();
    match &ballot.choice {
        BallotChoice::Single { entry } => vec![EntryPoints {
            entry: entry.clone(),
            rank: None,
            points: weight,
        }],
        BallotChoice::Multiple { entries } => entries
            .iter()
            .filter(|e| seen.insert(*e))
            .map(|e| EntryPoints {
                entry: e.clone(),
                rank: None,
                points: weight,
            })
            .collect(),
        BallotChoice::Ranked { rankings } => rankings
            .iter()
            .filter(|r| seen.insert(&r.entry))
            .map(|r| EntryPoints {
                entry: r.entry.clone(),
                rank: Some(r.rank),
                points: points_for_rank(&poll.rank_curve, r.rank, rankings.len()) * weight,
            })
            .collect(),
    }
}

/// One row of the result set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntryResult {
    pub entry: EntryId,
    pub display_name: String,
    /// `voter_score + judge_score`.
    pub total_score: f64,
    pub voter_score: f64,
    pub judge_score: f64,
    /// Distinct ballots touching this entry.
    pub vote_count: u32,
    /// Ranked polls only: `rank_histogram[r - 1]` ballots placed the entry at rank `r`.
    /// One slot per rank up to the poll's rank limit or its entry count,
    /// whichever is smaller. Ranks past the last slot still score.
    pub rank_histogram: Option<Vec<u32>>,
    /// 1-based position after sorting.
    pub position: u32,
}

/// The ranked result set of a poll.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tally {
    pub poll_id: PollId,
    pub mode: VotingMode,
    pub ballots_counted: u32,
    /// Sorted by `total_score` descending; equal scores keep entry order.
    pub entries: Vec<EntryResult>,
    pub turnout: Turnout,
    pub warnings: Vec<TallyWarning>,
    /// Set when any quorum threshold is unmet. Such a result is provisional.
    pub below_quorum: bool,
}

impl Tally {
    pub fn result_for(&self, entry: &EntryId) -> Option<&EntryResult> {
        self.entries.iter().find(|r| &r.entry == entry)
    }

    pub fn winner(&self) -> Option<&EntryResult> {
        self.entries.first()
    }
}

/// Tally a consistent snapshot. Pure: the same snapshot always yields the
/// same tally.
///
/// Ballots are summed in member-key order so floating point accumulation is
/// independent of storage order. Contributions to entries outside the poll
/// are ignored, as are ballots of members currently revoked, matching the
/// turnout figures.
pub fn compute_tally(snapshot: &PollSnapshot) -> Tally {
    let poll = &snapshot.poll;
    let ranked = poll.voting_mode == VotingMode::Ranked;
    // Fixed up front; never grown from ballot contents.
    let histogram_len = (max_rank(poll, snapshot.entries.len()) as usize).min(snapshot.entries.len());

    let index: HashMap<&EntryId, usize> = snapshot
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| (&e.id, i))
        .collect();
    let mut rows: Vec<EntryResult> = snapshot
        .entries
        .iter()
        .map(|e| EntryResult {
            entry: e.id.clone(),
            display_name: e.display_name.clone(),
            total_score: 0.0,
            voter_score: 0.0,
            judge_score: 0.0,
            vote_count: 0,
            rank_histogram: ranked.then(|| vec![0; histogram_len]),
            position: 0,
        })
        .collect();

    // Ballots of revoked members stay stored but do not count while revoked.
    let revoked: HashSet<String> = snapshot
        .voters
        .iter()
        .filter(|v| v.revoked)
        .map(|v| MemberRef::Voter(v.id.clone()).key())
        .chain(
            snapshot
                .judges
                .iter()
                .filter(|j| j.revoked)
                .map(|j| MemberRef::Judge(j.id.clone()).key()),
        )
        .collect();
    let mut ballots: Vec<&Ballot> = snapshot
        .ballots
        .iter()
        .filter(|b| b.poll_id == poll.id && !revoked.contains(&b.member.key()))
        .collect();
    ballots.sort_by_key(|b| b.member.key());

    for ballot in &ballots {
        for contribution in ballot_points(poll, ballot) {
            let Some(&i) = index.get(&contribution.entry) else {
                continue;
            };
            let row = &mut rows[i];
            match ballot.role() {
                Role::Voter => row.voter_score += contribution.points,
                Role::Judge => row.judge_score += contribution.points,
            }
            row.vote_count += 1;
            if let (Some(hist), Some(rank)) = (row.rank_histogram.as_mut(), contribution.rank) {
                if let Some(slot) = (rank as usize).checked_sub(1).and_then(|i| hist.get_mut(i)) {
                    *slot += 1;
                }
            }
        }
    }

    for row in &mut rows {
        row.total_score = row.voter_score + row.judge_score;
    }
    // Stable: equal totals keep attachment order.
    rows.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));
    for (i, row) in rows.iter_mut().enumerate() {
        row.position = i as u32 + 1;
    }

    let turnout = Turnout::from_members(&snapshot.voters, &snapshot.judges);
    let warnings = quorum_warnings(poll, &turnout);
    let below_quorum = !warnings.is_empty();
    debug!(
        poll = %poll.id,
        ballots = ballots.len(),
        below_quorum,
        "tally computed"
    );

    Tally {
        poll_id: poll.id.clone(),
        mode: poll.voting_mode,
        ballots_counted: ballots.len() as u32,
        entries: rows,
        turnout,
        warnings,
        below_quorum,
    }
}
