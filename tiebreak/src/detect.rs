//! Exact-score tie detection over a computed tally.

use serde::Serialize;
use verdict_tally::Tally;
use verdict_types::EntryId;

/// Two or more consecutive entries with identical `total_score`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TieGroup {
    pub total_score: f64,
    /// In tally order.
    pub entries: Vec<EntryId>,
    /// 1-based position of the first tied entry.
    pub first_position: u32,
    /// 1-based position of the last tied entry.
    pub last_position: u32,
}

impl TieGroup {
    /// Whether the group extends past `cutoff`, so that only some of its
    /// members make the cut.
    pub fn straddles(&self, cutoff: u32) -> bool {
        self.first_position <= cutoff && self.last_position > cutoff
    }
}

/// Every tie group in the tally, best first.
pub fn all_tie_groups(tally: &Tally) -> Vec<TieGroup> {
    let mut groups = Vec::new();
    let rows = &tally.entries;
    let mut start = 0;
    while start < rows.len() {
        let score = rows[start].total_score;
        let mut end = start + 1;
        while end < rows.len() && rows[end].total_score == score {
            end += 1;
        }
        if end - start >= 2 {
            groups.push(TieGroup {
                total_score: score,
                entries: rows[start..end].iter().map(|r| r.entry.clone()).collect(),
                first_position: rows[start].position,
                last_position: rows[end - 1].position,
            });
        }
        start = end;
    }
    groups
}

/// The tie group occupying position `cutoff`, if the entry there is tied.
///
/// For a top-2 cutoff this covers a tie for second place that spills into
/// third as well as a tie between the first two.
pub fn detect_ties(tally: &Tally, cutoff: u32) -> Option<TieGroup> {
    all_tie_groups(tally)
        .into_iter()
        .find(|g| g.first_position <= cutoff && cutoff <= g.last_position)
}
