//! Inputs to the node's create operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use verdict_types::{
    EventId, PollId, RankCurve, Timestamp, VotingMode, VotingPermissions, VotingSequence,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    #[serde(default)]
    pub start_date: Option<Timestamp>,
    #[serde(default)]
    pub end_date: Option<Timestamp>,
    #[serde(default)]
    pub voting_closes_at: Option<Timestamp>,
    #[serde(default)]
    pub submission_deadline: Option<Timestamp>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewPoll {
    pub event_id: EventId,
    pub name: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub voting_mode: VotingMode,
    #[serde(default = "default_permissions")]
    pub voting_permissions: VotingPermissions,
    #[serde(default = "default_weight")]
    pub voter_weight: f64,
    #[serde(default = "default_weight")]
    pub judge_weight: f64,
    #[serde(default)]
    pub allow_self_vote: bool,
    #[serde(default)]
    pub require_team_name_gate: bool,
    #[serde(default)]
    pub allow_vote_editing: bool,
    #[serde(default = "default_sequence")]
    pub voting_sequence: VotingSequence,
    #[serde(default)]
    pub max_ranked_positions: Option<u32>,
    #[serde(default)]
    pub min_voter_participation: Option<f64>,
    #[serde(default)]
    pub min_judge_participation: Option<f64>,
    #[serde(default)]
    pub is_public_results: bool,
    /// Resolved at creation when absent.
    #[serde(default)]
    pub rank_curve: Option<RankCurve>,
}

fn default_permissions() -> VotingPermissions {
    VotingPermissions::VotersAndJudges
}

fn default_weight() -> f64 {
    1.0
}

fn default_sequence() -> VotingSequence {
    VotingSequence::Simultaneous
}

impl NewPoll {
    /// A poll with every optional setting at its default.
    pub fn new(
        event_id: EventId,
        name: impl Into<String>,
        voting_mode: VotingMode,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Self {
        Self {
            event_id,
            name: name.into(),
            start_time,
            end_time,
            voting_mode,
            voting_permissions: default_permissions(),
            voter_weight: default_weight(),
            judge_weight: default_weight(),
            allow_self_vote: false,
            require_team_name_gate: false,
            allow_vote_editing: false,
            voting_sequence: default_sequence(),
            max_ranked_positions: None,
            min_voter_participation: None,
            min_judge_participation: None,
            is_public_results: false,
            rank_curve: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub poll_id: PollId,
    pub display_name: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub owner_identity: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_request_defaults() {
        let poll: NewPoll = serde_json::from_str(
            r#"{"event_id":"e","name":"Main","start_time":10,"end_time":20,"voting_mode":"ranked"}"#,
        )
        .unwrap();
        assert_eq!(poll.voter_weight, 1.0);
        assert_eq!(poll.voting_permissions, VotingPermissions::VotersAndJudges);
        assert_eq!(poll.voting_sequence, VotingSequence::Simultaneous);
        assert!(poll.rank_curve.is_none());
    }
}
