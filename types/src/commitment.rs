//! Integrity commitments over canonicalized payloads.

use crate::hash::ContentHash;
use crate::id::{CommitmentId, EventId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a commitment covers. One row per `(event, type)`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitmentType {
    Rules,
    Results,
    Custom(String),
}

impl CommitmentType {
    pub fn as_key(&self) -> String {
        match self {
            Self::Rules => "rules".to_string(),
            Self::Results => "results".to_string(),
            Self::Custom(name) => format!("custom:{}", name),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "rules" => Self::Rules,
            "results" => Self::Results,
            other => Self::Custom(other.strip_prefix("custom:").unwrap_or(other).to_string()),
        }
    }
}

impl fmt::Display for CommitmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

/// Opaque external mirror of a commitment (e.g. a chain transaction).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAnchor {
    pub tx_ref: String,
    pub block_ref: Option<u64>,
    pub anchored_at: Timestamp,
}

/// A stored commitment. `hash` must equal the digest of `payload`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub id: CommitmentId,
    pub event_id: EventId,
    pub commitment_type: CommitmentType,
    pub hash: ContentHash,
    /// Canonical JSON text of the committed payload.
    pub payload: String,
    pub anchor: Option<ExternalAnchor>,
    /// Incremented on every upsert.
    pub revision: u32,
    pub committed_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_keys_round_trip() {
        for t in [
            CommitmentType::Rules,
            CommitmentType::Results,
            CommitmentType::Custom("roster".into()),
        ] {
            assert_eq!(CommitmentType::parse(&t.as_key()), t);
        }
    }

    #[test]
    fn bare_unknown_type_is_custom() {
        assert_eq!(
            CommitmentType::parse("audit"),
            CommitmentType::Custom("audit".into())
        );
    }
}
