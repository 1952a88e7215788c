//! Electorate members: token-bearing voters and email-identified judges.

use crate::id::{EntryId, JudgeId, PollId, VoterTokenId};
use crate::poll::Role;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outbound invitation delivery state, owned by the notification collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Bounced,
    Failed { reason: String },
}

/// A voter identified by a bearer token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterToken {
    pub id: VoterTokenId,
    pub poll_id: PollId,
    pub email: String,
    /// The team this voter belongs to, if any.
    pub assigned_entry: Option<EntryId>,
    pub used: bool,
    pub revoked: bool,
    pub delivery_status: DeliveryStatus,
    pub created_at: Timestamp,
}

/// A judge identified by email within one poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judge {
    pub id: JudgeId,
    pub poll_id: PollId,
    pub email: String,
    pub name: Option<String>,
    pub has_voted: bool,
    pub revoked: bool,
    pub delivery_status: DeliveryStatus,
    pub created_at: Timestamp,
}

/// Reference from a ballot to the member that cast it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRef {
    Voter(VoterTokenId),
    Judge(JudgeId),
}

impl MemberRef {
    pub fn role(&self) -> Role {
        match self {
            Self::Voter(_) => Role::Voter,
            Self::Judge(_) => Role::Judge,
        }
    }

    /// Stable storage key, unique across both roles within a poll.
    pub fn key(&self) -> String {
        match self {
            Self::Voter(id) => format!("v:{}", id),
            Self::Judge(id) => format!("j:{}", id),
        }
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// A resolved electorate member of either role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Member {
    Voter(VoterToken),
    Judge(Judge),
}

impl Member {
    pub fn member_ref(&self) -> MemberRef {
        match self {
            Self::Voter(v) => MemberRef::Voter(v.id.clone()),
            Self::Judge(j) => MemberRef::Judge(j.id.clone()),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::Voter(_) => Role::Voter,
            Self::Judge(_) => Role::Judge,
        }
    }

    pub fn poll_id(&self) -> &PollId {
        match self {
            Self::Voter(v) => &v.poll_id,
            Self::Judge(j) => &j.poll_id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Self::Voter(v) => &v.email,
            Self::Judge(j) => &j.email,
        }
    }

    pub fn assigned_entry(&self) -> Option<&EntryId> {
        match self {
            Self::Voter(v) => v.assigned_entry.as_ref(),
            Self::Judge(_) => None,
        }
    }

    pub fn is_consumed(&self) -> bool {
        match self {
            Self::Voter(v) => v.used,
            Self::Judge(j) => j.has_voted,
        }
    }

    pub fn is_revoked(&self) -> bool {
        match self {
            Self::Voter(v) => v.revoked,
            Self::Judge(j) => j.revoked,
        }
    }
}

/// Canonical form of an email address used for judge lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_keys_do_not_collide_across_roles() {
        let voter = MemberRef::Voter(VoterTokenId::from("x"));
        let judge = MemberRef::Judge(JudgeId::from("x"));
        assert_ne!(voter.key(), judge.key());
        assert_eq!(voter.role(), Role::Voter);
        assert_eq!(judge.role(), Role::Judge);
    }

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Judge@Example.COM "), "judge@example.com");
    }
}
