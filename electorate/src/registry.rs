//! Member registration and lookup.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use verdict_store::{ElectorateStore, EntryStore, StoreError};
use verdict_types::{
    normalize_email, DeliveryStatus, EntryId, Judge, JudgeId, Member, MemberRef, Poll, PollId,
    Role, Timestamp, VoterToken, VoterTokenId,
};

use crate::error::ElectorateError;

/// What a ballot presents to prove membership.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Credential {
    /// Bearer token handed to a voter.
    VoterToken(VoterTokenId),
    /// A judge's email, matched after normalization.
    JudgeEmail(String),
}

impl Credential {
    pub fn role(&self) -> Role {
        match self {
            Self::VoterToken(_) => Role::Voter,
            Self::JudgeEmail(_) => Role::Judge,
        }
    }

    /// Build a credential for `role` from the raw identity string.
    pub fn for_role(role: Role, identity: impl Into<String>) -> Self {
        match role {
            Role::Voter => Self::VoterToken(VoterTokenId::new(identity.into())),
            Role::Judge => Self::JudgeEmail(identity.into()),
        }
    }
}

/// One voter to invite.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterInvite {
    pub email: String,
    /// The voter's own team, used for self-vote gating.
    #[serde(default)]
    pub assigned_entry: Option<EntryId>,
}

fn checked_email(raw: &str) -> Result<String, ElectorateError> {
    let email = normalize_email(raw);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(ElectorateError::InvalidEmail(raw.to_string())),
    }
}

/// Issue one fresh token per invite. Every invite is validated before any
/// token is written.
pub fn issue_voter_tokens<S>(
    store: &S,
    poll: &Poll,
    invites: &[VoterInvite],
    token_bytes: usize,
    now: Timestamp,
) -> Result<Vec<VoterToken>, ElectorateError>
where
    S: ElectorateStore + EntryStore + ?Sized,
{
    let members: Vec<EntryId> = store
        .entries_for_poll(&poll.id)?
        .into_iter()
        .map(|e| e.id)
        .collect();

    let mut tokens = Vec::with_capacity(invites.len());
    for invite in invites {
        let email = checked_email(&invite.email)?;
        if let Some(entry) = &invite.assigned_entry {
            if !members.contains(entry) {
                return Err(ElectorateError::EntryNotInPoll {
                    entry: entry.clone(),
                    poll: poll.id.clone(),
                });
            }
        }
        tokens.push(VoterToken {
            id: VoterTokenId::new(verdict_crypto::voter_token(token_bytes)?),
            poll_id: poll.id.clone(),
            email,
            assigned_entry: invite.assigned_entry.clone(),
            used: false,
            revoked: false,
            delivery_status: DeliveryStatus::Pending,
            created_at: now,
        });
    }

    for token in &tokens {
        store.insert_voter_token(token)?;
    }
    info!(poll = %poll.id, count = tokens.len(), "issued voter tokens");
    Ok(tokens)
}

/// Register a judge. Emails are unique per poll after normalization.
pub fn add_judge<S: ElectorateStore + ?Sized>(
    store: &S,
    poll: &Poll,
    email: &str,
    name: Option<String>,
    now: Timestamp,
) -> Result<Judge, ElectorateError> {
    let email = checked_email(email)?;
    let judge = Judge {
        id: JudgeId::new(verdict_crypto::random_id("judge")?),
        poll_id: poll.id.clone(),
        email: email.clone(),
        name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        has_voted: false,
        revoked: false,
        delivery_status: DeliveryStatus::Pending,
        created_at: now,
    };
    match store.insert_judge(&judge) {
        Ok(()) => {}
        Err(StoreError::Duplicate(_)) => {
            return Err(ElectorateError::DuplicateJudge {
                email,
                poll: poll.id.clone(),
            })
        }
        Err(e) => return Err(e.into()),
    }
    info!(poll = %poll.id, judge = %judge.id, "registered judge");
    Ok(judge)
}

/// Look up the member a credential names in `poll`, revoked or not.
pub fn resolve_member<S: ElectorateStore + ?Sized>(
    store: &S,
    poll: &PollId,
    credential: &Credential,
) -> Result<Option<Member>, ElectorateError> {
    let found = match credential {
        Credential::VoterToken(id) => match store.get_voter_token(poll, id) {
            Ok(token) => Some(Member::Voter(token)),
            Err(StoreError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        },
        Credential::JudgeEmail(email) => store.find_judge_by_email(poll, email)?.map(Member::Judge),
    };
    if found.is_none() {
        debug!(poll = %poll, role = %credential.role(), "credential did not resolve");
    }
    Ok(found)
}

/// Revoke (or restore) a member. Revoked members cannot vote and do not
/// count toward turnout.
pub fn revoke_member<S: ElectorateStore + ?Sized>(
    store: &S,
    poll: &PollId,
    member: &MemberRef,
    revoked: bool,
) -> Result<(), ElectorateError> {
    store.set_member_revoked(poll, member, revoked)?;
    info!(poll = %poll, member = %member, revoked, "member revocation updated");
    Ok(())
}

/// Record the invitation delivery outcome reported by the mailer.
pub fn update_delivery_status<S: ElectorateStore + ?Sized>(
    store: &S,
    poll: &PollId,
    member: &MemberRef,
    status: DeliveryStatus,
) -> Result<(), ElectorateError> {
    debug!(poll = %poll, member = %member, status = ?status, "delivery status");
    store.set_delivery_status(poll, member, status)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use verdict_nullables::NullStore;
    use verdict_types::{Entry, EventId, RankCurve, VotingMode, VotingPermissions, VotingSequence};

    pub(crate) fn poll(id: &str) -> Poll {
        Poll {
            id: PollId::from(id),
            event_id: EventId::from("e"),
            name: "main".into(),
            start_time: Timestamp::new(0),
            end_time: Timestamp::new(100),
            voting_mode: VotingMode::Single,
            voting_permissions: VotingPermissions::VotersAndJudges,
            voter_weight: 1.0,
            judge_weight: 1.0,
            allow_self_vote: false,
            require_team_name_gate: false,
            allow_vote_editing: false,
            voting_sequence: VotingSequence::Simultaneous,
            max_ranked_positions: None,
            min_voter_participation: None,
            min_judge_participation: None,
            is_public_results: false,
            is_tie_breaker: false,
            tie_breaker_of: None,
            superseded_by: None,
            rank_curve: RankCurve::BallotLength,
            created_at: Timestamp::new(0),
        }
    }

    fn entry(id: &str, poll: &str) -> Entry {
        Entry {
            id: EntryId::from(id),
            event_id: EventId::from("e"),
            home_poll: PollId::from(poll),
            display_name: id.into(),
            metadata: BTreeMap::new(),
            owner_identity: None,
            duplicated_from: None,
            created_at: Timestamp::new(0),
        }
    }

    fn invite(email: &str, entry: Option<&str>) -> VoterInvite {
        VoterInvite {
            email: email.into(),
            assigned_entry: entry.map(EntryId::from),
        }
    }

    #[test]
    fn tokens_are_unique_and_resolvable() {
        let store = NullStore::new();
        let p = poll("p1");
        store.insert_entry(&entry("a", "p1")).unwrap();

        let tokens = issue_voter_tokens(
            &store,
            &p,
            &[invite("One@Example.com ", Some("a")), invite("two@example.com", None)],
            16,
            Timestamp::new(5),
        )
        .unwrap();
        assert_eq!(tokens.len(), 2);
        assert_ne!(tokens[0].id, tokens[1].id);
        assert_eq!(tokens[0].email, "one@example.com");
        assert_eq!(tokens[0].id.as_str().len(), 32);

        let member = resolve_member(&store, &p.id, &Credential::VoterToken(tokens[0].id.clone()))
            .unwrap()
            .unwrap();
        assert_eq!(member.assigned_entry(), Some(&EntryId::from("a")));
        assert!(resolve_member(&store, &p.id, &Credential::VoterToken(VoterTokenId::from("guess")))
            .unwrap()
            .is_none());
    }

    #[test]
    fn invalid_invite_writes_nothing() {
        let store = NullStore::new();
        let p = poll("p1");
        let err = issue_voter_tokens(
            &store,
            &p,
            &[invite("ok@example.com", None), invite("not-an-email", None)],
            16,
            Timestamp::new(5),
        )
        .unwrap_err();
        assert!(matches!(err, ElectorateError::InvalidEmail(_)));
        assert!(store.voter_tokens_for_poll(&p.id).unwrap().is_empty());

        let err = issue_voter_tokens(&store, &p, &[invite("x@y.z", Some("ghost"))], 16, Timestamp::new(5))
            .unwrap_err();
        assert!(matches!(err, ElectorateError::EntryNotInPoll { .. }));
    }

    #[test]
    fn judges_resolve_by_normalized_email() {
        let store = NullStore::new();
        let p = poll("p1");
        let judge = add_judge(&store, &p, " Grace@Example.com", Some(" Grace ".into()), Timestamp::new(1)).unwrap();
        assert_eq!(judge.name.as_deref(), Some("Grace"));

        let err = add_judge(&store, &p, "grace@example.com", None, Timestamp::new(2)).unwrap_err();
        assert!(matches!(err, ElectorateError::DuplicateJudge { .. }));

        let found = resolve_member(&store, &p.id, &Credential::JudgeEmail("GRACE@example.com".into()))
            .unwrap()
            .unwrap();
        assert_eq!(found.role(), Role::Judge);
        assert_eq!(found.member_ref(), MemberRef::Judge(judge.id));
    }

    #[test]
    fn revocation_and_delivery() {
        let store = NullStore::new();
        let p = poll("p1");
        let judge = add_judge(&store, &p, "j@example.com", None, Timestamp::new(1)).unwrap();
        let member = MemberRef::Judge(judge.id.clone());

        revoke_member(&store, &p.id, &member, true).unwrap();
        update_delivery_status(
            &store,
            &p.id,
            &member,
            DeliveryStatus::Failed {
                reason: "mailbox full".into(),
            },
        )
        .unwrap();

        let stored = store.get_judge(&p.id, &judge.id).unwrap();
        assert!(stored.revoked);
        assert!(matches!(stored.delivery_status, DeliveryStatus::Failed { .. }));
    }

    #[test]
    fn credential_roles() {
        assert_eq!(Credential::for_role(Role::Voter, "tok").role(), Role::Voter);
        assert_eq!(
            Credential::for_role(Role::Judge, "j@x.y"),
            Credential::JudgeEmail("j@x.y".into())
        );
    }
}
