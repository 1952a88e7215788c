//! Turnout: consumed members over registered, non-revoked members, per role.

use serde::Serialize;
use verdict_store::{ElectorateStore, StoreError};
use verdict_types::{Judge, PollId, Role, VoterToken};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoleTurnout {
    /// Non-revoked members.
    pub registered: u64,
    /// Non-revoked members who have cast a ballot.
    pub consumed: u64,
}

impl RoleTurnout {
    /// Turnout in percent, or `None` when nobody is registered.
    pub fn percent(&self) -> Option<f64> {
        if self.registered == 0 {
            None
        } else {
            Some(self.consumed as f64 / self.registered as f64 * 100.0)
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Turnout {
    pub voters: RoleTurnout,
    pub judges: RoleTurnout,
}

impl Turnout {
    pub fn from_members(voters: &[VoterToken], judges: &[Judge]) -> Self {
        let mut turnout = Self::default();
        for v in voters.iter().filter(|v| !v.revoked) {
            turnout.voters.registered += 1;
            turnout.voters.consumed += u64::from(v.used);
        }
        for j in judges.iter().filter(|j| !j.revoked) {
            turnout.judges.registered += 1;
            turnout.judges.consumed += u64::from(j.has_voted);
        }
        turnout
    }

    pub fn for_role(&self, role: Role) -> RoleTurnout {
        match role {
            Role::Voter => self.voters,
            Role::Judge => self.judges,
        }
    }
}

/// Current turnout of a poll.
pub fn turnout<S: ElectorateStore + ?Sized>(store: &S, poll: &PollId) -> Result<Turnout, StoreError> {
    Ok(Turnout::from_members(
        &store.voter_tokens_for_poll(poll)?,
        &store.judges_for_poll(poll)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_types::{DeliveryStatus, Timestamp, VoterTokenId};

    fn voter(id: &str, used: bool, revoked: bool) -> VoterToken {
        VoterToken {
            id: VoterTokenId::from(id),
            poll_id: PollId::from("p"),
            email: format!("{id}@x.y"),
            assigned_entry: None,
            used,
            revoked,
            delivery_status: DeliveryStatus::Sent,
            created_at: Timestamp::new(0),
        }
    }

    #[test]
    fn revoked_members_leave_the_denominator() {
        let voters = [voter("a", true, false), voter("b", false, false), voter("c", true, true), voter("d", false, false)];
        let t = Turnout::from_members(&voters, &[]);
        assert_eq!(t.voters, RoleTurnout { registered: 3, consumed: 1 });
        let pct = t.voters.percent().unwrap();
        assert!((pct - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(t.judges.percent(), None);
    }
}
