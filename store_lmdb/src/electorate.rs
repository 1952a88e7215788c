//! LMDB implementation of ElectorateStore.

use heed::RwTxn;
use verdict_store::{ElectorateStore, StoreError};
use verdict_types::{
    normalize_email, DeliveryStatus, Judge, JudgeId, MemberRef, PollId, VoterToken, VoterTokenId,
};

use crate::keys::{child_prefix, composite, get_record, put_record, scan_records, utf8};
use crate::{LmdbError, LmdbStore};

pub(crate) fn voter_key(poll: &PollId, id: &VoterTokenId) -> Vec<u8> {
    composite(&[poll.as_str().as_bytes(), id.as_str().as_bytes()])
}

pub(crate) fn judge_key(poll: &PollId, id: &JudgeId) -> Vec<u8> {
    composite(&[poll.as_str().as_bytes(), id.as_str().as_bytes()])
}

fn email_key(poll: &PollId, email: &str) -> Vec<u8> {
    composite(&[poll.as_str().as_bytes(), normalize_email(email).as_bytes()])
}

impl LmdbStore {
    /// Read-modify-write of one member inside `wtxn`.
    fn update_member(
        &self,
        wtxn: &mut RwTxn,
        poll: &PollId,
        member: &MemberRef,
        apply: impl FnOnce(&mut bool, &mut DeliveryStatus, &mut bool),
    ) -> Result<(), StoreError> {
        match member {
            MemberRef::Voter(id) => {
                let key = voter_key(poll, id);
                let mut token: VoterToken = get_record(&self.dbs.voters, wtxn, &key)?
                    .ok_or_else(|| StoreError::NotFound(format!("voter token {} in poll {}", id, poll)))?;
                apply(&mut token.revoked, &mut token.delivery_status, &mut token.used);
                put_record(&self.dbs.voters, wtxn, &key, &token)?;
            }
            MemberRef::Judge(id) => {
                let key = judge_key(poll, id);
                let mut judge: Judge = get_record(&self.dbs.judges, wtxn, &key)?
                    .ok_or_else(|| StoreError::NotFound(format!("judge {} in poll {}", id, poll)))?;
                apply(&mut judge.revoked, &mut judge.delivery_status, &mut judge.has_voted);
                put_record(&self.dbs.judges, wtxn, &key, &judge)?;
            }
        }
        Ok(())
    }

    /// Mark a member consumed inside an open write transaction.
    pub(crate) fn mark_consumed_in(
        &self,
        wtxn: &mut RwTxn,
        poll: &PollId,
        member: &MemberRef,
    ) -> Result<(), StoreError> {
        self.update_member(wtxn, poll, member, |_, _, consumed| *consumed = true)
    }
}

impl ElectorateStore for LmdbStore {
    fn insert_voter_token(&self, token: &VoterToken) -> Result<(), StoreError> {
        let key = voter_key(&token.poll_id, &token.id);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self.dbs.voters.get(&wtxn, &key).map_err(LmdbError::from)?.is_some() {
            return Err(StoreError::Duplicate(format!("voter token {}", token.id)));
        }
        put_record(&self.dbs.voters, &mut wtxn, &key, token)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn insert_judge(&self, judge: &Judge) -> Result<(), StoreError> {
        let key = judge_key(&judge.poll_id, &judge.id);
        let email = email_key(&judge.poll_id, &judge.email);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self.dbs.judges.get(&wtxn, &key).map_err(LmdbError::from)?.is_some() {
            return Err(StoreError::Duplicate(format!("judge {}", judge.id)));
        }
        if self.dbs.judge_emails.get(&wtxn, &email).map_err(LmdbError::from)?.is_some() {
            return Err(StoreError::Duplicate(format!(
                "judge email {} in poll {}",
                normalize_email(&judge.email),
                judge.poll_id
            )));
        }
        put_record(&self.dbs.judges, &mut wtxn, &key, judge)?;
        self.dbs
            .judge_emails
            .put(&mut wtxn, &email, judge.id.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_voter_token(&self, poll: &PollId, id: &VoterTokenId) -> Result<VoterToken, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        get_record(&self.dbs.voters, &rtxn, &voter_key(poll, id))?
            .ok_or_else(|| StoreError::NotFound(format!("voter token {} in poll {}", id, poll)))
    }

    fn get_judge(&self, poll: &PollId, id: &JudgeId) -> Result<Judge, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        get_record(&self.dbs.judges, &rtxn, &judge_key(poll, id))?
            .ok_or_else(|| StoreError::NotFound(format!("judge {} in poll {}", id, poll)))
    }

    fn find_judge_by_email(&self, poll: &PollId, email: &str) -> Result<Option<Judge>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let Some(id) = self
            .dbs
            .judge_emails
            .get(&rtxn, &email_key(poll, email))
            .map_err(LmdbError::from)?
        else {
            return Ok(None);
        };
        let id = JudgeId::from(utf8(id.to_vec())?);
        let judge = get_record(&self.dbs.judges, &rtxn, &judge_key(poll, &id))?.ok_or_else(|| {
            StoreError::Corruption(format!("email index points at missing judge {}", id))
        })?;
        Ok(Some(judge))
    }

    fn voter_tokens_for_poll(&self, poll: &PollId) -> Result<Vec<VoterToken>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(scan_records(&self.dbs.voters, &rtxn, &child_prefix(poll.as_str().as_bytes()))?)
    }

    fn judges_for_poll(&self, poll: &PollId) -> Result<Vec<Judge>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(scan_records(&self.dbs.judges, &rtxn, &child_prefix(poll.as_str().as_bytes()))?)
    }

    fn set_member_revoked(
        &self,
        poll: &PollId,
        member: &MemberRef,
        revoked: bool,
    ) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.update_member(&mut wtxn, poll, member, |flag, _, _| *flag = revoked)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn set_delivery_status(
        &self,
        poll: &PollId,
        member: &MemberRef,
        status: DeliveryStatus,
    ) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.update_member(&mut wtxn, poll, member, |_, delivery, _| *delivery = status)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{judge, open_store, voter};

    #[test]
    fn judges_unique_by_email_per_poll() {
        let (_dir, store) = open_store();
        store.insert_judge(&judge("j1", "p1", "ada@example.com")).unwrap();
        assert!(matches!(
            store.insert_judge(&judge("j2", "p1", " ADA@example.com")),
            Err(StoreError::Duplicate(_))
        ));
        // Same email in another poll is a different judge.
        store.insert_judge(&judge("j3", "p2", "ada@example.com")).unwrap();

        let found = store
            .find_judge_by_email(&PollId::from("p1"), "Ada@Example.com")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, JudgeId::from("j1"));
        assert!(store
            .find_judge_by_email(&PollId::from("p1"), "nobody@example.com")
            .unwrap()
            .is_none());
    }

    #[test]
    fn tokens_scoped_to_poll() {
        let (_dir, store) = open_store();
        store.insert_voter_token(&voter("t1", "p1")).unwrap();
        store.insert_voter_token(&voter("t2", "p1")).unwrap();
        store.insert_voter_token(&voter("t3", "p10")).unwrap();

        assert_eq!(store.voter_tokens_for_poll(&PollId::from("p1")).unwrap().len(), 2);
        assert!(store
            .get_voter_token(&PollId::from("p10"), &VoterTokenId::from("t1"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn revoke_and_delivery_updates() {
        let (_dir, store) = open_store();
        let poll = PollId::from("p1");
        store.insert_voter_token(&voter("t1", "p1")).unwrap();
        let member = MemberRef::Voter(VoterTokenId::from("t1"));

        store.set_member_revoked(&poll, &member, true).unwrap();
        store
            .set_delivery_status(&poll, &member, DeliveryStatus::Bounced)
            .unwrap();

        let token = store.get_voter_token(&poll, &VoterTokenId::from("t1")).unwrap();
        assert!(token.revoked);
        assert_eq!(token.delivery_status, DeliveryStatus::Bounced);
        assert!(!token.used);

        let ghost = MemberRef::Judge(JudgeId::from("nobody"));
        assert!(store.set_member_revoked(&poll, &ghost, true).unwrap_err().is_not_found());
    }
}
