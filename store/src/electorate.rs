//! Electorate storage trait.
//!
//! Voter tokens are keyed by `(poll, token id)`, judges by `(poll, judge id)`
//! with a unique `(poll, normalized email)` index.

use crate::StoreError;
use verdict_types::{DeliveryStatus, Judge, JudgeId, MemberRef, PollId, VoterToken, VoterTokenId};

pub trait ElectorateStore {
    /// Insert a voter token. Fails with `Duplicate` if the id exists in the poll.
    fn insert_voter_token(&self, token: &VoterToken) -> Result<(), StoreError>;

    /// Insert a judge. Fails with `Duplicate` if the id or the email is
    /// already registered in the poll.
    fn insert_judge(&self, judge: &Judge) -> Result<(), StoreError>;

    fn get_voter_token(&self, poll: &PollId, id: &VoterTokenId) -> Result<VoterToken, StoreError>;

    fn get_judge(&self, poll: &PollId, id: &JudgeId) -> Result<Judge, StoreError>;

    /// Look up a judge by normalized email.
    fn find_judge_by_email(&self, poll: &PollId, email: &str) -> Result<Option<Judge>, StoreError>;

    fn voter_tokens_for_poll(&self, poll: &PollId) -> Result<Vec<VoterToken>, StoreError>;

    fn judges_for_poll(&self, poll: &PollId) -> Result<Vec<Judge>, StoreError>;

    /// Atomically set the revoked flag on a member.
    fn set_member_revoked(
        &self,
        poll: &PollId,
        member: &MemberRef,
        revoked: bool,
    ) -> Result<(), StoreError>;

    /// Atomically record the delivery outcome for a member's invitation.
    fn set_delivery_status(
        &self,
        poll: &PollId,
        member: &MemberRef,
        status: DeliveryStatus,
    ) -> Result<(), StoreError>;
}
