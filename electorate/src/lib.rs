//! Electorate registry.
//!
//! Holds the eligible members of each poll: voters identified by an
//! unguessable bearer token, and judges identified by normalized email.
//! Registration, revocation and delivery bookkeeping live here; the ballot
//! path only ever calls [`resolve_member`] and reads [`Turnout`].

pub mod error;
pub mod registry;
pub mod turnout;

pub use error::ElectorateError;
pub use registry::{
    add_judge, issue_voter_tokens, resolve_member, revoke_member, update_delivery_status,
    Credential, VoterInvite,
};
pub use turnout::{turnout, RoleTurnout, Turnout};
