//! Fundamental records for verdict.
//!
//! This crate defines the types shared across every other crate in the
//! workspace: identifiers, timestamps, content hashes, and the persisted
//! records for events, polls, entries, electorate members, ballots,
//! integrity commitments and participation.

pub mod ballot;
pub mod commitment;
pub mod electorate;
pub mod entry;
pub mod error;
pub mod event;
pub mod hash;
pub mod id;
pub mod notify;
pub mod participation;
pub mod poll;
pub mod time;

pub use ballot::{Ballot, BallotChoice, RankedChoice};
pub use commitment::{Commitment, CommitmentType, ExternalAnchor};
pub use electorate::{normalize_email, DeliveryStatus, Judge, Member, MemberRef, VoterToken};
pub use entry::Entry;
pub use error::TypesError;
pub use event::{Event, EventStatus};
pub use hash::ContentHash;
pub use id::{CommitmentId, EntryId, EventId, JudgeId, PollId, VoterTokenId};
pub use notify::{Notification, Notifier};
pub use participation::{ParticipationAction, ParticipationRecord};
pub use poll::{Poll, RankCurve, Role, VotingMode, VotingPermissions, VotingSequence};
pub use time::{Clock, SystemClock, Timestamp};
