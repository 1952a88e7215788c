//! Opaque string identifiers.
//!
//! Identifiers are minted by `verdict-crypto` (random hex) or supplied by
//! collaborators that own the records (organizer tooling). The core never
//! interprets their contents, it only compares them.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a parent event (hackathon / campaign).
    EventId
);
string_id!(
    /// Identifier of a poll.
    PollId
);
string_id!(
    /// Identifier of an entry (team) competing in one or more polls.
    EntryId
);
string_id!(
    /// Bearer token identifying a voter. Doubles as the voter's id.
    VoterTokenId
);
string_id!(
    /// Identifier of a judge registration within a poll.
    JudgeId
);
string_id!(
    /// Identifier of an integrity commitment row.
    CommitmentId
);
