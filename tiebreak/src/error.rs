use thiserror::Error;
use verdict_crypto::CryptoError;
use verdict_store::StoreError;
use verdict_tally::PollRuleError;
use verdict_types::{EntryId, PollId};

#[derive(Debug, Error)]
pub enum TieBreakError {
    #[error("unknown poll {0}")]
    UnknownPoll(PollId),

    #[error("a tie-breaker needs at least two entries")]
    TooFewEntries,

    #[error("entry {0} is listed more than once")]
    DuplicateEntry(EntryId),

    #[error("entry {entry} is not part of poll {poll}")]
    EntryNotInPoll { entry: EntryId, poll: PollId },

    #[error("entries {first} and {other} do not share the same total score")]
    NotTied { first: EntryId, other: EntryId },

    #[error("entry {entry} already belongs to active tie-breaker {existing}")]
    ConflictingTieBreaker { existing: PollId, entry: EntryId },

    #[error("invalid tie-breaker poll: {0}")]
    InvalidPoll(#[from] PollRuleError),

    #[error("id generation failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
