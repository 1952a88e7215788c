use thiserror::Error;
use verdict_crypto::CryptoError;
use verdict_store::StoreError;
use verdict_types::{EntryId, PollId};

#[derive(Debug, Error)]
pub enum ElectorateError {
    #[error("invalid email address: '{0}'")]
    InvalidEmail(String),

    #[error("entry {entry} is not part of poll {poll}")]
    EntryNotInPoll { entry: EntryId, poll: PollId },

    #[error("judge {email} already registered in poll {poll}")]
    DuplicateJudge { email: String, poll: PollId },

    #[error("token generation failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
