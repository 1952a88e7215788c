use thiserror::Error;
use verdict_crypto::CryptoError;
use verdict_store::StoreError;
use verdict_types::{CommitmentId, ContentHash};

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The stored payload no longer hashes to the stored digest.
    #[error("integrity mismatch on commitment {commitment}: stored {stored}, recomputed {recomputed}")]
    IntegrityMismatch {
        commitment: CommitmentId,
        stored: ContentHash,
        recomputed: ContentHash,
    },

    #[error("commitment {0} is already anchored at its current revision")]
    AlreadyAnchored(CommitmentId),

    #[error("unknown commitment {0}")]
    UnknownCommitment(CommitmentId),

    #[error("payload error: {0}")]
    Payload(#[from] CryptoError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl LedgerError {
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::IntegrityMismatch { .. })
    }
}
