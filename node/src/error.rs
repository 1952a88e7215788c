use thiserror::Error;
use verdict_crypto::CryptoError;
use verdict_electorate::ElectorateError;
use verdict_ledger::LedgerError;
use verdict_lifecycle::{LifecycleError, TransitionDenied};
use verdict_store::StoreError;
use verdict_store_lmdb::LmdbError;
use verdict_tally::{PollRuleError, TallyError};
use verdict_tiebreak::TieBreakError;
use verdict_types::{CommitmentId, ContentHash, EntryId, EventId, EventStatus, PollId};

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("unknown event {0}")]
    UnknownEvent(EventId),

    #[error("unknown poll {0}")]
    UnknownPoll(PollId),

    #[error("unknown entry {0}")]
    UnknownEntry(EntryId),

    #[error("unknown commitment {0}")]
    UnknownCommitment(CommitmentId),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("results of poll {0} are not public yet")]
    ResultsNotPublic(PollId),

    #[error(transparent)]
    TransitionDenied(TransitionDenied),

    #[error("event {event} changed status concurrently (expected {expected})")]
    Conflict { event: EventId, expected: EventStatus },

    #[error("invalid poll: {0}")]
    InvalidPoll(#[from] PollRuleError),

    /// Stored content no longer matches its commitment. Never auto-corrected.
    #[error("integrity mismatch on commitment {commitment}: stored {stored}, recomputed {recomputed}")]
    IntegrityMismatch {
        commitment: CommitmentId,
        stored: ContentHash,
        recomputed: ContentHash,
    },

    #[error("electorate error: {0}")]
    Electorate(#[from] ElectorateError),

    #[error("tally error: {0}")]
    Tally(TallyError),

    #[error("tie-break error: {0}")]
    TieBreak(TieBreakError),

    #[error("ledger error: {0}")]
    Ledger(LedgerError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("lmdb error: {0}")]
    Lmdb(#[from] LmdbError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NodeError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::UnknownEvent(_) => "unknown_event",
            Self::UnknownPoll(_) => "unknown_poll",
            Self::UnknownEntry(_) => "unknown_entry",
            Self::UnknownCommitment(_) => "unknown_commitment",
            Self::InvalidRequest(_) => "invalid_request",
            Self::ResultsNotPublic(_) => "results_not_public",
            Self::TransitionDenied(_) => "status_transition_denied",
            Self::Conflict { .. } => "conflict",
            Self::InvalidPoll(_) => "invalid_poll",
            Self::IntegrityMismatch { .. } => "integrity_mismatch",
            Self::Electorate(ElectorateError::InvalidEmail(_)) => "invalid_email",
            Self::Electorate(ElectorateError::EntryNotInPoll { .. }) => "entry_not_in_poll",
            Self::Electorate(ElectorateError::DuplicateJudge { .. }) => "duplicate_judge",
            Self::TieBreak(TieBreakError::NotTied { .. }) => "not_tied",
            Self::TieBreak(TieBreakError::ConflictingTieBreaker { .. }) => "conflicting_tie_breaker",
            Self::TieBreak(TieBreakError::TooFewEntries | TieBreakError::DuplicateEntry(_)) => {
                "invalid_tie_breaker"
            }
            Self::TieBreak(TieBreakError::EntryNotInPoll { .. }) => "entry_not_in_poll",
            Self::TieBreak(TieBreakError::InvalidPoll(_)) => "invalid_poll",
            Self::Ledger(LedgerError::AlreadyAnchored(_)) => "already_anchored",
            Self::Store(StoreError::Duplicate(_)) => "duplicate",
            Self::Store(StoreError::NotFound(_)) => "not_found",
            _ => "internal",
        }
    }

    /// Caused by caller input rather than by the node or its storage.
    pub fn is_client_error(&self) -> bool {
        !matches!(self.code(), "internal" | "config" | "integrity_mismatch" | "conflict")
    }

    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::IntegrityMismatch { .. })
    }
}

impl From<LifecycleError> for NodeError {
    fn from(e: LifecycleError) -> Self {
        match e {
            LifecycleError::Denied(denied) => Self::TransitionDenied(denied),
            LifecycleError::Conflict { event, expected } => Self::Conflict { event, expected },
            LifecycleError::Store(e) => Self::Store(e),
        }
    }
}

impl From<TallyError> for NodeError {
    fn from(e: TallyError) -> Self {
        match e {
            TallyError::UnknownPoll(id) => Self::UnknownPoll(id),
            TallyError::Electorate(e) => Self::Electorate(e),
            TallyError::Store(e) => Self::Store(e),
        }
    }
}

impl From<TieBreakError> for NodeError {
    fn from(e: TieBreakError) -> Self {
        match e {
            TieBreakError::UnknownPoll(id) => Self::UnknownPoll(id),
            TieBreakError::Store(e) => Self::Store(e),
            TieBreakError::Crypto(e) => Self::Crypto(e),
            other => Self::TieBreak(other),
        }
    }
}

impl From<LedgerError> for NodeError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::IntegrityMismatch {
                commitment,
                stored,
                recomputed,
            } => Self::IntegrityMismatch {
                commitment,
                stored,
                recomputed,
            },
            LedgerError::UnknownCommitment(id) => Self::UnknownCommitment(id),
            LedgerError::Store(e) => Self::Store(e),
            other => Self::Ledger(other),
        }
    }
}
