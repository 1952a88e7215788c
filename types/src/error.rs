//! Errors raised while constructing or parsing core records.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypesError {
    #[error("invalid content hash: {0}")]
    InvalidHash(String),

    #[error("invalid percentage {0}: must be within 0..=100")]
    InvalidPercent(f64),

    #[error("invalid weight {0}: must be finite and >= 0")]
    InvalidWeight(f64),

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}
