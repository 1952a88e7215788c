use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("payload is not representable as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("entropy source failed: {0}")]
    Entropy(String),
}
