//! RPC error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use verdict_node::NodeError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("server error: {0}")]
    Server(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl RpcError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Node(e) => e.code(),
            Self::InvalidRequest(_) => "invalid_request",
            Self::NotFound(_) => "not_found",
            Self::Server(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code() {
            "unknown_event" | "unknown_poll" | "unknown_entry" | "unknown_commitment" | "not_found" => {
                StatusCode::NOT_FOUND
            }
            "results_not_public" => StatusCode::FORBIDDEN,
            "status_transition_denied"
            | "conflict"
            | "conflicting_tie_breaker"
            | "already_anchored"
            | "duplicate"
            | "integrity_mismatch" => StatusCode::CONFLICT,
            "internal" | "config" => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type RpcResult<T> = Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_types::PollId;

    #[test]
    fn domain_errors_map_to_statuses() {
        let missing = RpcError::from(NodeError::UnknownPoll(PollId::from("p")));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.code(), "unknown_poll");

        let hidden = RpcError::from(NodeError::ResultsNotPublic(PollId::from("p")));
        assert_eq!(hidden.status(), StatusCode::FORBIDDEN);

        let bad = RpcError::InvalidRequest("cutoff must be positive".into());
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let io = RpcError::from(NodeError::Io(std::io::Error::other("disk")));
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
