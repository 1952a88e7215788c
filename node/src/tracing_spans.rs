//! Span constructors for the node's request-scoped operations, so every
//! crate logs under the same span names and fields.

use tracing::{info_span, Span};

pub fn submit_span(poll: &str) -> Span {
    info_span!("submit_ballot", poll = %poll)
}

pub fn tally_span(poll: &str) -> Span {
    info_span!("compute_tally", poll = %poll)
}

/// `event` is `"*"` for a full sweep.
pub fn reconcile_span(event: &str) -> Span {
    info_span!("reconcile", event = %event)
}

pub fn verify_span(event: &str) -> Span {
    info_span!("verify", event = %event)
}

/// Span covering one HTTP API action.
pub fn rpc_span(action: &str) -> Span {
    info_span!("rpc", action = %action)
}
