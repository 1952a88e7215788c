//! Router assembly and the HTTP server.

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::error::RpcError;
use crate::handlers::{self, AppState};

/// Every API route, nested under `/api/v1`. `/metrics` is mounted at the
/// root when the node has metrics enabled.
pub fn router(node: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        // Events
        .route("/events", post(handlers::create_event).get(handlers::list_events))
        .route("/events/:id", get(handlers::get_event))
        .route("/events/:id/status", post(handlers::transition_status))
        .route("/events/:id/reconcile", post(handlers::reconcile_event))
        .route("/events/:id/voter-phase", post(handlers::complete_voter_phase))
        .route("/events/:id/polls", get(handlers::event_polls))
        .route("/events/:id/commitments", get(handlers::event_commitments))
        .route("/events/:id/commitments/results", post(handlers::commit_results))
        .route("/events/:id/verify", get(handlers::verify_event))
        .route("/events/:id/participation", get(handlers::event_participation))
        .route("/reconcile", post(handlers::reconcile_all))
        // Polls and entries
        .route("/polls", post(handlers::create_poll))
        .route("/polls/:id", get(handlers::get_poll))
        .route("/polls/:id/entries", post(handlers::add_entry).get(handlers::poll_entries))
        .route("/entries/:id/duplicate", post(handlers::duplicate_entry))
        // Electorate
        .route(
            "/polls/:id/voters",
            post(handlers::issue_voter_tokens).get(handlers::voter_tokens),
        )
        .route("/polls/:id/judges", post(handlers::add_judge).get(handlers::judges))
        .route("/polls/:id/members/revoke", post(handlers::revoke_member))
        .route("/polls/:id/members/delivery", post(handlers::update_delivery_status))
        .route("/polls/:id/turnout", get(handlers::turnout))
        // Ballots and results
        .route("/polls/:id/ballots", post(handlers::submit_ballot))
        .route("/polls/:id/ballots/:role/:member", get(handlers::get_ballot))
        .route("/polls/:id/tally", get(handlers::tally))
        .route("/polls/:id/results", get(handlers::public_results))
        .route("/polls/:id/ties", get(handlers::ties))
        .route("/polls/:id/tie-breakers", post(handlers::create_tie_breaker))
        // Integrity
        .route("/commitments/:id", get(handlers::get_commitment))
        .route("/commitments/:id/verify", get(handlers::verify_commitment))
        .route("/commitments/:id/anchor", post(handlers::anchor))
        // Participation
        .route("/participation/:identity", get(handlers::identity_participation));

    let mut app = Router::new().nest("/api/v1", api);
    if node.config().enable_metrics {
        app = app.route("/metrics", get(handlers::metrics));
    }
    app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
    .with_state(node)
}

pub struct RpcServer {
    node: AppState,
    port: u16,
}

impl RpcServer {
    pub fn new(node: AppState, port: u16) -> Self {
        Self { node, port }
    }

    /// Bind and serve until `shutdown` fires.
    pub async fn serve(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), RpcError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        info!(%addr, "rpc server listening");
        axum::serve(listener, router(self.node))
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!("rpc server stopped");
        Ok(())
    }
}
