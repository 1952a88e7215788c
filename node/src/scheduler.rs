//! Periodic status reconciliation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::node::VerdictNode;

/// Run [`VerdictNode::reconcile_statuses`] every `interval` until `shutdown`
/// fires. The first sweep runs immediately.
pub fn spawn_reconcile_loop(
    node: Arc<VerdictNode>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(interval_secs = interval.as_secs(), "reconcile loop started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let node = Arc::clone(&node);
                    match tokio::task::spawn_blocking(move || node.reconcile_statuses(None)).await {
                        Ok(Ok(report)) if !report.updated.is_empty() => {
                            info!(updated = report.updated.len(), "reconcile sweep applied transitions");
                        }
                        Ok(Ok(_)) => debug!("reconcile sweep: nothing due"),
                        Ok(Err(e)) => error!(error = %e, "reconcile sweep failed"),
                        Err(e) => error!(error = %e, "reconcile task panicked"),
                    }
                }
                _ = shutdown.recv() => {
                    info!("reconcile loop stopping");
                    break;
                }
            }
        }
    })
}
