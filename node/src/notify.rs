//! Notifier implementations for running nodes.

use tokio::sync::mpsc;
use tracing::{error, info, warn};
use verdict_types::{Notification, Notifier};

/// Writes every notification to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match &notification {
            Notification::IntegrityFailure {
                event,
                commitment,
                stored,
                recomputed,
            } => error!(
                event = %event,
                commitment = %commitment,
                stored = %stored,
                recomputed = %recomputed,
                "notify: integrity failure"
            ),
            Notification::SubmissionsLocked { event, status } => {
                info!(event = %event, status = %status, "notify: submissions locked")
            }
            Notification::EventFinalized { event } => info!(event = %event, "notify: event finalized"),
            Notification::TieBreakerCreated {
                parent,
                tie_breaker,
                entries,
            } => info!(
                parent = %parent,
                tie_breaker = %tie_breaker,
                entries = entries.len(),
                "notify: tie-breaker created"
            ),
        }
    }
}

/// Hands notifications to a bounded channel for an async consumer.
/// Drops (with a warning) when the channel is full or closed.
#[derive(Clone, Debug)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<Notification>,
}

impl ChannelNotifier {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if let Err(e) = self.tx.try_send(notification) {
            warn!(error = %e, "notification dropped");
        }
    }
}

/// Fans out to several notifiers in order.
pub struct FanoutNotifier {
    sinks: Vec<Box<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(sinks: Vec<Box<dyn Notifier>>) -> Self {
        Self { sinks }
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, notification: Notification) {
        for sink in &self.sinks {
            sink.notify(notification.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_types::EventId;

    fn finalized(id: &str) -> Notification {
        Notification::EventFinalized {
            event: EventId::from(id),
        }
    }

    #[tokio::test]
    async fn channel_delivers_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new(4);
        notifier.notify(finalized("a"));
        notifier.notify(finalized("b"));
        assert_eq!(rx.recv().await, Some(finalized("a")));
        assert_eq!(rx.recv().await, Some(finalized("b")));
    }

    #[tokio::test]
    async fn full_channel_drops_without_blocking() {
        let (notifier, mut rx) = ChannelNotifier::new(1);
        notifier.notify(finalized("a"));
        notifier.notify(finalized("b"));
        assert_eq!(rx.recv().await, Some(finalized("a")));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn fanout_reaches_every_sink() {
        let (first, mut rx1) = ChannelNotifier::new(2);
        let (second, mut rx2) = ChannelNotifier::new(2);
        let fanout = FanoutNotifier::new(vec![Box::new(LogNotifier), Box::new(first), Box::new(second)]);
        fanout.notify(finalized("x"));
        assert_eq!(rx1.recv().await, Some(finalized("x")));
        assert_eq!(rx2.recv().await, Some(finalized("x")));
    }
}
