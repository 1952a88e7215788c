//! Nullable notifier: records every notification for assertions.

use std::sync::Mutex;
use verdict_types::{Notification, Notifier};

#[derive(Debug, Default)]
pub struct NullNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl NullNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything notified so far, in order.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// How many recorded notifications satisfy `pred`.
    pub fn count(&self, pred: impl Fn(&Notification) -> bool) -> usize {
        self.sent().iter().filter(|n| pred(n)).count()
    }

    pub fn clear(&self) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.clear();
        }
    }
}

impl Notifier for NullNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_types::EventId;

    #[test]
    fn records_in_order() {
        let n = NullNotifier::new();
        n.notify(Notification::EventFinalized {
            event: EventId::from("a"),
        });
        n.notify(Notification::EventFinalized {
            event: EventId::from("b"),
        });
        assert_eq!(n.sent().len(), 2);
        assert_eq!(
            n.count(|x| matches!(x, Notification::EventFinalized { event } if event.as_str() == "b")),
            1
        );
        n.clear();
        assert!(n.sent().is_empty());
    }
}
