//! Event status transitions, both manual and date-driven.

use tracing::{error, info, warn};
use verdict_lifecycle::{ReconcileReport, TransitionApplied};
use verdict_store::EventStore;
use verdict_types::{Event, EventId, EventStatus, Notification, Timestamp};

use crate::error::NodeError;
use crate::node::VerdictNode;
use crate::tracing_spans::reconcile_span;

impl VerdictNode {
    /// Apply an organizer-requested status change.
    pub fn transition_status(&self, event: &EventId, requested: EventStatus) -> Result<TransitionApplied, NodeError> {
        self.load_event(event)?;
        let applied = verdict_lifecycle::apply_transition(&*self.store, event, requested, self.now())?;
        if applied.locked_submissions {
            self.notify(Notification::SubmissionsLocked {
                event: event.clone(),
                status: applied.event.status,
            });
        }
        if applied.finalized() {
            self.on_finalized(event);
        }
        Ok(applied)
    }

    /// Force every transition whose date has passed, for one event or all.
    pub fn reconcile_statuses(&self, only: Option<&EventId>) -> Result<ReconcileReport, NodeError> {
        let _span = reconcile_span(only.map_or("*", |id| id.as_str())).entered();
        if let Some(id) = only {
            self.load_event(id)?;
        }
        let report = verdict_lifecycle::reconcile_statuses(&*self.store, only, self.now())?;
        for done in &report.updated {
            self.metrics.forced_transitions.inc();
            if done.locked_submissions {
                self.notify(Notification::SubmissionsLocked {
                    event: done.event.id.clone(),
                    status: done.to,
                });
            }
            if done.to == EventStatus::Finalized {
                self.on_finalized(&done.event.id);
            }
        }
        if !report.failures.is_empty() {
            warn!(failed = report.failures.len(), "reconcile finished with failures");
        }
        Ok(report)
    }

    /// Open the judge phase of `voters_first` polls, now or at `at`.
    pub fn complete_voter_phase(&self, event: &EventId, at: Option<Timestamp>) -> Result<Event, NodeError> {
        let current = self.load_event(event)?;
        if current.status == EventStatus::Finalized {
            return Err(NodeError::InvalidRequest(format!("event {} is finalized", event)));
        }
        let at = at.unwrap_or_else(|| self.now());
        let mut next = current.clone();
        next.voter_phase_completed_at = Some(at);
        if !self.store.update_event_if_status(&next, current.status)? {
            return Err(NodeError::Conflict {
                event: event.clone(),
                expected: current.status,
            });
        }
        info!(event = %event, at = %at, "voter phase completed");
        Ok(next)
    }

    fn on_finalized(&self, event: &EventId) {
        self.notify(Notification::EventFinalized { event: event.clone() });
        if !self.config.commit_results_on_finalize {
            return;
        }
        if let Err(e) = self.commit_results(event) {
            error!(event = %event, error = %e, "failed to commit final results");
        }
    }
}
