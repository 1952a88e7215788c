//! Parent events (hackathons / campaigns) and their lifecycle status.

use crate::error::TypesError;
use crate::id::EventId;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an event. Ordered: `Draft < Live < Closed < Finalized`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Draft,
    Live,
    Closed,
    Finalized,
}

impl EventStatus {
    pub const ALL: [EventStatus; 4] = [Self::Draft, Self::Live, Self::Closed, Self::Finalized];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Live => "live",
            Self::Closed => "closed",
            Self::Finalized => "finalized",
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }

    /// Whether entering this status locks project submissions.
    pub fn locks_submissions(&self) -> bool {
        matches!(self, Self::Closed | Self::Finalized)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "live" => Ok(Self::Live),
            "closed" => Ok(Self::Closed),
            "finalized" => Ok(Self::Finalized),
            other => Err(TypesError::UnknownVariant {
                kind: "event status",
                value: other.to_string(),
            }),
        }
    }
}

/// A parent event. Never deleted, only superseded in status.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub status: EventStatus,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub voting_closes_at: Option<Timestamp>,
    pub submission_deadline: Option<Timestamp>,
    /// Set exactly once each time the event enters `closed`/`finalized`.
    pub submissions_locked: bool,
    /// Judges in `voters_first` polls may vote from this moment on.
    pub voter_phase_completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Event {
    pub fn new(id: EventId, name: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id,
            name: name.into(),
            status: EventStatus::Draft,
            start_date: None,
            end_date: None,
            voting_closes_at: None,
            submission_deadline: None,
            submissions_locked: false,
            voter_phase_completed_at: None,
            created_at,
        }
    }

    /// Live and not locked: the only state in which ballots are written.
    pub fn accepts_ballots(&self) -> bool {
        self.status == EventStatus::Live && !self.submissions_locked
    }

    /// Whether the voter phase has been marked complete as of `now`.
    pub fn voter_phase_complete(&self, now: Timestamp) -> bool {
        self.voter_phase_completed_at
            .is_some_and(|at| at.has_passed(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_order_is_lifecycle_order() {
        assert!(EventStatus::Draft < EventStatus::Live);
        assert!(EventStatus::Live < EventStatus::Closed);
        assert!(EventStatus::Closed < EventStatus::Finalized);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("LIVE".parse::<EventStatus>().unwrap(), EventStatus::Live);
        assert!("archived".parse::<EventStatus>().is_err());
    }

    #[test]
    fn only_unlocked_live_events_accept_ballots() {
        let mut event = Event::new(EventId::from("e"), "hack", Timestamp::new(0));
        assert!(!event.accepts_ballots());
        event.status = EventStatus::Live;
        assert!(event.accepts_ballots());
        event.submissions_locked = true;
        assert!(!event.accepts_ballots());
    }

    #[test]
    fn voter_phase_can_be_scheduled() {
        let mut event = Event::new(EventId::from("e"), "hack", Timestamp::new(0));
        assert!(!event.voter_phase_complete(Timestamp::new(50)));
        event.voter_phase_completed_at = Some(Timestamp::new(100));
        assert!(!event.voter_phase_complete(Timestamp::new(99)));
        assert!(event.voter_phase_complete(Timestamp::new(100)));
    }
}
