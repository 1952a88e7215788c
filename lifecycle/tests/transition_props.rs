use proptest::prelude::*;

use verdict_lifecycle::{check_transition, plan_reconcile, TransitionGuard};
use verdict_types::{Event, EventId, EventStatus, Timestamp};

fn status() -> impl Strategy<Value = EventStatus> {
    (0usize..4).prop_map(|i| EventStatus::ALL[i])
}

proptest! {
    /// Nothing leaves `finalized`, whatever the clock says.
    #[test]
    fn finalized_always_rejected(
        requested in status(),
        now in 0u64..1_000,
        closes in proptest::option::of(0u64..1_000),
        end in proptest::option::of(0u64..1_000),
    ) {
        let denied = check_transition(
            EventStatus::Finalized,
            requested,
            Timestamp::new(now),
            closes.map(Timestamp::new),
            end.map(Timestamp::new),
        ).unwrap_err();
        prop_assert_eq!(denied.guard, TransitionGuard::Finalized);
    }

    /// With no deadlines set, every move out of a non-terminal status is honored.
    #[test]
    fn no_deadlines_means_request_honored(current in 0usize..3, requested in status(), now in 0u64..1_000) {
        let current = EventStatus::ALL[current];
        prop_assert!(check_transition(current, requested, Timestamp::new(now), None, None).is_ok());
    }

    /// Forced transitions only ever move forward.
    #[test]
    fn reconcile_is_monotonic(
        current in status(),
        now in 0u64..1_000,
        closes in proptest::option::of(0u64..1_000),
        end in proptest::option::of(0u64..1_000),
    ) {
        let mut event = Event::new(EventId::from("e"), "e", Timestamp::new(0));
        event.status = current;
        event.voting_closes_at = closes.map(Timestamp::new);
        event.end_date = end.map(Timestamp::new);
        if let Some(plan) = plan_reconcile(&event, Timestamp::new(now)) {
            prop_assert!(plan.to > plan.from);
            prop_assert_eq!(plan.from, current);
        }
    }
}
