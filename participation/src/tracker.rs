use tracing::{trace, warn};
use verdict_store::{ParticipationStore, StoreError};
use verdict_types::{
    normalize_email, EventId, Member, ParticipationAction, ParticipationRecord, Timestamp,
};

/// Append one record, logging instead of failing.
pub fn record<S: ParticipationStore + ?Sized>(store: &S, record: ParticipationRecord) {
    match store.append_participation(&record) {
        Ok(()) => trace!(
            event = %record.event_id,
            identity = %record.identity,
            action = ?record.action,
            "participation recorded"
        ),
        Err(e) => warn!(
            event = %record.event_id,
            poll = %record.poll_id,
            identity = %record.identity,
            error = %e,
            "failed to record participation"
        ),
    }
}

/// Record a newly registered member.
pub fn record_registration<S: ParticipationStore + ?Sized>(
    store: &S,
    event: &EventId,
    member: &Member,
    at: Timestamp,
) {
    record(store, entry_for(event, member, ParticipationAction::Registered, at));
}

/// Record an accepted ballot. `edited` marks a replacement of an earlier one.
pub fn record_ballot<S: ParticipationStore + ?Sized>(
    store: &S,
    event: &EventId,
    member: &Member,
    edited: bool,
    at: Timestamp,
) {
    let action = if edited {
        ParticipationAction::EditedVote
    } else {
        ParticipationAction::Voted
    };
    record(store, entry_for(event, member, action, at));
}

fn entry_for(event: &EventId, member: &Member, action: ParticipationAction, at: Timestamp) -> ParticipationRecord {
    ParticipationRecord {
        event_id: event.clone(),
        poll_id: member.poll_id().clone(),
        identity: normalize_email(member.email()),
        role: member.role(),
        action,
        at,
    }
}

pub fn for_event<S: ParticipationStore + ?Sized>(
    store: &S,
    event: &EventId,
) -> Result<Vec<ParticipationRecord>, StoreError> {
    store.participation_for_event(event)
}

/// Records of one identity; the identity is normalized like a judge email.
pub fn for_identity<S: ParticipationStore + ?Sized>(
    store: &S,
    identity: &str,
) -> Result<Vec<ParticipationRecord>, StoreError> {
    store.participation_for_identity(&normalize_email(identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_nullables::NullStore;
    use verdict_types::{DeliveryStatus, PollId, Role, VoterToken, VoterTokenId};

    struct FailingStore;

    impl ParticipationStore for FailingStore {
        fn append_participation(&self, _: &ParticipationRecord) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk full".into()))
        }
        fn participation_for_event(&self, _: &EventId) -> Result<Vec<ParticipationRecord>, StoreError> {
            Ok(Vec::new())
        }
        fn participation_for_identity(&self, _: &str) -> Result<Vec<ParticipationRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn member() -> Member {
        Member::Voter(VoterToken {
            id: VoterTokenId::from("t"),
            poll_id: PollId::from("p"),
            email: " Ada@Example.org".into(),
            assigned_entry: None,
            used: false,
            revoked: false,
            delivery_status: DeliveryStatus::Pending,
            created_at: Timestamp::new(0),
        })
    }

    #[test]
    fn records_are_normalized_and_ordered() {
        let store = NullStore::new();
        let event = EventId::from("e");
        record_registration(&store, &event, &member(), Timestamp::new(1));
        record_ballot(&store, &event, &member(), false, Timestamp::new(2));
        record_ballot(&store, &event, &member(), true, Timestamp::new(3));

        let rows = for_identity(&store, "ADA@example.org").unwrap();
        let actions: Vec<_> = rows.iter().map(|r| r.action).collect();
        assert_eq!(
            actions,
            vec![
                ParticipationAction::Registered,
                ParticipationAction::Voted,
                ParticipationAction::EditedVote
            ]
        );
        assert!(rows.iter().all(|r| r.identity == "ada@example.org" && r.role == Role::Voter));
        assert_eq!(for_event(&store, &event).unwrap().len(), 3);
    }

    #[test]
    fn write_failures_are_swallowed() {
        record_ballot(&FailingStore, &EventId::from("e"), &member(), false, Timestamp::new(0));
    }
}
