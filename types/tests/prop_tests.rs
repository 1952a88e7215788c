use proptest::prelude::*;

use verdict_types::{ContentHash, EventStatus, Timestamp};

proptest! {
    /// ContentHash hex form parses back to the same digest.
    #[test]
    fn content_hash_hex_parse(bytes in prop::array::uniform32(0u8..)) {
        let hash = ContentHash::new(bytes);
        let parsed: ContentHash = hash.to_hex().parse().unwrap();
        prop_assert_eq!(parsed, hash);
    }

    /// ContentHash::is_zero is true only for all-zero bytes.
    #[test]
    fn content_hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = ContentHash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// has_passed agrees with manual comparison.
    #[test]
    fn timestamp_has_passed(deadline in 0u64..1_000_000, now in 0u64..1_000_000) {
        prop_assert_eq!(Timestamp::new(deadline).has_passed(Timestamp::new(now)), now >= deadline);
    }

    /// Event statuses survive the bincode encoding used by the LMDB backend.
    #[test]
    fn event_status_bincode(idx in 0usize..4) {
        let status = EventStatus::ALL[idx];
        let encoded = bincode::serialize(&status).unwrap();
        let decoded: EventStatus = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, status);
    }
}
