//! Creation-time-derived receipt identifiers

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tillslip_core::ReceiptId;

/// Hands out millisecond timestamps, bumped by one whenever two receipts
/// are created within the same millisecond.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never issue an id at or below `id` (e.g. the newest persisted receipt).
    pub fn advance_past(&self, id: ReceiptId) {
        self.last.fetch_max(id.0, Ordering::SeqCst);
    }

    pub fn next_id(&self, now: DateTime<Utc>) -> ReceiptId {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let mut current = self.last.load(Ordering::SeqCst);
        loop {
            let candidate = millis.max(current + 1);
            match self
                .last
                .compare_exchange(current, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return ReceiptId(candidate),
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ids_follow_clock() {
        let ids = IdGenerator::new();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(ids.next_id(now), ReceiptId(now.timestamp_millis() as u64));
    }

    #[test]
    fn test_same_millisecond_is_bumped() {
        let ids = IdGenerator::new();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let a = ids.next_id(now);
        let b = ids.next_id(now);
        assert_eq!(b.0, a.0 + 1);
    }

    #[test]
    fn test_clock_going_backwards() {
        let ids = IdGenerator::new();
        let later = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2024, 1, 14, 12, 0, 0).unwrap();
        let a = ids.next_id(later);
        assert!(ids.next_id(earlier) > a);
    }

    #[test]
    fn test_advance_past_persisted() {
        let ids = IdGenerator::new();
        ids.advance_past(ReceiptId(u64::MAX / 2));
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(ids.next_id(now), ReceiptId(u64::MAX / 2 + 1));
    }
}
