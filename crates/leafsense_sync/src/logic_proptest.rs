#[cfg(test)]
mod tests {
    use crate::logic::{should_provision, BookingChange, SyncOutcome};
    use crate::mock::{MockCalendar, MockStore, RecordingReporter};
    use crate::synchronizer::BookingSynchronizer;
    use chrono::{TimeZone, Utc};
    use leafsense_common::models::{Booking, BookingStatus};
    use leafsense_config::GcalConfig;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn status_strategy() -> impl Strategy<Value = Option<BookingStatus>> {
        prop_oneof![
            Just(None),
            Just(Some(BookingStatus::Pending)),
            Just(Some(BookingStatus::Confirmed)),
            Just(Some(BookingStatus::Approved)),
            Just(Some(BookingStatus::Rejected)),
            Just(Some(BookingStatus::Cancelled)),
            Just(Some(BookingStatus::Unknown)),
        ]
    }

    fn booking(status: Option<BookingStatus>) -> Booking {
        Booking {
            status,
            date: Some(Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap().into()),
            user_email: Some("farmer@example.com".to_string()),
            topic: Some("Leaf rust".to_string()),
            ..Default::default()
        }
    }

    proptest! {
        #[test]
        fn test_guard_matches_pending_to_confirmed(
            before in status_strategy(),
            after in status_strategy(),
        ) {
            let expected = before == Some(BookingStatus::Pending)
                && after == Some(BookingStatus::Confirmed);
            prop_assert_eq!(should_provision(&booking(before), &booking(after)), expected);
        }

        // No calendar call and no write unless the guard holds.
        #[test]
        fn test_no_side_effects_outside_the_guard(
            before in status_strategy(),
            after in status_strategy(),
        ) {
            let change = BookingChange { before: booking(before), after: booking(after) };
            let qualifies = should_provision(&change.before, &change.after);

            let calendar = Arc::new(MockCalendar::returning("https://meet.example/u", "evt_e"));
            let store = Arc::new(MockStore::with_bookings(vec![("b1", booking(after))]));
            let sync = BookingSynchronizer::new(
                calendar.clone(),
                store.clone(),
                Arc::new(RecordingReporter::default()),
                GcalConfig::default(),
            );

            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let outcome = runtime.block_on(sync.on_booking_updated("b1", change));

            if qualifies {
                prop_assert!(
                    matches!(outcome, SyncOutcome::Provisioned { .. }),
                    "unexpected outcome: {:?}",
                    outcome
                );
                prop_assert_eq!(calendar.calls(), 1);
                prop_assert_eq!(store.writes().len(), 1);
            } else {
                prop_assert_eq!(outcome, SyncOutcome::Skipped);
                prop_assert_eq!(calendar.calls(), 0);
                prop_assert!(store.writes().is_empty());
            }
        }
    }
}
