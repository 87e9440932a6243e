#[cfg(test)]
mod tests {
    use crate::logic::{BookingChange, ReconcileReport, SyncOutcome};
    use crate::mock::{MockCalendar, MockStore, RecordingReporter};
    use crate::synchronizer::BookingSynchronizer;
    use chrono::{TimeZone, Utc};
    use leafsense_common::models::{Booking, BookingStatus, MeetingLink};
    use leafsense_common::services::CreatedMeeting;
    use leafsense_config::GcalConfig;
    use std::sync::Arc;
    use std::time::Duration;

    fn booking(status: BookingStatus) -> Booking {
        Booking {
            status: Some(status),
            date: Some(Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap().into()),
            expert_name: Some("Dr. Amol".to_string()),
            user_email: Some("farmer@example.com".to_string()),
            topic: Some("Leaf rust".to_string()),
            ..Default::default()
        }
    }

    fn confirm_change() -> BookingChange {
        BookingChange {
            before: booking(BookingStatus::Pending),
            after: booking(BookingStatus::Confirmed),
        }
    }

    struct Fixture {
        calendar: Arc<MockCalendar>,
        store: Arc<MockStore>,
        reporter: Arc<RecordingReporter>,
        sync: BookingSynchronizer<MockCalendar, MockStore>,
    }

    fn fixture(calendar: MockCalendar, store: MockStore) -> Fixture {
        let calendar = Arc::new(calendar);
        let store = Arc::new(store);
        let reporter = Arc::new(RecordingReporter::default());
        let sync = BookingSynchronizer::new(
            calendar.clone(),
            store.clone(),
            reporter.clone(),
            GcalConfig::default(),
        );
        Fixture {
            calendar,
            store,
            reporter,
            sync,
        }
    }

    #[tokio::test]
    async fn test_confirmation_writes_link_to_triggering_booking() {
        let f = fixture(
            MockCalendar::returning("https://meet.example/u", "evt_e"),
            MockStore::with_bookings(vec![
                ("b1", booking(BookingStatus::Confirmed)),
                ("b2", booking(BookingStatus::Pending)),
            ]),
        );

        let outcome = f.sync.on_booking_updated("b1", confirm_change()).await;

        assert_eq!(
            outcome,
            SyncOutcome::Provisioned {
                meet_link: "https://meet.example/u".to_string(),
                calendar_event_id: "evt_e".to_string(),
            }
        );
        assert_eq!(
            f.store.writes(),
            vec![(
                "b1".to_string(),
                MeetingLink {
                    meet_link: "https://meet.example/u".to_string(),
                    calendar_event_id: "evt_e".to_string(),
                }
            )]
        );
        let requests = f.calendar.requests.lock().unwrap();
        assert_eq!(requests[0].0, "primary");
        assert_eq!(requests[0].1.conference_request_id, "b1");
        assert_eq!(f.reporter.count(), 0);
    }

    #[tokio::test]
    async fn test_non_qualifying_update_is_a_no_op() {
        let f = fixture(
            MockCalendar::returning("https://meet.example/u", "evt_e"),
            MockStore::with_bookings(vec![("b1", booking(BookingStatus::Confirmed))]),
        );
        let change = BookingChange {
            before: booking(BookingStatus::Confirmed),
            after: booking(BookingStatus::Confirmed),
        };

        assert_eq!(
            f.sync.on_booking_updated("b1", change).await,
            SyncOutcome::Skipped
        );
        assert_eq!(f.calendar.calls(), 0);
        assert!(f.store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_calendar_rejection_is_reported_not_raised() {
        let f = fixture(
            MockCalendar::failing("quota exceeded"),
            MockStore::with_bookings(vec![("b1", booking(BookingStatus::Confirmed))]),
        );

        let outcome = f.sync.on_booking_updated("b1", confirm_change()).await;

        match outcome {
            SyncOutcome::Failed { reason } => assert!(reason.contains("quota exceeded")),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(f.store.writes().is_empty());
        assert_eq!(f.reporter.count(), 1);
        assert_eq!(f.reporter.failures.lock().unwrap()[0].booking_id, "b1");
    }

    #[tokio::test]
    async fn test_missing_conference_data_is_a_failure() {
        let f = fixture(
            MockCalendar::with_response(Ok(CreatedMeeting {
                event_id: Some("evt_e".to_string()),
                meet_link: None,
                status: "confirmed".to_string(),
            })),
            MockStore::with_bookings(vec![("b1", booking(BookingStatus::Confirmed))]),
        );

        let outcome = f.sync.on_booking_updated("b1", confirm_change()).await;

        assert!(matches!(outcome, SyncOutcome::Failed { .. }));
        assert!(f.store.writes().is_empty());
        assert_eq!(f.reporter.count(), 1);
    }

    #[tokio::test]
    async fn test_linked_snapshot_is_skipped() {
        let f = fixture(
            MockCalendar::returning("https://meet.example/u", "evt_e"),
            MockStore::with_bookings(vec![("b1", booking(BookingStatus::Confirmed))]),
        );
        let mut change = confirm_change();
        change.after.meet_link = Some("https://meet.example/old".to_string());

        assert_eq!(
            f.sync.on_booking_updated("b1", change).await,
            SyncOutcome::AlreadyLinked
        );
        assert_eq!(f.calendar.calls(), 0);
    }

    #[tokio::test]
    async fn test_redelivered_notification_does_not_create_second_event() {
        let f = fixture(
            MockCalendar::returning("https://meet.example/u", "evt_e"),
            MockStore::with_bookings(vec![("b1", booking(BookingStatus::Confirmed))]),
        );

        let first = f.sync.on_booking_updated("b1", confirm_change()).await;
        let second = f.sync.on_booking_updated("b1", confirm_change()).await;

        assert!(matches!(first, SyncOutcome::Provisioned { .. }));
        assert_eq!(second, SyncOutcome::AlreadyLinked);
        assert_eq!(f.calendar.calls(), 1);
        assert_eq!(f.store.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_deleted_booking_fails_without_calendar_call() {
        let f = fixture(
            MockCalendar::returning("https://meet.example/u", "evt_e"),
            MockStore::default(),
        );

        let outcome = f.sync.on_booking_updated("gone", confirm_change()).await;

        assert!(matches!(outcome, SyncOutcome::Failed { .. }));
        assert_eq!(f.calendar.calls(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let mut store = MockStore::with_bookings(vec![("b1", booking(BookingStatus::Confirmed))]);
        store.fail_writes = true;
        let f = fixture(MockCalendar::returning("https://meet.example/u", "evt_e"), store);

        let outcome = f.sync.on_booking_updated("b1", confirm_change()).await;

        assert!(matches!(outcome, SyncOutcome::Failed { .. }));
        assert_eq!(f.reporter.count(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_provisions_unlinked_confirmed_bookings() {
        let mut linked = booking(BookingStatus::Confirmed);
        linked.meet_link = Some("https://meet.example/old".to_string());
        let mut undated = booking(BookingStatus::Confirmed);
        undated.date = None;

        let f = fixture(
            MockCalendar::returning("https://meet.example/u", "evt_e"),
            MockStore::with_bookings(vec![
                ("a", booking(BookingStatus::Confirmed)),
                ("b", linked),
                ("c", undated),
                ("d", booking(BookingStatus::Pending)),
            ]),
        );

        let report = f.sync.reconcile().await;

        assert_eq!(
            report,
            ReconcileReport {
                examined: 2,
                provisioned: 1,
                failed: 0,
                invalid: 1,
            }
        );
        let writes = f.store.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "a");
        // the undated booking is neither sent to the calendar nor reported
        assert_eq!(f.calendar.calls(), 1);
        assert_eq!(f.reporter.count(), 0);
    }

    #[tokio::test]
    async fn test_repeated_sweeps_do_not_re_report_invalid_booking() {
        let mut undated = booking(BookingStatus::Confirmed);
        undated.user_email = None;
        let f = fixture(
            MockCalendar::returning("https://meet.example/u", "evt_e"),
            MockStore::with_bookings(vec![("c", undated)]),
        );

        for _ in 0..3 {
            assert_eq!(f.sync.reconcile().await.invalid, 1);
        }
        assert_eq!(f.reporter.count(), 0);
        assert_eq!(f.calendar.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_racing_sweep_writes_once() {
        let f = fixture(
            MockCalendar::returning("https://meet.example/u", "evt_e").slow(Duration::from_millis(50)),
            MockStore::with_bookings(vec![("b1", booking(BookingStatus::Confirmed))]),
        );

        let (outcome, report) =
            tokio::join!(f.sync.on_booking_updated("b1", confirm_change()), f.sync.reconcile());

        assert!(matches!(outcome, SyncOutcome::Provisioned { .. }));
        assert_eq!(report.examined, 1);
        assert_eq!(report.provisioned, 0);
        assert_eq!(f.calendar.calls(), 1);
        assert_eq!(f.store.writes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_notifications_provision_once() {
        let f = fixture(
            MockCalendar::returning("https://meet.example/u", "evt_e").slow(Duration::from_millis(50)),
            MockStore::with_bookings(vec![("b1", booking(BookingStatus::Confirmed))]),
        );

        let (first, second) = tokio::join!(
            f.sync.on_booking_updated("b1", confirm_change()),
            f.sync.on_booking_updated("b1", confirm_change())
        );

        assert!(matches!(first, SyncOutcome::Provisioned { .. }));
        assert_eq!(second, SyncOutcome::InProgress);
        assert_eq!(f.calendar.calls(), 1);
        assert_eq!(f.store.writes().len(), 1);
        assert_eq!(f.reporter.count(), 0);

        // the claim is released once provisioning is done
        assert_eq!(
            f.sync.on_booking_updated("b1", confirm_change()).await,
            SyncOutcome::AlreadyLinked
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_instances_keep_first_written_link() {
        let store = Arc::new(MockStore::with_bookings(vec![(
            "b1",
            booking(BookingStatus::Confirmed),
        )]));
        let reporter = Arc::new(RecordingReporter::default());
        let instance = |event_id: &str| {
            BookingSynchronizer::new(
                Arc::new(
                    MockCalendar::returning("https://meet.example/u", event_id)
                        .slow(Duration::from_millis(50)),
                ),
                store.clone(),
                reporter.clone(),
                GcalConfig::default(),
            )
        };
        let (one, two) = (instance("evt_1"), instance("evt_2"));

        let (a, b) = tokio::join!(
            one.on_booking_updated("b1", confirm_change()),
            two.on_booking_updated("b1", confirm_change())
        );

        let provisioned = [&a, &b]
            .iter()
            .filter(|o| matches!(o, SyncOutcome::Provisioned { .. }))
            .count();
        assert_eq!(provisioned, 1, "{:?} / {:?}", a, b);
        assert!(a == SyncOutcome::AlreadyLinked || b == SyncOutcome::AlreadyLinked);
        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        let stored = store.bookings.lock().unwrap()["b1"].calendar_event_id.clone();
        assert_eq!(stored, Some(writes[0].1.calendar_event_id.clone()));
        assert_eq!(reporter.count(), 0);
    }

    #[tokio::test]
    async fn test_reconcile_query_failure_is_reported() {
        let mut store = MockStore::default();
        store.fail_queries = true;
        let f = fixture(MockCalendar::returning("https://meet.example/u", "evt_e"), store);

        assert_eq!(f.sync.reconcile().await, ReconcileReport::default());
        assert_eq!(f.reporter.count(), 1);
    }
}
