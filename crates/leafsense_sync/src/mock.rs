//! Test doubles for the calendar, the record store and the reporter.

use leafsense_common::models::{Booking, MeetingLink};
use leafsense_common::services::{
    BookingStore, BoxFuture, BoxedError, CalendarService, CreatedMeeting, MeetingRequest,
    RecordOutcome,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::reporter::{FailureReporter, SyncFailure};

#[derive(Debug)]
pub struct MockError(pub String);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MockError {}

/// Calendar returning a fixed response and remembering every request.
pub struct MockCalendar {
    response: Result<CreatedMeeting, String>,
    pub requests: Mutex<Vec<(String, MeetingRequest)>>,
    delay: Option<Duration>,
}

impl MockCalendar {
    pub fn returning(meet_link: &str, event_id: &str) -> Self {
        Self::with_response(Ok(CreatedMeeting {
            event_id: Some(event_id.to_string()),
            meet_link: Some(meet_link.to_string()),
            status: "confirmed".to_string(),
        }))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_response(Err(message.to_string()))
    }

    pub fn with_response(response: Result<CreatedMeeting, String>) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Every insert takes `delay` before answering.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl CalendarService for MockCalendar {
    type Error = MockError;

    fn create_meeting(
        &self,
        calendar_id: &str,
        request: MeetingRequest,
    ) -> BoxFuture<'_, CreatedMeeting, Self::Error> {
        self.requests
            .lock()
            .unwrap()
            .push((calendar_id.to_string(), request));
        let response = self.response.clone().map_err(MockError);
        let delay = self.delay;
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            response
        })
    }
}

/// Store keeping bookings in memory and recording every write.
#[derive(Default)]
pub struct MockStore {
    pub bookings: Mutex<HashMap<String, Booking>>,
    pub writes: Mutex<Vec<(String, MeetingLink)>>,
    pub fail_writes: bool,
    pub fail_queries: bool,
}

impl MockStore {
    pub fn with_bookings(bookings: Vec<(&str, Booking)>) -> Self {
        let store = Self::default();
        {
            let mut map = store.bookings.lock().unwrap();
            for (id, mut booking) in bookings {
                booking.id = Some(id.to_string());
                map.insert(id.to_string(), booking);
            }
        }
        store
    }

    pub fn writes(&self) -> Vec<(String, MeetingLink)> {
        self.writes.lock().unwrap().clone()
    }
}

impl BookingStore for MockStore {
    type Error = MockError;

    fn fetch_booking(&self, booking_id: &str) -> BoxFuture<'_, Option<Booking>, Self::Error> {
        let booking = self.bookings.lock().unwrap().get(booking_id).cloned();
        Box::pin(async move { Ok(booking) })
    }

    /// Refuses the write when the stored booking is already linked, the
    /// way a revision precondition would.
    fn record_meeting(
        &self,
        booking_id: &str,
        link: MeetingLink,
        _expected_revision: Option<String>,
    ) -> BoxFuture<'_, RecordOutcome, Self::Error> {
        let booking_id = booking_id.to_string();
        Box::pin(async move {
            if self.fail_writes {
                return Err(MockError("write rejected".to_string()));
            }
            let mut bookings = self.bookings.lock().unwrap();
            let booking = bookings
                .get_mut(&booking_id)
                .ok_or_else(|| MockError(format!("{} not found", booking_id)))?;
            if booking.is_linked() {
                return Ok(RecordOutcome::Conflict);
            }
            booking.meet_link = Some(link.meet_link.clone());
            booking.calendar_event_id = Some(link.calendar_event_id.clone());
            self.writes.lock().unwrap().push((booking_id, link));
            Ok(RecordOutcome::Written)
        })
    }

    fn list_unlinked_confirmed(&self) -> BoxFuture<'_, Vec<Booking>, Self::Error> {
        Box::pin(async move {
            if self.fail_queries {
                return Err(MockError("query rejected".to_string()));
            }
            let mut bookings: Vec<Booking> = self
                .bookings
                .lock()
                .unwrap()
                .values()
                .filter(|b| {
                    b.has_status(leafsense_common::models::BookingStatus::Confirmed)
                        && !b.is_linked()
                })
                .cloned()
                .collect();
            bookings.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(bookings)
        })
    }
}

/// Reporter collecting failures.
#[derive(Default)]
pub struct RecordingReporter {
    pub failures: Mutex<Vec<SyncFailure>>,
    reported: AtomicUsize,
}

impl RecordingReporter {
    pub fn count(&self) -> usize {
        self.reported.load(Ordering::SeqCst)
    }
}

impl FailureReporter for RecordingReporter {
    fn report<'a>(&'a self, failure: &'a SyncFailure) -> BoxFuture<'a, (), BoxedError> {
        self.failures.lock().unwrap().push(failure.clone());
        self.reported.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }
}
