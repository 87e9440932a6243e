//! Service abstractions for external services.
//!
//! The synchronizer only talks to the calendar and the record store through
//! these traits, which keeps the Google clients swappable for test doubles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::models::{Booking, MeetingLink};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// Everything the calendar needs to create a one attendee video meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRequest {
    /// The summary or title of the event.
    pub summary: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// IANA zone name stored on the event, e.g. "UTC".
    pub time_zone: String,
    pub attendee_email: String,
    /// Key used by the calendar to deduplicate conference creation.
    pub conference_request_id: String,
}

/// What the calendar returned for a created event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreatedMeeting {
    pub event_id: Option<String>,
    /// URI of the first conference entry point, if any.
    pub meet_link: Option<String>,
    pub status: String,
}

/// Result of the conditional meeting link write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Written,
    /// The booking changed after it was read; nothing was written.
    Conflict,
}

/// Calendar operations used by the booking synchronizer.
pub trait CalendarService: Send + Sync {
    /// Error type returned by calendar service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create an event with a generated conference on the given calendar.
    fn create_meeting(
        &self,
        calendar_id: &str,
        request: MeetingRequest,
    ) -> BoxFuture<'_, CreatedMeeting, Self::Error>;
}

/// Record store holding the booking documents.
pub trait BookingStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Current state of one booking, `None` when it does not exist.
    fn fetch_booking(&self, booking_id: &str) -> BoxFuture<'_, Option<Booking>, Self::Error>;

    /// Field level update of `meetLink` and `calendarEventId`. Must not
    /// touch any other field and must fail when the booking does not exist.
    ///
    /// With `expected_revision` the write only applies if the booking is
    /// still at that revision; otherwise [`RecordOutcome::Conflict`].
    fn record_meeting(
        &self,
        booking_id: &str,
        link: MeetingLink,
        expected_revision: Option<String>,
    ) -> BoxFuture<'_, RecordOutcome, Self::Error>;

    /// Confirmed bookings that still have no meeting link. Returned
    /// bookings carry their `id`.
    fn list_unlinked_confirmed(&self) -> BoxFuture<'_, Vec<Booking>, Self::Error>;
}

/// Source of OAuth2 bearer tokens for Google REST APIs.
pub trait AccessTokenProvider: Send + Sync {
    fn access_token(&self, scopes: &[&str]) -> BoxFuture<'_, String, BoxedError>;
}
