// File: crates/leafsense_sync/src/logic.rs
//! Transition guard, event payload and the synchronizer's result types.

use chrono::Duration;
use leafsense_common::models::{Booking, BookingStatus};
use leafsense_common::services::MeetingRequest;
use leafsense_common::{external_service_error, LeafsenseError};
use leafsense_config::GcalConfig;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use thiserror::Error;

/// Booking state right before and right after one update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingChange {
    #[serde(default)]
    pub before: Booking,
    #[serde(default)]
    pub after: Booking,
}

/// What a single synchronizer invocation ended with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The update was not a pending to confirmed transition.
    Skipped,
    /// The booking already carries a meeting link.
    AlreadyLinked,
    /// Another invocation is provisioning this booking right now.
    InProgress,
    Provisioned {
        meet_link: String,
        calendar_event_id: String,
    },
    /// Provisioning failed; the failure has been reported.
    Failed { reason: String },
}

/// Summary of one reconciliation sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReconcileReport {
    /// Confirmed bookings without a meeting link found by the sweep.
    pub examined: usize,
    pub provisioned: usize,
    pub failed: usize,
    /// Bookings missing `date` or `userEmail`; not reported again.
    pub invalid: usize,
}

/// Errors raised while provisioning a meeting. They never leave the
/// synchronizer; they end up in [`SyncOutcome::Failed`].
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Booking {booking_id} is missing `{field}`")]
    InvalidBooking {
        booking_id: String,
        field: &'static str,
    },

    #[error("Booking {0} does not exist")]
    BookingNotFound(String),

    #[error("Calendar error: {0}")]
    Calendar(#[source] Box<dyn StdError + Send + Sync>),

    #[error("Calendar event {0} has no conference entry point")]
    MissingMeetLink(String),

    #[error("Calendar returned an event without id")]
    MissingEventId,

    #[error("Record store error: {0}")]
    Store(#[source] Box<dyn StdError + Send + Sync>),
}

impl From<SyncError> for LeafsenseError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::InvalidBooking { .. } => LeafsenseError::ValidationError(err.to_string()),
            SyncError::BookingNotFound(id) => LeafsenseError::NotFoundError(id),
            SyncError::Store(source) => external_service_error("Firestore", source),
            other => external_service_error("Google Calendar", other),
        }
    }
}

/// Only the `pending -> confirmed` transition provisions a meeting.
pub fn should_provision(before: &Booking, after: &Booking) -> bool {
    before.has_status(BookingStatus::Pending) && after.has_status(BookingStatus::Confirmed)
}

/// Builds the calendar payload for a booking.
///
/// The session starts at `date` and lasts `session_minutes`. The booking id
/// doubles as the conference request id so a redelivered request cannot
/// create a second conference.
pub fn build_meeting_request(
    booking_id: &str,
    booking: &Booking,
    gcal: &GcalConfig,
) -> Result<MeetingRequest, SyncError> {
    let missing = |field| SyncError::InvalidBooking {
        booking_id: booking_id.to_string(),
        field,
    };

    let start_time = booking
        .date
        .as_ref()
        .and_then(|date| date.to_utc())
        .ok_or_else(|| missing("date"))?;
    let attendee_email = booking
        .user_email
        .as_deref()
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| missing("userEmail"))?
        .to_string();

    let summary = match booking.topic.as_deref() {
        Some(topic) if !topic.trim().is_empty() => {
            format!("{}: {}", gcal.summary_prefix(), topic)
        }
        _ => gcal.summary_prefix().to_string(),
    };
    let description = booking
        .expert_name
        .as_deref()
        .map(|expert| format!("One-on-one session with {}", expert));

    Ok(MeetingRequest {
        summary,
        description,
        start_time,
        end_time: start_time + Duration::minutes(gcal.session_minutes()),
        time_zone: gcal.time_zone().to_string(),
        attendee_email,
        conference_request_id: booking_id.to_string(),
    })
}
