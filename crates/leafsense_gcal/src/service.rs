// --- File: crates/leafsense_gcal/src/service.rs ---
//! Google Calendar service implementation.
//!
//! This module provides an implementation of the CalendarService trait for Google Calendar.

use google_calendar3::api::Scope;
use leafsense_common::services::{BoxFuture, CalendarService, CreatedMeeting, MeetingRequest};
use leafsense_common::{external_service_error, LeafsenseError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::HubType;
use crate::logic::{from_gcal_event, to_gcal_event};

/// Errors that can occur when interacting with Google Calendar.
#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("Invalid meeting request: {0}")]
    InvalidRequest(String),
}

impl From<GcalServiceError> for LeafsenseError {
    fn from(err: GcalServiceError) -> Self {
        match err {
            GcalServiceError::InvalidRequest(message) => LeafsenseError::ValidationError(message),
            other => external_service_error("Google Calendar", other),
        }
    }
}

/// Google Calendar service implementation.
pub struct GoogleCalendarService {
    calendar_hub: Arc<HubType>,
}

impl GoogleCalendarService {
    /// Create a new Google Calendar service.
    pub fn new(calendar_hub: Arc<HubType>) -> Self {
        Self { calendar_hub }
    }
}

impl CalendarService for GoogleCalendarService {
    type Error = GcalServiceError;

    /// Inserts an event with a Meet conference into `calendar_id`.
    ///
    /// The event is sent with `conferenceDataVersion=1`, otherwise Google
    /// silently drops the conference create request. The request id inside
    /// `request` is what Google uses to deduplicate conference creation.
    ///
    /// # Errors
    ///
    /// Returns a `GcalServiceError` if:
    /// * the end time is not after the start time (InvalidRequest)
    /// * the API call to Google Calendar fails (ApiError)
    fn create_meeting(
        &self,
        calendar_id: &str,
        request: MeetingRequest,
    ) -> BoxFuture<'_, CreatedMeeting, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            if request.end_time <= request.start_time {
                return Err(GcalServiceError::InvalidRequest(
                    "End time must be after start time".to_string(),
                ));
            }

            debug!(
                "Inserting meeting '{}' into calendar {} (request id {})",
                request.summary, calendar_id, request.conference_request_id
            );
            let new_event = to_gcal_event(request);

            let (_response, created_event) = calendar_hub
                .events()
                .insert(new_event, &calendar_id)
                .conference_data_version(1)
                .add_scope(Scope::Full)
                .doit()
                .await?;

            let created = from_gcal_event(created_event);
            info!(
                "Calendar event created: id={:?} status={}",
                created.event_id, created.status
            );
            Ok(created)
        })
    }
}
