// --- File: crates/leafsense_gcal/src/logic.rs ---
//! Conversions between the service level meeting types and the Calendar v3
//! `Event` resource.

use google_calendar3::api::{
    ConferenceData, ConferenceSolutionKey, CreateConferenceRequest, Event, EventAttendee,
    EventDateTime,
};
use leafsense_common::services::{CreatedMeeting, MeetingRequest};

/// Conference solution requested for every meeting.
pub const MEET_SOLUTION: &str = "hangoutsMeet";

/// Builds the event resource for `events.insert`.
pub fn to_gcal_event(request: MeetingRequest) -> Event {
    Event {
        summary: Some(request.summary),
        description: request.description,
        start: Some(EventDateTime {
            date_time: Some(request.start_time),
            time_zone: Some(request.time_zone.clone()),
            ..Default::default()
        }),
        end: Some(EventDateTime {
            date_time: Some(request.end_time),
            time_zone: Some(request.time_zone),
            ..Default::default()
        }),
        attendees: Some(vec![EventAttendee {
            email: Some(request.attendee_email),
            ..Default::default()
        }]),
        conference_data: Some(ConferenceData {
            create_request: Some(CreateConferenceRequest {
                request_id: Some(request.conference_request_id),
                conference_solution_key: Some(ConferenceSolutionKey {
                    type_: Some(MEET_SOLUTION.to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Reads the event id and the first conference entry point back out of a
/// created event.
pub fn from_gcal_event(event: Event) -> CreatedMeeting {
    let meet_link = event
        .conference_data
        .and_then(|data| data.entry_points)
        .and_then(|points| points.into_iter().next())
        .and_then(|point| point.uri);

    CreatedMeeting {
        event_id: event.id,
        meet_link,
        status: event.status.unwrap_or_else(|| "confirmed".to_string()),
    }
}
