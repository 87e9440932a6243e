//! Firestore REST document encoding.
//!
//! Firestore wraps every field in a typed value object
//! (`{"stringValue": "..."}`, `{"timestampValue": "..."}`, ...). Only the
//! value kinds used by booking documents are decoded here.

use chrono::{DateTime, Utc};
use leafsense_common::models::{Booking, BookingStatus, BookingTimestamp, MeetingLink};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// A document as returned by `GET .../documents/{path}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Document {
    /// Last path segment of the resource name.
    pub fn id(&self) -> Option<&str> {
        self.name.rsplit('/').next().filter(|segment| !segment.is_empty())
    }

    fn string_field(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .and_then(|value| value.get("stringValue"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn timestamp_field(&self, key: &str) -> Option<BookingTimestamp> {
        let raw = self
            .fields
            .get(key)
            .and_then(|value| value.get("timestampValue"))
            .and_then(Value::as_str)?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| BookingTimestamp::Rfc3339(dt.with_timezone(&Utc)))
    }
}

/// One element of the `documents:runQuery` response stream.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    #[serde(default)]
    pub document: Option<Document>,
    #[serde(default)]
    pub read_time: Option<String>,
}

/// Decodes a booking document; unknown or mistyped fields are left empty.
pub fn decode_booking(document: &Document) -> Booking {
    let status = document.string_field("status").map(|raw| {
        serde_json::from_value::<BookingStatus>(Value::String(raw))
            .unwrap_or(BookingStatus::Unknown)
    });

    Booking {
        id: document.id().map(str::to_string),
        status,
        date: document.timestamp_field("date"),
        expert_name: document.string_field("expertName"),
        user_email: document.string_field("userEmail"),
        topic: document.string_field("topic"),
        meet_link: document.string_field("meetLink"),
        calendar_event_id: document.string_field("calendarEventId"),
        revision: document.update_time.clone(),
    }
}

/// Field names touched by [`encode_meeting_link`]; used as the update mask.
pub const MEETING_FIELDS: [&str; 2] = ["meetLink", "calendarEventId"];

/// Body of the field level PATCH writing the meeting link back.
pub fn encode_meeting_link(link: &MeetingLink) -> Value {
    let mut fields = Map::new();
    fields.insert(
        "meetLink".to_string(),
        json!({ "stringValue": link.meet_link }),
    );
    fields.insert(
        "calendarEventId".to_string(),
        json!({ "stringValue": link.calendar_event_id }),
    );
    json!({ "fields": fields })
}

/// `status == value` structured query over one collection.
pub fn status_query(collection: &str, status: BookingStatus) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": "status" },
                    "op": "EQUAL",
                    "value": { "stringValue": status.as_str() }
                }
            }
        }
    })
}
