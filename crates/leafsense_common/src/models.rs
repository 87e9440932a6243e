// --- File: crates/leafsense_common/src/models.rs ---
//! The booking record as stored in the `bookings` collection.
//!
//! Field names follow the camelCase keys written by the mobile app.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Approved,
    Rejected,
    Cancelled,
    /// Any value this service does not know about.
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Unknown => "unknown",
        }
    }
}

/// Session start as delivered by the record store.
///
/// Accepts an RFC 3339 string, a protobuf style `{seconds, nanos}` object or
/// the Admin SDK's `{_seconds, _nanoseconds}` serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum BookingTimestamp {
    Rfc3339(DateTime<Utc>),
    Seconds {
        seconds: i64,
        #[serde(default)]
        nanos: u32,
    },
    AdminSdk {
        #[serde(rename = "_seconds")]
        seconds: i64,
        #[serde(rename = "_nanoseconds", default)]
        nanos: u32,
    },
}

impl BookingTimestamp {
    /// Converts to an instant; `None` when the seconds are out of range.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            BookingTimestamp::Rfc3339(dt) => Some(*dt),
            BookingTimestamp::Seconds { seconds, nanos }
            | BookingTimestamp::AdminSdk { seconds, nanos } => {
                DateTime::from_timestamp(*seconds, *nanos)
            }
        }
    }
}

impl From<DateTime<Utc>> for BookingTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        BookingTimestamp::Rfc3339(dt)
    }
}

/// A booking snapshot. Every field is optional because change notifications
/// may carry partial documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Document id; not part of the stored fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub date: Option<BookingTimestamp>,
    #[serde(default)]
    pub expert_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meet_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_event_id: Option<String>,
    /// Store revision the snapshot was read at (Firestore `updateTime`).
    /// Set by the store only, never read from notifications.
    #[serde(skip)]
    pub revision: Option<String>,
}

impl Booking {
    pub fn has_status(&self, status: BookingStatus) -> bool {
        self.status == Some(status)
    }

    /// True once a meeting link has been written back.
    pub fn is_linked(&self) -> bool {
        self.meet_link.as_deref().is_some_and(|link| !link.is_empty())
    }
}

/// The two derived fields written back after a calendar event was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MeetingLink {
    pub meet_link: String,
    pub calendar_event_id: String,
}
