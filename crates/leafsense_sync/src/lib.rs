//! Booking confirmation synchronizer.
//!
//! When a booking goes from `pending` to `confirmed`, a Google Calendar
//! event with a Meet conference is created for it and the resulting
//! `meetLink` / `calendarEventId` are written back onto the booking.

pub mod handlers;
pub mod logic;
pub mod reporter;
pub mod routes;
pub mod sweep;
pub mod synchronizer;
#[cfg(feature = "openapi")]
pub mod doc;

#[cfg(test)]
mod logic_proptest;
#[cfg(test)]
mod mock;
#[cfg(test)]
mod synchronizer_test;

pub use handlers::SyncState;
pub use logic::{BookingChange, ReconcileReport, SyncError, SyncOutcome};
pub use reporter::{reporter_from_config, FailureReporter, SyncFailure, TracingReporter, WebhookReporter};
pub use routes::routes;
pub use sweep::spawn_sweep;
pub use synchronizer::BookingSynchronizer;
