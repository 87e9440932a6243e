// --- File: crates/leafsense_gcal/src/lib.rs ---
pub mod auth;
pub mod logic;
pub mod service;

pub use auth::{create_calendar_hub, HubType};
pub use service::{GcalServiceError, GoogleCalendarService};
