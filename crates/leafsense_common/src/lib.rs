// --- File: crates/leafsense_common/src/lib.rs ---

pub mod error; // Error handling
pub mod features; // Runtime feature switches
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Booking record
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    external_service_error, unavailable, validation_error, HttpStatusCode, LeafsenseError,
};

// Re-export HTTP utilities for easier access
pub use http::client::{create_client, HTTP_CLIENT};

pub use features::{is_feature_enabled, is_firestore_enabled, is_gcal_enabled, is_sync_enabled};
