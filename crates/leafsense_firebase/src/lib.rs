//! Cloud Firestore integration for LeafSense
//!
//! Provides the [`FirestoreBookingStore`], the `BookingStore` used by the
//! booking synchronizer, on top of the Firestore REST API.
//!
//! # Example
//!
//! ```rust,no_run
//! use leafsense_config::load_config;
//! use leafsense_firebase::build_booking_store;
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = load_config()?;
//!     let firestore = config.firestore.unwrap_or_default();
//!     let _store = build_booking_store(&firestore).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod document;
pub mod repository;

use leafsense_common::HTTP_CLIENT;
use leafsense_config::FirestoreConfig;
use std::error::Error;
use std::sync::Arc;

pub use auth::ServiceAccountTokenProvider;
pub use client::{FirestoreClient, FirestoreError, Precondition};
pub use repository::FirestoreBookingStore;

/// Wires the service account token provider, the REST client and the store.
pub async fn build_booking_store(
    config: &FirestoreConfig,
) -> Result<FirestoreBookingStore, Box<dyn Error + Send + Sync>> {
    let tokens = ServiceAccountTokenProvider::from_config(config).await?;
    let client = FirestoreClient::new(config, HTTP_CLIENT.clone(), Arc::new(tokens))?;
    Ok(FirestoreBookingStore::new(Arc::new(client), config))
}
