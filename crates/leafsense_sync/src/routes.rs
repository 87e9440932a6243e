// File: crates/leafsense_sync/src/routes.rs
use axum::{routing::post, Router};
use leafsense_common::services::{BookingStore, CalendarService};
use std::sync::Arc;

use crate::handlers::{booking_updated_handler, reconcile_handler, SyncState};

/// Routes of the booking synchronizer, relative to the API prefix.
pub fn routes<C, S>(state: Arc<SyncState<C, S>>) -> Router
where
    C: CalendarService + 'static,
    S: BookingStore + 'static,
{
    Router::new()
        .route(
            "/sync/bookings/{booking_id}/updated",
            post(booking_updated_handler::<C, S>),
        )
        .route("/sync/reconcile", post(reconcile_handler::<C, S>))
        .with_state(state)
}
