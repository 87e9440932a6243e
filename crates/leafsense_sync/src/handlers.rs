// File: crates/leafsense_sync/src/handlers.rs
use axum::{
    extract::{Path, State},
    response::Json,
};
use leafsense_common::services::{BookingStore, CalendarService};
use leafsense_common::{unavailable, validation_error, LeafsenseError};
use std::sync::Arc;
use tracing::info;

use crate::logic::{BookingChange, ReconcileReport, SyncOutcome};
use crate::synchronizer::BookingSynchronizer;

/// Shared state of the sync routes. `None` when the feature is disabled.
pub struct SyncState<C, S> {
    pub synchronizer: Option<Arc<BookingSynchronizer<C, S>>>,
}

impl<C, S> SyncState<C, S> {
    pub fn enabled(synchronizer: Arc<BookingSynchronizer<C, S>>) -> Self {
        Self {
            synchronizer: Some(synchronizer),
        }
    }

    pub fn disabled() -> Self {
        Self { synchronizer: None }
    }

    fn synchronizer(&self) -> Result<&BookingSynchronizer<C, S>, LeafsenseError> {
        self.synchronizer
            .as_deref()
            .ok_or_else(|| unavailable("Booking sync is disabled."))
    }
}

/// Change notification for one booking.
pub async fn booking_updated_handler<C, S>(
    State(state): State<Arc<SyncState<C, S>>>,
    Path(booking_id): Path<String>,
    Json(change): Json<BookingChange>,
) -> Result<Json<SyncOutcome>, LeafsenseError>
where
    C: CalendarService + 'static,
    S: BookingStore + 'static,
{
    let synchronizer = state.synchronizer()?;
    if booking_id.trim().is_empty() {
        return Err(validation_error("Booking id must not be empty"));
    }

    info!("Change notification for booking {}", booking_id);
    Ok(Json(
        synchronizer.on_booking_updated(&booking_id, change).await,
    ))
}

/// Runs one reconciliation sweep.
pub async fn reconcile_handler<C, S>(
    State(state): State<Arc<SyncState<C, S>>>,
) -> Result<Json<ReconcileReport>, LeafsenseError>
where
    C: CalendarService + 'static,
    S: BookingStore + 'static,
{
    let synchronizer = state.synchronizer()?;
    Ok(Json(synchronizer.reconcile().await))
}
