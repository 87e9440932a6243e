// File: crates/services/leafsense_backend/src/service_factory.rs
//! Wiring of the concrete Google services behind the synchronizer.

use leafsense_common::{is_sync_enabled, logging};
use leafsense_config::AppConfig;
use leafsense_firebase::{build_booking_store, FirestoreBookingStore};
use leafsense_gcal::{create_calendar_hub, GoogleCalendarService};
use leafsense_sync::{reporter_from_config, BookingSynchronizer, SyncState};
use std::error::Error;
use std::sync::Arc;
use tracing::{info, warn};

pub type Synchronizer = BookingSynchronizer<GoogleCalendarService, FirestoreBookingStore>;
pub type AppSyncState = SyncState<GoogleCalendarService, FirestoreBookingStore>;

/// Builds the synchronizer when the `sync`, `gcal` and `firestore` switches
/// are all on. Any setup failure leaves the sync routes answering 503.
pub async fn build_sync_state(config: &AppConfig) -> (AppSyncState, Option<Arc<Synchronizer>>) {
    if !is_sync_enabled(config) {
        info!("Booking sync disabled by configuration");
        return (SyncState::disabled(), None);
    }

    match build_synchronizer(config).await {
        Ok(synchronizer) => {
            let synchronizer = Arc::new(synchronizer);
            info!("Booking sync enabled");
            (SyncState::enabled(synchronizer.clone()), Some(synchronizer))
        }
        Err(e) => {
            logging::log_error(&e, "Booking sync setup failed");
            warn!("Sync routes will answer 503");
            (SyncState::disabled(), None)
        }
    }
}

async fn build_synchronizer(
    config: &AppConfig,
) -> Result<Synchronizer, Box<dyn Error + Send + Sync>> {
    let gcal = config.gcal.clone().ok_or("Missing [gcal] section")?;
    let firestore = config.firestore.as_ref().ok_or("Missing [firestore] section")?;

    let hub = create_calendar_hub(&gcal).await?;
    let calendar = GoogleCalendarService::new(Arc::new(hub));
    let store = build_booking_store(firestore).await?;
    let reporter = reporter_from_config(config.sync.as_ref());

    Ok(BookingSynchronizer::new(
        Arc::new(calendar),
        Arc::new(store),
        reporter,
        gcal,
    ))
}
