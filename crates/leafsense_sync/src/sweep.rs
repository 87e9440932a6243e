//! Periodic reconciliation.

use leafsense_common::services::{BookingStore, CalendarService};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

use crate::synchronizer::BookingSynchronizer;

/// Runs [`BookingSynchronizer::reconcile`] every `period`, starting right away.
pub fn spawn_sweep<C, S>(
    synchronizer: Arc<BookingSynchronizer<C, S>>,
    period: Duration,
) -> JoinHandle<()>
where
    C: CalendarService + 'static,
    S: BookingStore + 'static,
{
    info!("Reconciliation sweep every {:?}", period);
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            synchronizer.reconcile().await;
        }
    })
}
