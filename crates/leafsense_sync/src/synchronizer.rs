// File: crates/leafsense_sync/src/synchronizer.rs
//! Turns confirmed bookings into calendar events with a Meet link.
//!
//! Every entry point returns a [`SyncOutcome`] instead of an error. Failures
//! are handed to the [`FailureReporter`] and never retried here; the
//! reconciliation sweep picks up whatever is still unlinked later.

use leafsense_common::models::{Booking, MeetingLink};
use leafsense_common::services::{BookingStore, CalendarService, RecordOutcome};
use leafsense_config::GcalConfig;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::logic::{
    build_meeting_request, should_provision, BookingChange, ReconcileReport, SyncError,
    SyncOutcome,
};
use crate::reporter::{FailureReporter, SyncFailure};

pub struct BookingSynchronizer<C, S> {
    calendar: Arc<C>,
    store: Arc<S>,
    reporter: Arc<dyn FailureReporter>,
    gcal: GcalConfig,
    /// Booking ids currently being provisioned in this process.
    in_flight: Mutex<HashSet<String>>,
}

/// Claim on one booking id, released on drop.
struct InFlight<'a> {
    ids: &'a Mutex<HashSet<String>>,
    booking_id: String,
}

impl<'a> InFlight<'a> {
    fn claim(ids: &'a Mutex<HashSet<String>>, booking_id: &str) -> Option<Self> {
        let mut set = ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !set.insert(booking_id.to_string()) {
            return None;
        }
        Some(Self {
            ids,
            booking_id: booking_id.to_string(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut set = self
            .ids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        set.remove(&self.booking_id);
    }
}

impl<C, S> BookingSynchronizer<C, S>
where
    C: CalendarService,
    S: BookingStore,
{
    pub fn new(
        calendar: Arc<C>,
        store: Arc<S>,
        reporter: Arc<dyn FailureReporter>,
        gcal: GcalConfig,
    ) -> Self {
        Self {
            calendar,
            store,
            reporter,
            gcal,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Handles one booking update notification.
    pub async fn on_booking_updated(&self, booking_id: &str, change: BookingChange) -> SyncOutcome {
        if !should_provision(&change.before, &change.after) {
            debug!(
                "Booking {} update {:?} -> {:?} ignored",
                booking_id, change.before.status, change.after.status
            );
            return SyncOutcome::Skipped;
        }
        if change.after.is_linked() {
            info!("Booking {} already has a meeting link", booking_id);
            return SyncOutcome::AlreadyLinked;
        }

        self.provision(booking_id, &change.after).await
    }

    /// Provisions every confirmed booking that still has no meeting link.
    pub async fn reconcile(&self) -> ReconcileReport {
        let bookings = match self.store.list_unlinked_confirmed().await {
            Ok(bookings) => bookings,
            Err(e) => {
                let err = SyncError::Store(Box::new(e));
                self.report(SyncFailure::new("", err.to_string())).await;
                return ReconcileReport::default();
            }
        };

        let mut report = ReconcileReport {
            examined: bookings.len(),
            ..Default::default()
        };
        for booking in &bookings {
            let Some(booking_id) = booking.id.as_deref() else {
                continue;
            };
            // reported once, when the trigger fired
            if let Err(e) = build_meeting_request(booking_id, booking, &self.gcal) {
                debug!("Sweep skips booking {}: {}", booking_id, e);
                report.invalid += 1;
                continue;
            }
            match self.provision(booking_id, booking).await {
                SyncOutcome::Provisioned { .. } => report.provisioned += 1,
                SyncOutcome::Failed { .. } => report.failed += 1,
                SyncOutcome::Skipped | SyncOutcome::AlreadyLinked | SyncOutcome::InProgress => {}
            }
        }

        info!(
            "Reconciliation done: examined={} provisioned={} failed={} invalid={}",
            report.examined, report.provisioned, report.failed, report.invalid
        );
        report
    }

    async fn provision(&self, booking_id: &str, snapshot: &Booking) -> SyncOutcome {
        let Some(_claim) = InFlight::claim(&self.in_flight, booking_id) else {
            info!("Booking {} is already being provisioned", booking_id);
            return SyncOutcome::InProgress;
        };

        match self.try_provision(booking_id, snapshot).await {
            Ok(Some(link)) => SyncOutcome::Provisioned {
                meet_link: link.meet_link,
                calendar_event_id: link.calendar_event_id,
            },
            Ok(None) => SyncOutcome::AlreadyLinked,
            Err(err) => {
                let reason = err.to_string();
                self.report(SyncFailure::new(booking_id, reason.clone()))
                    .await;
                SyncOutcome::Failed { reason }
            }
        }
    }

    /// `Ok(None)` when the stored booking turned out to be linked already,
    /// either at the re-read or when the conditional write was refused.
    async fn try_provision(
        &self,
        booking_id: &str,
        snapshot: &Booking,
    ) -> Result<Option<MeetingLink>, SyncError> {
        let request = build_meeting_request(booking_id, snapshot, &self.gcal)?;

        let current = self
            .store
            .fetch_booking(booking_id)
            .await
            .map_err(|e| SyncError::Store(Box::new(e)))?
            .ok_or_else(|| SyncError::BookingNotFound(booking_id.to_string()))?;
        if current.is_linked() {
            info!(
                "Booking {} was linked in the meantime, not creating another event",
                booking_id
            );
            return Ok(None);
        }

        let created = self
            .calendar
            .create_meeting(self.gcal.calendar_id(), request)
            .await
            .map_err(|e| SyncError::Calendar(Box::new(e)))?;

        let calendar_event_id = created.event_id.ok_or(SyncError::MissingEventId)?;
        let meet_link = created
            .meet_link
            .filter(|link| !link.is_empty())
            .ok_or_else(|| SyncError::MissingMeetLink(calendar_event_id.clone()))?;

        let link = MeetingLink {
            meet_link,
            calendar_event_id,
        };
        let written = self
            .store
            .record_meeting(booking_id, link.clone(), current.revision)
            .await
            .map_err(|e| SyncError::Store(Box::new(e)))?;
        if written == RecordOutcome::Conflict {
            warn!(
                "Booking {} changed while event {} was created, keeping the stored link",
                booking_id, link.calendar_event_id
            );
            return Ok(None);
        }

        info!(
            "Booking {} linked to calendar event {}",
            booking_id, link.calendar_event_id
        );
        Ok(Some(link))
    }

    async fn report(&self, failure: SyncFailure) {
        if let Err(e) = self.reporter.report(&failure).await {
            warn!(
                "Could not report failure of booking {}: {}",
                failure.booking_id, e
            );
        }
    }
}
