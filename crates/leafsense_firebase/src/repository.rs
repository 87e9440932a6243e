//! Booking store on top of a Firestore collection.

use leafsense_common::models::{Booking, BookingStatus, MeetingLink};
use leafsense_common::services::{BookingStore, BoxFuture, RecordOutcome};
use leafsense_config::FirestoreConfig;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::{FirestoreClient, FirestoreError, Precondition};
use crate::document::{
    decode_booking, encode_meeting_link, status_query, MEETING_FIELDS,
};

/// `BookingStore` backed by the `bookings` collection.
pub struct FirestoreBookingStore {
    client: Arc<FirestoreClient>,
    collection: String,
}

impl FirestoreBookingStore {
    pub fn new(client: Arc<FirestoreClient>, config: &FirestoreConfig) -> Self {
        Self {
            client,
            collection: config.collection().to_string(),
        }
    }
}

impl BookingStore for FirestoreBookingStore {
    type Error = FirestoreError;

    fn fetch_booking(&self, booking_id: &str) -> BoxFuture<'_, Option<Booking>, Self::Error> {
        let booking_id = booking_id.to_string();

        Box::pin(async move {
            let document = self
                .client
                .get_document(&self.collection, &booking_id)
                .await?;
            Ok(document.map(|doc| {
                let mut booking = decode_booking(&doc);
                booking.id.get_or_insert(booking_id);
                booking
            }))
        })
    }

    fn record_meeting(
        &self,
        booking_id: &str,
        link: MeetingLink,
        expected_revision: Option<String>,
    ) -> BoxFuture<'_, RecordOutcome, Self::Error> {
        let booking_id = booking_id.to_string();

        Box::pin(async move {
            let body = encode_meeting_link(&link);
            let precondition = match expected_revision {
                Some(time) => Precondition::UpdateTime(time),
                None => Precondition::Exists,
            };
            let result = self
                .client
                .update_fields(
                    &self.collection,
                    &booking_id,
                    &MEETING_FIELDS,
                    &body,
                    &precondition,
                )
                .await;

            match result {
                Ok(_) => {
                    info!(
                        "Booking {} updated with calendar event {}",
                        booking_id, link.calendar_event_id
                    );
                    Ok(RecordOutcome::Written)
                }
                Err(FirestoreError::PreconditionFailed(reason)) => {
                    warn!(
                        "Booking {} changed since it was read, event {} not recorded: {}",
                        booking_id, link.calendar_event_id, reason
                    );
                    Ok(RecordOutcome::Conflict)
                }
                Err(e) => Err(e),
            }
        })
    }

    fn list_unlinked_confirmed(&self) -> BoxFuture<'_, Vec<Booking>, Self::Error> {
        Box::pin(async move {
            let query = status_query(&self.collection, BookingStatus::Confirmed);
            let documents = self.client.run_query(&query).await?;
            let bookings: Vec<Booking> = documents
                .iter()
                .map(decode_booking)
                .filter(|booking| booking.id.is_some() && !booking.is_linked())
                .collect();
            debug!(
                "{} confirmed bookings, {} without meeting link",
                documents.len(),
                bookings.len()
            );
            Ok(bookings)
        })
    }
}
