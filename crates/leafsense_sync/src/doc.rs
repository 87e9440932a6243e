// File: crates/leafsense_sync/src/doc.rs
#![cfg(feature = "openapi")]

use leafsense_common::models::{Booking, BookingStatus, BookingTimestamp};
use utoipa::OpenApi;

use crate::logic::{BookingChange, ReconcileReport, SyncOutcome};

// The handlers are generic over the calendar and the store, so the paths
// are documented on these stand-ins.
#[utoipa::path(
    post,
    path = "/sync/bookings/{booking_id}/updated",
    params(("booking_id" = String, Path, description = "Document id of the booking", example = "b1")),
    request_body(content = BookingChange, example = json!({
        "before": { "status": "pending", "date": "2025-06-01T09:30:00Z", "userEmail": "farmer@example.com", "topic": "Leaf rust", "expertName": "Dr. Amol" },
        "after": { "status": "confirmed", "date": "2025-06-01T09:30:00Z", "userEmail": "farmer@example.com", "topic": "Leaf rust", "expertName": "Dr. Amol" }
    })),
    responses(
        (status = 200, description = "Outcome of the synchronization", body = SyncOutcome,
         example = json!({
             "outcome": "provisioned",
             "meet_link": "https://meet.google.com/abc-defg-hij",
             "calendar_event_id": "evt_1"
         })
        ),
        (status = 400, description = "Empty booking id"),
        (status = 503, description = "Booking sync is disabled")
    ),
    tag = "Sync"
)]
#[allow(dead_code)]
fn doc_booking_updated_handler() {}

#[utoipa::path(
    post,
    path = "/sync/reconcile",
    responses(
        (status = 200, description = "Sweep summary", body = ReconcileReport,
         example = json!({ "examined": 4, "provisioned": 2, "failed": 1, "invalid": 1 })
        ),
        (status = 503, description = "Booking sync is disabled")
    ),
    tag = "Sync"
)]
#[allow(dead_code)]
fn doc_reconcile_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(doc_booking_updated_handler, doc_reconcile_handler),
    components(schemas(
        BookingChange,
        Booking,
        BookingStatus,
        BookingTimestamp,
        SyncOutcome,
        ReconcileReport
    )),
    tags((name = "Sync", description = "Booking to Google Meet synchronization"))
)]
pub struct SyncApiDoc;
