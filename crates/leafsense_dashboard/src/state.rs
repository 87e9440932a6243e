//! Application state of the admin console.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::client::{AdminApiClient, DashboardError};
use crate::models::{Appointment, AppointmentStatus, Feedback, Prediction, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Warning,
    Info,
    Error,
}

/// Transient message shown above the tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub title: String,
    pub message: String,
    pub ttl: Duration,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(BannerKind::Success, "Success!", message, 3)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(BannerKind::Warning, "Cancelled!", message, 3)
    }

    pub fn removed(message: impl Into<String>) -> Self {
        Self::new(BannerKind::Info, "Removed!", message, 3)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(BannerKind::Error, "Error!", message, 5)
    }

    fn new(kind: BannerKind, title: &str, message: impl Into<String>, secs: u64) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message: message.into(),
            ttl: Duration::from_secs(secs),
        }
    }
}

/// Row marked after a successful status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub appointment_id: i64,
    pub status: AppointmentStatus,
}

/// Aggregate counters shown on top of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_feedback: usize,
    pub total_predictions: usize,
    pub total_appointments: usize,
    pub total_profiles: usize,
    pub pending_appointments: usize,
}

#[derive(Debug, Default)]
pub struct DashboardState {
    pub feedback: Vec<Feedback>,
    pub predictions: Vec<Prediction>,
    pub appointments: Vec<Appointment>,
    pub profiles: Vec<Profile>,
    pub highlighted: Option<Highlight>,
    pub last_refresh: Option<DateTime<Utc>>,
    pub(crate) banner: Option<(Banner, Instant)>,
}

/// An empty set for a collection that could not be fetched.
fn or_empty<T>(collection: &str, result: Result<Vec<T>, DashboardError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!("Error loading {}: {}", collection, e);
        Vec::new()
    })
}

impl DashboardState {
    /// Fetches the four collections concurrently and waits for all of them.
    pub async fn refresh(&mut self, client: &AdminApiClient) {
        let (feedback, predictions, appointments, profiles) = tokio::join!(
            client.list_feedback(),
            client.list_predictions(),
            client.list_appointments(),
            client.list_profiles(),
        );

        self.feedback = or_empty("feedback", feedback);
        self.predictions = or_empty("predictions", predictions);
        self.appointments = or_empty("appointments", appointments);
        self.profiles = or_empty("profiles", profiles);
        self.highlighted = None;
        self.last_refresh = Some(Utc::now());

        let stats = self.stats();
        info!(
            "Dashboard refreshed: feedback={} predictions={} appointments={} (pending {}) profiles={}",
            stats.total_feedback,
            stats.total_predictions,
            stats.total_appointments,
            stats.pending_appointments,
            stats.total_profiles
        );
    }

    /// Re-fetches the appointments only.
    pub async fn refresh_appointments(&mut self, client: &AdminApiClient) {
        self.appointments = or_empty("appointments", client.list_appointments().await);
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats {
            total_feedback: self.feedback.len(),
            total_predictions: self.predictions.len(),
            total_appointments: self.appointments.len(),
            total_profiles: self.profiles.len(),
            pending_appointments: self
                .appointments
                .iter()
                .filter(|apt| apt.status == AppointmentStatus::Pending)
                .count(),
        }
    }

    pub fn appointment(&self, id: i64) -> Option<&Appointment> {
        self.appointments.iter().find(|apt| apt.id == id)
    }

    pub fn show_banner(&mut self, banner: Banner) {
        self.banner = Some((banner, Instant::now()));
    }

    /// The current banner unless its display time is over.
    pub fn banner(&self) -> Option<&Banner> {
        self.banner
            .as_ref()
            .filter(|(banner, shown_at)| shown_at.elapsed() < banner.ttl)
            .map(|(banner, _)| banner)
    }
}
