//! Appointment mutations driven by the operator.
//!
//! Every attempted mutation ends with a re-fetch of the appointments and a
//! banner, whether it succeeded or not. A declined confirmation sends
//! nothing.

use tracing::{error, info};

use crate::client::{AdminApiClient, DashboardError};
use crate::models::{ActionResponse, AppointmentStatus};
use crate::state::{Banner, DashboardState, Highlight};

pub const CANCEL_PROMPT: &str = "Are you sure you want to cancel this appointment?";
pub const DELETE_PROMPT: &str = "Are you sure you want to permanently remove this appointment?";

/// The person at the console.
#[cfg_attr(test, mockall::automock)]
pub trait Operator: Send + Sync {
    /// Asks a yes/no question; `false` when declined or unanswerable.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything, for `--yes`.
pub struct AssumeYes;

impl Operator for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Interactive terminal prompt.
pub struct InquireOperator;

impl Operator for InquireOperator {
    fn confirm(&self, prompt: &str) -> bool {
        match inquire::Confirm::new(prompt).with_default(false).prompt() {
            Ok(answer) => answer,
            Err(e) => {
                info!("Confirmation not answered: {}", e);
                false
            }
        }
    }
}

/// Client, state and operator of one console session.
pub struct AdminConsole<O> {
    pub client: AdminApiClient,
    pub state: DashboardState,
    operator: O,
}

impl<O: Operator> AdminConsole<O> {
    pub fn new(client: AdminApiClient, operator: O) -> Self {
        Self {
            client,
            state: DashboardState::default(),
            operator,
        }
    }

    pub async fn refresh(&mut self) {
        self.state.refresh(&self.client).await;
    }

    /// Approve or reject. Returns the banner shown.
    pub async fn set_status(&mut self, id: i64, status: AppointmentStatus) -> Banner {
        info!("Updating appointment {} to {}", id, status);
        let result = self.client.set_status(id, status).await;

        let banner = match result {
            Ok(response) => {
                self.state.highlighted = Some(Highlight {
                    appointment_id: id,
                    status,
                });
                Banner::success(message_or(&response, "Appointment updated"))
            }
            Err(e) => failure_banner(e, "Failed to update appointment status"),
        };
        self.finish(banner).await
    }

    /// `None` when the operator declined.
    pub async fn cancel(&mut self, id: i64) -> Option<Banner> {
        if !self.operator.confirm(CANCEL_PROMPT) {
            return None;
        }
        let banner = match self.client.cancel(id).await {
            Ok(response) => Banner::cancelled(message_or(&response, "Appointment cancelled")),
            Err(e) => failure_banner(e, "Failed to cancel appointment"),
        };
        Some(self.finish(banner).await)
    }

    /// `None` when the operator declined.
    pub async fn delete(&mut self, id: i64) -> Option<Banner> {
        if !self.operator.confirm(DELETE_PROMPT) {
            return None;
        }
        let banner = match self.client.delete(id).await {
            Ok(response) => Banner::removed(message_or(&response, "Appointment removed")),
            Err(e) => failure_banner(e, "Failed to remove appointment"),
        };
        Some(self.finish(banner).await)
    }

    async fn finish(&mut self, banner: Banner) -> Banner {
        self.state.refresh_appointments(&self.client).await;
        self.state.show_banner(banner.clone());
        banner
    }
}

fn message_or(response: &ActionResponse, fallback: &str) -> String {
    response.text().unwrap_or(fallback).to_string()
}

fn failure_banner(err: DashboardError, fallback: &str) -> Banner {
    error!("{}: {}", fallback, err);
    Banner::error(err.backend_message().unwrap_or(fallback))
}
