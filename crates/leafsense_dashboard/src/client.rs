//! REST client for the LeafSense admin backend.

use leafsense_common::{create_client, external_service_error, LeafsenseError};
use leafsense_config::DashboardConfig;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    ActionResponse, Appointment, AppointmentStatus, Feedback, Prediction, Profile, StatusUpdate,
};

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("{path} answered with status {status}")]
    StatusError { path: String, status: u16 },

    /// A mutation was refused; `message` is what the backend said, if anything.
    #[error("Action rejected: {}", .message.as_deref().unwrap_or("no reason given"))]
    Rejected { message: Option<String> },

    #[error("Invalid api_base_url: {0}")]
    ConfigError(String),
}

impl DashboardError {
    /// Backend supplied explanation, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            DashboardError::Rejected { message } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<DashboardError> for LeafsenseError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::ConfigError(message) => LeafsenseError::ConfigError(message),
            other => external_service_error("Admin API", other),
        }
    }
}

pub struct AdminApiClient {
    client: Client,
    base_url: String,
}

impl AdminApiClient {
    pub fn new(config: &DashboardConfig) -> Result<Self, DashboardError> {
        let base_url = config.api_base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(DashboardError::ConfigError(config.api_base_url.clone()));
        }
        let client = create_client(config.request_timeout_secs, true)?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, DashboardError> {
        debug!("GET {}", path);
        let response = self.client.get(self.url(path)).send().await?;
        if !response.status().is_success() {
            return Err(DashboardError::StatusError {
                path: path.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    pub async fn list_feedback(&self) -> Result<Vec<Feedback>, DashboardError> {
        self.get_list("/api/feedback/").await
    }

    pub async fn list_predictions(&self) -> Result<Vec<Prediction>, DashboardError> {
        self.get_list("/api/predictions").await
    }

    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, DashboardError> {
        self.get_list("/api/appointments/").await
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, DashboardError> {
        self.get_list("/api/profiles").await
    }

    /// `PATCH /api/appointments/{id}` with the new status.
    pub async fn set_status(
        &self,
        id: i64,
        status: AppointmentStatus,
    ) -> Result<ActionResponse, DashboardError> {
        let path = format!("/api/appointments/{}", id);
        let request = self
            .client
            .patch(self.url(&path))
            .json(&StatusUpdate { status });
        Self::action(request.send().await?).await
    }

    pub async fn cancel(&self, id: i64) -> Result<ActionResponse, DashboardError> {
        self.send_action(Method::POST, &format!("/cancel_appointment/{}", id))
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<ActionResponse, DashboardError> {
        self.send_action(Method::DELETE, &format!("/admin/appointments/{}", id))
            .await
    }

    async fn send_action(&self, method: Method, path: &str) -> Result<ActionResponse, DashboardError> {
        debug!("{} {}", method, path);
        let response = self.client.request(method, self.url(path)).send().await?;
        Self::action(response).await
    }

    /// Success needs both a 2xx status and `"status": "success"` in the body.
    async fn action(response: Response) -> Result<ActionResponse, DashboardError> {
        let ok = response.status().is_success();
        let body: ActionResponse = response.json().await.unwrap_or_default();
        if ok && body.is_success() {
            Ok(body)
        } else {
            Err(DashboardError::Rejected {
                message: body.text().map(str::to_string),
            })
        }
    }
}
