// File: crates/leafsense_sync/src/reporter.rs
//! Operational reporting of failed provisioning attempts.

use chrono::{DateTime, Utc};
use leafsense_common::services::{BoxFuture, BoxedError};
use leafsense_common::HTTP_CLIENT;
use leafsense_config::SyncConfig;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// A provisioning attempt that did not produce a meeting link.
#[derive(Debug, Clone, Serialize)]
pub struct SyncFailure {
    /// Empty when the failure is not tied to one booking (e.g. the sweep
    /// query itself failed).
    pub booking_id: String,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

impl SyncFailure {
    pub fn new(booking_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            booking_id: booking_id.into(),
            reason: reason.into(),
            occurred_at: Utc::now(),
        }
    }
}

/// Channel receiving every provisioning failure.
pub trait FailureReporter: Send + Sync {
    fn report<'a>(&'a self, failure: &'a SyncFailure) -> BoxFuture<'a, (), BoxedError>;
}

/// Emits a structured `tracing` error event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report<'a>(&'a self, failure: &'a SyncFailure) -> BoxFuture<'a, (), BoxedError> {
        Box::pin(async move {
            error!(
                booking_id = %failure.booking_id,
                reason = %failure.reason,
                "Meeting provisioning failed"
            );
            Ok(())
        })
    }
}

/// Logs the failure and POSTs it as JSON to an alert webhook.
pub struct WebhookReporter {
    client: Client,
    url: String,
}

impl WebhookReporter {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl FailureReporter for WebhookReporter {
    fn report<'a>(&'a self, failure: &'a SyncFailure) -> BoxFuture<'a, (), BoxedError> {
        Box::pin(async move {
            TracingReporter.report(failure).await?;

            let response = self
                .client
                .post(&self.url)
                .json(failure)
                .send()
                .await
                .map_err(|e| BoxedError(Box::new(e)))?;

            if let Err(e) = response.error_for_status() {
                return Err(BoxedError(Box::new(e)));
            }
            info!("Failure of booking {} sent to alert webhook", failure.booking_id);
            Ok(())
        })
    }
}

/// Webhook reporter when `alert_webhook_url` is set, tracing only otherwise.
pub fn reporter_from_config(config: Option<&SyncConfig>) -> Arc<dyn FailureReporter> {
    match config
        .and_then(|sync| sync.alert_webhook_url.as_deref())
        .filter(|url| !url.trim().is_empty())
    {
        Some(url) => Arc::new(WebhookReporter::new(HTTP_CLIENT.clone(), url)),
        None => Arc::new(TracingReporter),
    }
}
