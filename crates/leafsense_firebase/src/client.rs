//! Cloud Firestore REST client.
//!
//! A thin wrapper over the `v1` documents API: read one document, patch
//! selected fields of an existing document and run a structured query.

use leafsense_common::services::AccessTokenProvider;
use leafsense_common::{external_service_error, LeafsenseError};
use leafsense_config::FirestoreConfig;
use reqwest::{header, Client, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::auth::DATASTORE_SCOPE;
use crate::document::{Document, RunQueryResponse};

/// Errors that can occur when talking to Firestore.
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// Error while obtaining an OAuth2 token
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error during HTTP request to the Firestore API
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Missing required configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// The document addressed by an update does not exist
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The `currentDocument` precondition of a write did not hold
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Error returned by the Firestore API
    #[error("Firestore API error ({status}): {message}")]
    ApiError { status: u16, message: String },
}

impl From<FirestoreError> for LeafsenseError {
    fn from(err: FirestoreError) -> Self {
        match err {
            FirestoreError::ConfigError(message) => LeafsenseError::ConfigError(message),
            FirestoreError::NotFound(message) => LeafsenseError::NotFoundError(message),
            FirestoreError::AuthError(message) => LeafsenseError::AuthError(message),
            other => external_service_error("Firestore", other),
        }
    }
}

/// `currentDocument` precondition of a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    Exists,
    /// Document must still carry this `updateTime`.
    UpdateTime(String),
}

impl Precondition {
    fn query_param(&self) -> (&'static str, &str) {
        match self {
            Precondition::Exists => ("currentDocument.exists", "true"),
            Precondition::UpdateTime(time) => ("currentDocument.updateTime", time),
        }
    }
}

/// Client for the documents of one Firestore database.
pub struct FirestoreClient {
    client: Client,
    tokens: Arc<dyn AccessTokenProvider>,
    /// `{base}/v1/projects/{project}/databases/{database}/documents`
    documents_url: String,
}

impl FirestoreClient {
    /// Creates a client for the database named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `FirestoreError::ConfigError` when `project_id` is missing.
    pub fn new(
        config: &FirestoreConfig,
        client: Client,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, FirestoreError> {
        let project_id = config.project_id.as_deref().ok_or_else(|| {
            FirestoreError::ConfigError("Missing project_id in FirestoreConfig".to_string())
        })?;

        let documents_url = format!(
            "{}/v1/projects/{}/databases/{}/documents",
            config.base_url(),
            project_id,
            config.database_id()
        );

        Ok(Self {
            client,
            tokens,
            documents_url,
        })
    }

    pub fn document_url(&self, collection: &str, document_id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, collection, document_id)
    }

    async fn bearer(&self) -> Result<String, FirestoreError> {
        let token = self
            .tokens
            .access_token(&[DATASTORE_SCOPE])
            .await
            .map_err(|e| FirestoreError::AuthError(e.to_string()))?;
        Ok(format!("Bearer {}", token))
    }

    async fn api_error(response: Response) -> FirestoreError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
        FirestoreError::ApiError { status, message }
    }

    /// Fetches one document; `Ok(None)` when it does not exist.
    pub async fn get_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<Option<Document>, FirestoreError> {
        let url = self.document_url(collection, document_id);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, self.bearer().await?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(Some(response.json().await?))
    }

    /// Updates only the fields listed in `field_paths` on an existing
    /// document. The document is never created.
    ///
    /// A 404 is `NotFound`; a 409, or a 400 with `FAILED_PRECONDITION`, is
    /// `PreconditionFailed`.
    pub async fn update_fields(
        &self,
        collection: &str,
        document_id: &str,
        field_paths: &[&str],
        body: &Value,
        precondition: &Precondition,
    ) -> Result<Document, FirestoreError> {
        let url = self.document_url(collection, document_id);
        debug!(
            "PATCH {} fields={:?} precondition={:?}",
            url, field_paths, precondition
        );

        let mut query: Vec<(&str, &str)> = field_paths
            .iter()
            .map(|path| ("updateMask.fieldPaths", *path))
            .collect();
        query.push(precondition.query_param());

        let response = self
            .client
            .patch(&url)
            .query(&query)
            .header(header::AUTHORIZATION, self.bearer().await?)
            .json(body)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FirestoreError::NotFound(format!(
                "{}/{}",
                collection, document_id
            )));
        }
        if !response.status().is_success() {
            return Err(match Self::api_error(response).await {
                FirestoreError::ApiError { status, message }
                    if status == StatusCode::CONFLICT.as_u16()
                        || (status == StatusCode::BAD_REQUEST.as_u16()
                            && message.contains("FAILED_PRECONDITION")) =>
                {
                    FirestoreError::PreconditionFailed(format!(
                        "{}/{}: {}",
                        collection, document_id, message
                    ))
                }
                other => other,
            });
        }

        Ok(response.json().await?)
    }

    /// Runs a structured query and returns the matched documents.
    pub async fn run_query(&self, query: &Value) -> Result<Vec<Document>, FirestoreError> {
        let url = format!("{}:runQuery", self.documents_url);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, self.bearer().await?)
            .json(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let rows: Vec<RunQueryResponse> = response.json().await?;
        Ok(rows.into_iter().filter_map(|row| row.document).collect())
    }
}
