//! Service account authentication for the Firestore REST API.
//!
//! The key file is read once; every token request builds a fresh
//! authenticator from the cached key.

use leafsense_common::services::{AccessTokenProvider, BoxFuture, BoxedError};
use leafsense_config::FirestoreConfig;
use std::{error::Error, path::Path};
use yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator, ServiceAccountKey};

/// Scope granting read/write access to Cloud Firestore.
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Token provider backed by a Google service account key.
pub struct ServiceAccountTokenProvider {
    key: ServiceAccountKey,
}

impl ServiceAccountTokenProvider {
    /// Reads the key file referenced by `firestore.key_path`.
    pub async fn from_config(
        config: &FirestoreConfig,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let key_path = config
            .key_path
            .as_deref()
            .ok_or("Missing key_path in FirestoreConfig")?;

        let key = read_service_account_key(Path::new(key_path)).await?;
        Ok(Self { key })
    }
}

impl AccessTokenProvider for ServiceAccountTokenProvider {
    fn access_token(&self, scopes: &[&str]) -> BoxFuture<'_, String, BoxedError> {
        let scopes: Vec<String> = scopes.iter().map(|s| s.to_string()).collect();
        let key = self.key.clone();

        Box::pin(async move {
            let auth = ServiceAccountAuthenticator::builder(key)
                .build()
                .await
                .map_err(|e| BoxedError(Box::new(e)))?;

            let auth_token = auth
                .token(scopes.as_slice())
                .await
                .map_err(|e| BoxedError(Box::new(e)))?;

            match auth_token.token() {
                Some(token) => Ok(token.to_string()),
                None => Err(BoxedError("No token available".into())),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_path() {
        let config = FirestoreConfig::default();
        let err = ServiceAccountTokenProvider::from_config(&config)
            .await
            .err()
            .expect("missing key_path must fail");
        assert_eq!(err.to_string(), "Missing key_path in FirestoreConfig");
    }

    #[tokio::test]
    async fn test_unreadable_key_file() {
        let config = FirestoreConfig {
            key_path: Some("/nonexistent/firestore-sa.json".to_string()),
            ..Default::default()
        };
        assert!(ServiceAccountTokenProvider::from_config(&config)
            .await
            .is_err());
    }
}
