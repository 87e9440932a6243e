// --- File: crates/leafsense_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type shared by all LeafSense crates.
///
/// Crate specific errors convert into this through `From` impls living next
/// to them, so handlers only ever need to map one type to HTTP.
#[derive(Error, Debug)]
pub enum LeafsenseError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Token acquisition or a credential was refused
    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A Google API or the admin backend failed
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Feature switched off by configuration
    #[error("Service unavailable: {0}")]
    UnavailableError(String),
}

/// Maps an error onto the HTTP status code returned to callers.
pub trait HttpStatusCode {
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for LeafsenseError {
    fn status_code(&self) -> u16 {
        match self {
            LeafsenseError::HttpError(_) | LeafsenseError::ConfigError(_) => 500,
            LeafsenseError::AuthError(_) => 401,
            LeafsenseError::ValidationError(_) => 400,
            LeafsenseError::ExternalServiceError { .. } => 502,
            LeafsenseError::NotFoundError(_) => 404,
            LeafsenseError::UnavailableError(_) => 503,
        }
    }
}

impl From<reqwest::Error> for LeafsenseError {
    fn from(err: reqwest::Error) -> Self {
        LeafsenseError::HttpError(err.to_string())
    }
}

pub fn validation_error<T: fmt::Display>(message: T) -> LeafsenseError {
    LeafsenseError::ValidationError(message.to_string())
}

pub fn unavailable<T: fmt::Display>(message: T) -> LeafsenseError {
    LeafsenseError::UnavailableError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> LeafsenseError {
    LeafsenseError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
