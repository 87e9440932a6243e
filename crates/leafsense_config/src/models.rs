// --- File: crates/leafsense_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
        }
    }
}

// --- Google Calendar Config ---
// The service account key itself stays on disk; only its path lives here.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GcalConfig {
    pub key_path: Option<String>,    // Mandatory when use_gcal is set
    pub calendar_id: Option<String>, // Defaults to "primary"
    pub session_minutes: Option<i64>, // Defaults to 60
    pub time_zone: Option<String>,   // Defaults to "UTC"
    pub summary_prefix: Option<String>, // Defaults to "LeafSense Session"
}

impl GcalConfig {
    pub fn calendar_id(&self) -> &str {
        self.calendar_id.as_deref().unwrap_or("primary")
    }

    pub fn session_minutes(&self) -> i64 {
        self.session_minutes.unwrap_or(60)
    }

    pub fn time_zone(&self) -> &str {
        self.time_zone.as_deref().unwrap_or("UTC")
    }

    pub fn summary_prefix(&self) -> &str {
        self.summary_prefix.as_deref().unwrap_or("LeafSense Session")
    }
}

// --- Firestore Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FirestoreConfig {
    pub project_id: Option<String>, // Mandatory when use_firestore is set
    pub key_path: Option<String>,   // Service account used for the datastore scope
    pub database_id: Option<String>, // Defaults to "(default)"
    pub collection: Option<String>, // Defaults to "bookings"
    pub base_url: Option<String>,   // Defaults to https://firestore.googleapis.com
}

impl FirestoreConfig {
    pub fn database_id(&self) -> &str {
        self.database_id.as_deref().unwrap_or("(default)")
    }

    pub fn collection(&self) -> &str {
        self.collection.as_deref().unwrap_or("bookings")
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or("https://firestore.googleapis.com")
            .trim_end_matches('/')
    }
}

// --- Booking Sync Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SyncConfig {
    /// Interval of the reconciliation sweep; 0 or missing disables it.
    pub sweep_interval_secs: Option<u64>,
    /// Optional webhook receiving a JSON body for every failed provisioning.
    pub alert_webhook_url: Option<String>,
}

// --- Admin Dashboard Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DashboardConfig {
    pub api_base_url: String,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    pub display_time_zone: Option<String>, // e.g. "Africa/Juba"; UTC when missing
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            display_time_zone: None,
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_firestore: bool,
    #[serde(default)]
    pub use_sync: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub firestore: Option<FirestoreConfig>,
    #[serde(default)]
    pub sync: Option<SyncConfig>,
    #[serde(default)]
    pub dashboard: Option<DashboardConfig>,
}
