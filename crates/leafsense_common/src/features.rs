//! Runtime feature switches.
//!
//! A feature is on when its `use_*` flag is set and its section exists.
//! The synchronizer needs all three Google integrations.

use leafsense_config::AppConfig;

/// `use_feature && feature_config.is_some()`
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

pub fn is_gcal_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_gcal, config.gcal.as_ref())
}

pub fn is_firestore_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_firestore, config.firestore.as_ref())
}

/// The `sync` section is optional; its defaults are fine.
pub fn is_sync_enabled(config: &AppConfig) -> bool {
    config.use_sync && is_gcal_enabled(config) && is_firestore_enabled(config)
}
