//! Automated notification configuration.

use serde::{Deserialize, Serialize};

/// Settings for the notification rule engine and inbox retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// A rule does not fire twice for the same entity within this window.
    #[serde(default = "default_dedup_window")]
    pub dedup_window_hours: i64,
    /// HTTP endpoint of the e-mail sending function. Log-only when unset.
    #[serde(default)]
    pub email_function_url: Option<String>,
    /// Bearer key sent to the e-mail function.
    #[serde(default)]
    pub email_function_key: Option<String>,
    /// Read notifications older than this are purged by maintenance.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            dedup_window_hours: default_dedup_window(),
            email_function_url: None,
            email_function_key: None,
            retention_days: default_retention_days(),
        }
    }
}

fn default_dedup_window() -> i64 {
    24
}

fn default_retention_days() -> i64 {
    90
}
