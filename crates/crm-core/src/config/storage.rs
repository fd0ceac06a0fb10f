//! Teaser storage configuration.

use serde::{Deserialize, Serialize};

/// Local bucket storage for teaser documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory under which buckets are created.
    #[serde(default = "default_root")]
    pub root_path: String,
    /// Bucket that holds teaser uploads.
    #[serde(default = "default_bucket")]
    pub teaser_bucket: String,
    /// Maximum teaser size in bytes.
    #[serde(default = "default_max_teaser")]
    pub max_teaser_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root(),
            teaser_bucket: default_bucket(),
            max_teaser_bytes: default_max_teaser(),
        }
    }
}

fn default_root() -> String {
    "./data/storage".to_string()
}

fn default_bucket() -> String {
    "teasers".to_string()
}

fn default_max_teaser() -> u64 {
    10 * 1024 * 1024
}
