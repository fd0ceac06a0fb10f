//! Response DTOs.

use serde::{Deserialize, Serialize};

use crm_entity::lead::Lead;
use crm_entity::reminder::ReminderTask;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Count response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: i64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Result of a stage change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageChangeResponse {
    pub lead: Lead,
    /// Reminder scheduled for the new stage, if it has one.
    pub reminder: Option<ReminderTask>,
}
