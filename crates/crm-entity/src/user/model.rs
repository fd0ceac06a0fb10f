//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A CRM user. Advisors with `accepts_leads` take part in lead assignment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Full name shown in the UI.
    pub full_name: String,
    /// Email address used for e-mail notifications.
    pub email: String,
    /// User role (RBAC).
    pub role: UserRole,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether the user receives leads from the balancer.
    pub accepts_leads: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this user is eligible for lead assignment.
    pub fn is_assignable(&self) -> bool {
        self.is_active && self.accepts_leads
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Full name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Assigned role.
    pub role: UserRole,
    /// Whether the user receives leads.
    pub accepts_leads: bool,
}
