//! Lead qualification status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualification status of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lead_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    /// Not yet worked.
    New,
    /// First contact made (set by the balancer on assignment).
    Contacted,
    /// Qualified as a real opportunity.
    Qualified,
    /// Ruled out.
    Disqualified,
    /// Converted into a client.
    Converted,
}

impl LeadStatus {
    /// Open leads count towards an advisor's workload.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::New | Self::Contacted | Self::Qualified)
    }

    /// Return the status as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Contacted => "CONTACTED",
            Self::Qualified => "QUALIFIED",
            Self::Disqualified => "DISQUALIFIED",
            Self::Converted => "CONVERTED",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
