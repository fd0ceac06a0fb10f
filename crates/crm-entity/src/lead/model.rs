//! Lead entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::stage::PipelineStage;
use super::status::LeadStatus;

/// A prospective contact or company moving through the deal pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lead {
    /// Unique lead identifier.
    pub id: Uuid,
    /// Contact or opportunity name.
    pub name: String,
    /// Company name.
    pub company: Option<String>,
    /// Contact e-mail.
    pub email: Option<String>,
    /// Lead score (0-100).
    pub score: i32,
    /// Qualification status.
    pub status: LeadStatus,
    /// Kanban column.
    pub stage: PipelineStage,
    /// Closing probability in percent (0-100).
    pub probability: i32,
    /// Estimated deal value.
    pub value: f64,
    /// Owner of the lead.
    pub assigned_to_id: Option<Uuid>,
    /// When the lead was created.
    pub created_at: DateTime<Utc>,
    /// When the lead was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Whether the lead still counts against its owner's workload.
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Deal value weighted by closing probability.
    pub fn weighted_value(&self) -> f64 {
        self.value * f64::from(self.probability.clamp(0, 100)) / 100.0
    }
}

/// Data required to create a new lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLead {
    /// Contact or opportunity name.
    pub name: String,
    /// Company name.
    pub company: Option<String>,
    /// Contact e-mail.
    pub email: Option<String>,
    /// Lead score (0-100).
    pub score: i32,
    /// Initial kanban column.
    pub stage: PipelineStage,
    /// Closing probability in percent.
    pub probability: i32,
    /// Estimated deal value.
    pub value: f64,
    /// Initial owner.
    pub assigned_to_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_value_clamps_probability() {
        let now = Utc::now();
        let mut lead = Lead {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            company: None,
            email: None,
            score: 50,
            status: LeadStatus::New,
            stage: PipelineStage::Proposal,
            probability: 40,
            value: 1_000_000.0,
            assigned_to_id: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(lead.weighted_value(), 400_000.0);
        lead.probability = 150;
        assert_eq!(lead.weighted_value(), 1_000_000.0);
    }
}
