//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crm_entity::commission::{CommissionStatus, CreateCommission};
use crm_entity::lead::{CreateLead, PipelineStage};
use crm_entity::notification::NotificationConfig;
use crm_entity::task::{CreateTask, TaskPriority, TaskType};
use crm_entity::user::{CreateUser, UserRole};

/// Create lead request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLeadRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub company: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(range(min = 0, max = 100))]
    #[serde(default)]
    pub score: i32,
    #[serde(default = "default_stage")]
    pub stage: PipelineStage,
    #[validate(range(min = 0, max = 100))]
    #[serde(default)]
    pub probability: i32,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub value: f64,
    pub assigned_to_id: Option<Uuid>,
}

fn default_stage() -> PipelineStage {
    PipelineStage::Lead
}

impl From<CreateLeadRequest> for CreateLead {
    fn from(req: CreateLeadRequest) -> Self {
        Self {
            name: req.name,
            company: req.company,
            email: req.email,
            score: req.score,
            stage: req.stage,
            probability: req.probability,
            value: req.value,
            assigned_to_id: req.assigned_to_id,
        }
    }
}

/// Move a lead to another kanban column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStageRequest {
    pub stage: PipelineStage,
}

/// Create task request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTaskRequest {
    pub lead_id: Uuid,
    pub task_type: TaskType,
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    pub description: Option<String>,
    /// Computed from the SLA table when absent.
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub dependencies: Vec<Uuid>,
}

impl From<CreateTaskRequest> for CreateTask {
    fn from(req: CreateTaskRequest) -> Self {
        Self {
            lead_id: req.lead_id,
            task_type: req.task_type,
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            assigned_to: req.assigned_to,
            priority: req.priority,
            dependencies: req.dependencies,
        }
    }
}

/// Snooze request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SnoozeTaskRequest {
    #[validate(range(min = 1, message = "Snooze must be at least one day"))]
    pub days: i64,
}

/// Replace a task's dependency list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetDependenciesRequest {
    pub dependencies: Vec<Uuid>,
}

/// Update the default SLA of a task type.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateSlaPolicyRequest {
    #[validate(range(min = 1, message = "SLA must be at least one hour"))]
    pub default_sla_hours: i32,
}

/// Enable or disable a notification rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleRuleRequest {
    pub is_active: bool,
}

/// Replace a rule's configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateRuleConfigRequest {
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
    #[serde(default = "default_true")]
    pub in_app: bool,
    #[serde(default)]
    pub email: bool,
    #[validate(range(min = 0, max = 100))]
    pub threshold: Option<i32>,
}

fn default_true() -> bool {
    true
}

impl From<UpdateRuleConfigRequest> for NotificationConfig {
    fn from(req: UpdateRuleConfigRequest) -> Self {
        Self {
            message: req.message,
            in_app: req.in_app,
            email: req.email,
            threshold: req.threshold,
        }
    }
}

/// Auto-assign request. Without ids every unassigned new lead is assigned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoAssignRequest {
    #[serde(default)]
    pub lead_ids: Option<Vec<Uuid>>,
}

/// Create commission request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCommissionRequest {
    pub lead_id: Uuid,
    pub collaborator_id: Uuid,
    #[validate(range(exclusive_min = 0.0, message = "Amount must be positive"))]
    pub amount: f64,
    #[serde(default = "default_commission_status")]
    pub status: CommissionStatus,
}

fn default_commission_status() -> CommissionStatus {
    CommissionStatus::Pending
}

impl From<CreateCommissionRequest> for CreateCommission {
    fn from(req: CreateCommissionRequest) -> Self {
        Self {
            lead_id: req.lead_id,
            collaborator_id: req.collaborator_id,
            amount: req.amount,
            status: req.status,
        }
    }
}

/// Create user request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub accepts_leads: bool,
}

impl From<CreateUserRequest> for CreateUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            full_name: req.full_name,
            email: req.email,
            role: req.role,
            accepts_leads: req.accepts_leads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_defaults_and_ranges() {
        let req: CreateLeadRequest =
            serde_json::from_str(r#"{"name": "Acme Holdings", "score": 85}"#).unwrap();
        assert_eq!(req.stage, PipelineStage::Lead);
        assert!(req.validate().is_ok());

        let bad: CreateLeadRequest =
            serde_json::from_str(r#"{"name": "Acme", "probability": 140}"#).unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_snooze_requires_a_day() {
        assert!(SnoozeTaskRequest { days: 0 }.validate().is_err());
        assert!(SnoozeTaskRequest { days: 3 }.validate().is_ok());
    }

    #[test]
    fn test_rule_config_requires_message() {
        let req: UpdateRuleConfigRequest =
            serde_json::from_str(r#"{"message": "", "threshold": 80}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
