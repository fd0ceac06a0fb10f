//! # crm-service
//!
//! Business logic service layer for the CRM. Each service orchestrates the
//! store traits from `crm-database`, the storage provider and outbound
//! e-mail to implement application-level use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod assignment;
pub mod context;
pub mod lead;
pub mod maintenance;
pub mod metrics;
pub mod notification;
pub mod reminder;
pub mod services;
pub mod task;
pub mod teaser;

pub use assignment::{AssignmentService, AssignmentSummary};
pub use context::RequestContext;
pub use lead::{CommissionService, LeadService, UserService};
pub use maintenance::{CleanupSummary, MaintenanceService};
pub use metrics::MetricsService;
pub use notification::{
    EmailMessage, EmailSender, LogEmailSender, NotificationRuleService, NotificationService,
    TriggerSummary, WebhookEmailSender, sender_from_config,
};
pub use reminder::{DispatchSummary, ReminderService};
pub use services::Services;
pub use task::TaskService;
pub use teaser::{TeaserService, TeaserUpload};
