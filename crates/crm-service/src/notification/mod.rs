//! In-app inbox, automated notification rules and outbound e-mail.

pub mod email;
pub mod rules;
pub mod service;

pub use email::{
    EmailMessage, EmailSender, LogEmailSender, WebhookEmailSender, sender_from_config,
};
pub use rules::{NotificationRuleService, TriggerSummary};
pub use service::NotificationService;
