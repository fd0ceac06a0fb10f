//! Automated notification rules.
//!
//! Three pre-seeded rules are matched against current data on every
//! trigger. A match produces one delivery per enabled channel unless the
//! same rule already reached the same entity on that channel within the
//! dedup window.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crm_core::error::AppError;
use crm_core::types::pagination::{PageRequest, PageResponse};
use crm_database::traits::{
    LeadStore, NotificationLogStore, NotificationRuleStore, NotificationStore, TaskStore,
    UserStore,
};
use crm_entity::lead::PipelineStage;
use crm_entity::notification::{
    CreateNotification, DeliveryChannel, DeliveryStatus, NewNotificationLog, NotificationConfig,
    NotificationLog, NotificationRule, RuleType,
};

use crate::context::RequestContext;

use super::email::{EmailMessage, EmailSender};

/// Outcome of one trigger run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSummary {
    /// Active rules that were evaluated.
    pub rules_evaluated: u32,
    /// Entities matched across all rules, before dedup.
    pub matches: u32,
    /// Channel deliveries suppressed by the dedup window.
    pub deduplicated: u32,
    /// Deliveries logged as `sent`.
    pub delivered: u32,
    /// Deliveries logged as `failed`.
    pub failed: u32,
}

/// An entity a rule fired for.
#[derive(Debug, Clone)]
struct RuleMatch {
    entity_id: Uuid,
    entity_type: &'static str,
    name: String,
    recipient: Option<Uuid>,
}

/// Rule administration and evaluation.
#[derive(Clone)]
pub struct NotificationRuleService {
    rules: Arc<dyn NotificationRuleStore>,
    logs: Arc<dyn NotificationLogStore>,
    leads: Arc<dyn LeadStore>,
    tasks: Arc<dyn TaskStore>,
    users: Arc<dyn UserStore>,
    notifications: Arc<dyn NotificationStore>,
    email: Arc<dyn EmailSender>,
    dedup_window: Duration,
}

impl std::fmt::Debug for NotificationRuleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationRuleService")
            .field("email", &self.email)
            .field("dedup_window", &self.dedup_window)
            .finish()
    }
}

impl NotificationRuleService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rules: Arc<dyn NotificationRuleStore>,
        logs: Arc<dyn NotificationLogStore>,
        leads: Arc<dyn LeadStore>,
        tasks: Arc<dyn TaskStore>,
        users: Arc<dyn UserStore>,
        notifications: Arc<dyn NotificationStore>,
        email: Arc<dyn EmailSender>,
        dedup_window_hours: i64,
    ) -> Self {
        Self {
            rules,
            logs,
            leads,
            tasks,
            users,
            notifications,
            email,
            dedup_window: Duration::hours(dedup_window_hours.max(0)),
        }
    }

    pub async fn list_rules(&self) -> Result<Vec<NotificationRule>, AppError> {
        self.rules.list().await
    }

    /// Enables or disables a rule.
    pub async fn toggle_rule(
        &self,
        ctx: &RequestContext,
        rule_type: RuleType,
        is_active: bool,
    ) -> Result<NotificationRule, AppError> {
        let rule = self.rules.set_active(rule_type, is_active).await?;
        info!(
            rule_type = rule_type.as_str(),
            is_active,
            user_id = %ctx.user_id,
            "Notification rule toggled"
        );
        Ok(rule)
    }

    /// Replaces a rule's message and channel settings.
    pub async fn update_rule_config(
        &self,
        ctx: &RequestContext,
        rule_type: RuleType,
        config: NotificationConfig,
    ) -> Result<NotificationRule, AppError> {
        if config.message.trim().is_empty() {
            return Err(AppError::validation("Rule message must not be empty"));
        }
        if let Some(threshold) = config.threshold {
            if !(0..=100).contains(&threshold) {
                return Err(AppError::validation("Rule threshold must be between 0 and 100"));
            }
        }

        let rule = self.rules.update_config(rule_type, &config).await?;
        info!(
            rule_type = rule_type.as_str(),
            user_id = %ctx.user_id,
            "Notification rule updated"
        );
        Ok(rule)
    }

    /// Page through the delivery log, newest first.
    pub async fn list_logs(
        &self,
        page: &PageRequest,
    ) -> Result<PageResponse<NotificationLog>, AppError> {
        self.logs.find_all(page).await
    }

    /// Evaluate every active rule against current data and deliver.
    pub async fn trigger_automated_notifications(&self) -> Result<TriggerSummary, AppError> {
        let now = Utc::now();
        let since = now - self.dedup_window;
        let mut summary = TriggerSummary::default();

        for rule in self.rules.list().await? {
            if !rule.is_active {
                debug!(rule_type = rule.rule_type.as_str(), "Rule inactive, skipping");
                continue;
            }
            summary.rules_evaluated += 1;

            let matches = self.find_matches(&rule, now).await?;
            summary.matches += matches.len() as u32;

            for hit in matches {
                self.deliver(&rule, &hit, since, &mut summary).await?;
            }
        }

        info!(
            rules = summary.rules_evaluated,
            matches = summary.matches,
            deduplicated = summary.deduplicated,
            delivered = summary.delivered,
            failed = summary.failed,
            "Automated notifications triggered"
        );
        Ok(summary)
    }

    async fn find_matches(
        &self,
        rule: &NotificationRule,
        now: DateTime<Utc>,
    ) -> Result<Vec<RuleMatch>, AppError> {
        let matches = match rule.rule_type {
            RuleType::HighScoreLead => {
                let min_score = rule.threshold().unwrap_or(80);
                self.leads
                    .find_open_with_min_score(min_score)
                    .await?
                    .into_iter()
                    .map(|lead| RuleMatch {
                        entity_id: lead.id,
                        entity_type: "lead",
                        name: lead.name,
                        recipient: lead.assigned_to_id,
                    })
                    .collect()
            }
            RuleType::HighProbNegotiation => {
                let min_probability = rule.threshold().unwrap_or(70);
                self.leads
                    .find_in_stage_with_min_probability(PipelineStage::Negotiation, min_probability)
                    .await?
                    .into_iter()
                    .map(|lead| RuleMatch {
                        entity_id: lead.id,
                        entity_type: "lead",
                        name: lead.name,
                        recipient: lead.assigned_to_id,
                    })
                    .collect()
            }
            RuleType::TaskReminder => self
                .tasks
                .find_overdue(now)
                .await?
                .into_iter()
                .map(|task| RuleMatch {
                    entity_id: task.id,
                    entity_type: "task",
                    recipient: task
                        .assigned_to
                        .or(Some(task.created_by).filter(|id| !id.is_nil())),
                    name: task.title,
                })
                .collect(),
        };
        Ok(matches)
    }

    async fn deliver(
        &self,
        rule: &NotificationRule,
        hit: &RuleMatch,
        since: DateTime<Utc>,
        summary: &mut TriggerSummary,
    ) -> Result<(), AppError> {
        let config = &rule.notification_config.0;
        let message = config.render(&hit.name);

        let mut channels = Vec::with_capacity(2);
        if config.in_app {
            channels.push(DeliveryChannel::InApp);
        }
        if config.email {
            channels.push(DeliveryChannel::Email);
        }

        for channel in channels {
            if self
                .logs
                .delivered_since(rule.rule_type, hit.entity_id, channel, since)
                .await?
            {
                debug!(
                    rule_type = rule.rule_type.as_str(),
                    entity_id = %hit.entity_id,
                    channel = channel.as_str(),
                    "Already delivered within window"
                );
                summary.deduplicated += 1;
                continue;
            }
            let outcome = match channel {
                DeliveryChannel::InApp => self.deliver_in_app(rule.rule_type, hit, &message).await,
                DeliveryChannel::Email => self.deliver_email(rule.rule_type, hit, &message).await,
            };
            self.record(rule.rule_type, hit, channel, &message, outcome, summary)
                .await?;
        }
        Ok(())
    }

    async fn deliver_in_app(
        &self,
        rule_type: RuleType,
        hit: &RuleMatch,
        message: &str,
    ) -> Result<DeliveryStatus, AppError> {
        let Some(user_id) = hit.recipient else {
            return Ok(DeliveryStatus::Skipped);
        };
        self.notifications
            .create(&CreateNotification {
                user_id,
                category: format!("rule:{}", rule_type.as_str()),
                title: rule_type.as_str().to_string(),
                message: message.to_string(),
                entity_type: Some(hit.entity_type.to_string()),
                entity_id: Some(hit.entity_id),
            })
            .await?;
        Ok(DeliveryStatus::Sent)
    }

    async fn deliver_email(
        &self,
        rule_type: RuleType,
        hit: &RuleMatch,
        message: &str,
    ) -> Result<DeliveryStatus, AppError> {
        let Some(user_id) = hit.recipient else {
            return Ok(DeliveryStatus::Skipped);
        };
        let Some(user) = self.users.find_by_id(user_id).await? else {
            return Ok(DeliveryStatus::Skipped);
        };
        self.email
            .send(&EmailMessage {
                to: user.email,
                subject: format!("CRM: {}", rule_type.as_str()),
                body: message.to_string(),
            })
            .await?;
        Ok(DeliveryStatus::Sent)
    }

    async fn record(
        &self,
        rule_type: RuleType,
        hit: &RuleMatch,
        channel: DeliveryChannel,
        message: &str,
        outcome: Result<DeliveryStatus, AppError>,
        summary: &mut TriggerSummary,
    ) -> Result<(), AppError> {
        let (delivery_status, error) = match outcome {
            Ok(status) => (status, None),
            Err(e) => {
                warn!(
                    rule_type = rule_type.as_str(),
                    entity_id = %hit.entity_id,
                    channel = channel.as_str(),
                    error = %e,
                    "Notification delivery failed"
                );
                (DeliveryStatus::Failed, Some(e.to_string()))
            }
        };

        match delivery_status {
            DeliveryStatus::Sent => summary.delivered += 1,
            DeliveryStatus::Failed => summary.failed += 1,
            DeliveryStatus::Skipped => {}
        }

        self.logs
            .append(&NewNotificationLog {
                rule_type,
                entity_id: Some(hit.entity_id),
                recipient_id: hit.recipient,
                channel,
                message: message.to_string(),
                delivery_status,
                error,
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use crm_core::error::ErrorKind;
    use crm_core::types::id::UserId;
    use crm_database::MemoryStore;
    use crm_entity::lead::CreateLead;
    use crm_entity::user::{CreateUser, UserRole};

    use crate::notification::email::LogEmailSender;

    #[derive(Debug)]
    struct FailingSender;

    #[async_trait]
    impl EmailSender for FailingSender {
        async fn send(&self, _message: &EmailMessage) -> Result<(), AppError> {
            Err(AppError::external("smtp down"))
        }
    }

    fn service(store: &Arc<MemoryStore>, email: Arc<dyn EmailSender>) -> NotificationRuleService {
        NotificationRuleService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            email,
            24,
        )
    }

    fn admin() -> RequestContext {
        RequestContext::new(UserId::new(), UserRole::Admin, "Marta")
    }

    async fn lead(store: &MemoryStore, name: &str, score: i32, owner: Option<Uuid>) {
        LeadStore::create(
            store,
            &CreateLead {
                name: name.into(),
                company: None,
                email: None,
                score,
                stage: PipelineStage::Qualified,
                probability: 30,
                value: 1_000_000.0,
                assigned_to_id: owner,
            },
        )
        .await
        .unwrap();
    }

    async fn advisor(store: &MemoryStore) -> Uuid {
        UserStore::create(
            store,
            &CreateUser {
                full_name: "Pablo".into(),
                email: "pablo@example.com".into(),
                role: UserRole::Advisor,
                accepts_leads: true,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_high_score_rule_delivers_once_per_window() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store, Arc::new(LogEmailSender));
        let owner = advisor(&store).await;
        lead(&store, "Hot Lead", 85, Some(owner)).await;
        lead(&store, "Cold Lead", 40, Some(owner)).await;

        let first = svc.trigger_automated_notifications().await.unwrap();
        assert_eq!(first.rules_evaluated, 3);
        assert_eq!(first.matches, 1);
        assert_eq!(first.delivered, 1);

        let inbox = NotificationStore::find_by_user(store.as_ref(), owner, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(inbox.items.len(), 1);
        assert_eq!(inbox.items[0].message, "Lead Hot Lead tiene una puntuación alta");

        let second = svc.trigger_automated_notifications().await.unwrap();
        assert_eq!(second.matches, 1);
        assert_eq!(second.deduplicated, 1);
        assert_eq!(second.delivered, 0);
    }

    #[tokio::test]
    async fn test_inactive_rules_are_not_evaluated() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store, Arc::new(LogEmailSender));
        lead(&store, "Hot Lead", 95, Some(Uuid::new_v4())).await;

        for rule_type in RuleType::ALL {
            svc.toggle_rule(&admin(), rule_type, false).await.unwrap();
        }
        let summary = svc.trigger_automated_notifications().await.unwrap();
        assert_eq!(summary, TriggerSummary::default());
    }

    #[tokio::test]
    async fn test_failed_email_is_logged_and_retried_later() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store, Arc::new(FailingSender));
        let owner = advisor(&store).await;
        lead(&store, "Hot Lead", 90, Some(owner)).await;

        svc.update_rule_config(
            &admin(),
            RuleType::HighScoreLead,
            NotificationConfig {
                message: "{name} supera el umbral".into(),
                in_app: false,
                email: true,
                threshold: Some(85),
            },
        )
        .await
        .unwrap();

        let summary = svc.trigger_automated_notifications().await.unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.delivered, 0);

        let logs = svc.list_logs(&PageRequest::default()).await.unwrap();
        assert_eq!(logs.items[0].delivery_status, DeliveryStatus::Failed);
        assert_eq!(logs.items[0].message, "Hot Lead supera el umbral");

        let again = svc.trigger_automated_notifications().await.unwrap();
        assert_eq!(again.deduplicated, 0);
        assert_eq!(again.failed, 1);
    }

    #[tokio::test]
    async fn test_failed_email_retries_while_in_app_stays_deduplicated() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store, Arc::new(FailingSender));
        let owner = advisor(&store).await;
        lead(&store, "Hot Lead", 90, Some(owner)).await;

        svc.update_rule_config(
            &admin(),
            RuleType::HighScoreLead,
            NotificationConfig {
                message: "{name} supera el umbral".into(),
                in_app: true,
                email: true,
                threshold: Some(85),
            },
        )
        .await
        .unwrap();

        let first = svc.trigger_automated_notifications().await.unwrap();
        assert_eq!(first.delivered, 1);
        assert_eq!(first.failed, 1);
        assert_eq!(first.deduplicated, 0);

        let second = svc.trigger_automated_notifications().await.unwrap();
        assert_eq!(second.matches, 1);
        assert_eq!(second.deduplicated, 1);
        assert_eq!(second.delivered, 0);
        assert_eq!(second.failed, 1);

        let inbox = NotificationStore::find_by_user(store.as_ref(), owner, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(inbox.items.len(), 1);
    }

    #[tokio::test]
    async fn test_match_without_owner_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store, Arc::new(LogEmailSender));
        lead(&store, "Orphan", 99, None).await;

        let summary = svc.trigger_automated_notifications().await.unwrap();
        assert_eq!(summary.matches, 1);
        assert_eq!(summary.delivered, 0);

        let logs = svc.list_logs(&PageRequest::default()).await.unwrap();
        assert_eq!(logs.items[0].delivery_status, DeliveryStatus::Skipped);
    }

    #[tokio::test]
    async fn test_update_config_rejects_empty_message() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store, Arc::new(LogEmailSender));
        let err = svc
            .update_rule_config(
                &admin(),
                RuleType::TaskReminder,
                NotificationConfig {
                    message: "  ".into(),
                    in_app: true,
                    email: false,
                    threshold: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
