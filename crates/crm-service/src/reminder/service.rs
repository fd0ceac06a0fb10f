//! Reminder scheduling and dispatch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crm_core::error::AppError;
use crm_database::traits::{LeadStore, NotificationStore, ReminderStore};
use crm_entity::lead::{Lead, PipelineStage};
use crm_entity::notification::CreateNotification;
use crm_entity::reminder::{CreateReminder, EntityType, ReminderTask, ReminderType};

use crate::context::RequestContext;

use super::rules::rule_for_stage;

/// Reminders claimed per dispatch batch.
const DISPATCH_BATCH: u64 = 500;

/// Inbox category used for dispatched reminders.
const REMINDER_CATEGORY: &str = "reminder";

/// Result of a dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    /// Reminders that were due.
    pub due: u64,
    /// Reminders turned into inbox notifications.
    pub delivered: u64,
    /// Reminders closed without a recipient.
    pub orphaned: u64,
}

/// Schedules, cancels and fires stage-change reminders.
#[derive(Clone)]
pub struct ReminderService {
    reminders: Arc<dyn ReminderStore>,
    leads: Arc<dyn LeadStore>,
    notifications: Arc<dyn NotificationStore>,
}

impl std::fmt::Debug for ReminderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderService").finish()
    }
}

impl ReminderService {
    pub fn new(
        reminders: Arc<dyn ReminderStore>,
        leads: Arc<dyn LeadStore>,
        notifications: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            reminders,
            leads,
            notifications,
        }
    }

    /// React to a stage transition.
    ///
    /// Nothing is scheduled when the stage did not change or when the new
    /// stage has no reminder rule.
    pub async fn on_stage_change(
        &self,
        ctx: &RequestContext,
        entity_id: Uuid,
        entity_type: EntityType,
        previous: Option<PipelineStage>,
        next: PipelineStage,
    ) -> Result<Option<ReminderTask>, AppError> {
        if previous == Some(next) {
            return Ok(None);
        }
        let Some(rule) = rule_for_stage(next) else {
            return Ok(None);
        };

        let created_by = (!ctx.is_system()).then(|| ctx.user_id.into_uuid());
        let reminder = self
            .reminders
            .create(&CreateReminder {
                entity_id,
                entity_type,
                reminder_type: rule.reminder_type,
                message: rule.message.to_string(),
                scheduled_for: Utc::now() + rule.delay(),
                created_by,
            })
            .await?;

        info!(
            reminder_id = %reminder.id,
            entity_id = %entity_id,
            reminder_type = rule.reminder_type.as_str(),
            scheduled_for = %reminder.scheduled_for,
            "Reminder scheduled"
        );
        Ok(Some(reminder))
    }

    /// Move a lead to a new stage and schedule any follow-up reminder.
    pub async fn change_lead_stage(
        &self,
        ctx: &RequestContext,
        lead_id: Uuid,
        stage: PipelineStage,
    ) -> Result<(Lead, Option<ReminderTask>), AppError> {
        let current = self
            .leads
            .find_by_id(lead_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Lead {lead_id} not found")))?;
        let previous = current.stage;

        let lead = self.leads.update_stage(lead_id, stage).await?;
        info!(
            lead_id = %lead_id,
            from = previous.as_str(),
            to = stage.as_str(),
            user_id = %ctx.user_id,
            "Lead stage changed"
        );

        let reminder = self
            .on_stage_change(ctx, lead_id, EntityType::Lead, Some(previous), stage)
            .await?;
        Ok((lead, reminder))
    }

    /// Cancel every pending reminder of a type for an entity.
    pub async fn cancel_reminder(
        &self,
        entity_id: Uuid,
        reminder_type: ReminderType,
    ) -> Result<u64, AppError> {
        let cancelled = self
            .reminders
            .cancel_pending(entity_id, reminder_type, Utc::now())
            .await?;
        if cancelled > 0 {
            info!(
                entity_id = %entity_id,
                reminder_type = reminder_type.as_str(),
                cancelled,
                "Reminders cancelled"
            );
        }
        Ok(cancelled)
    }

    pub async fn list_reminders(&self, entity_id: Uuid) -> Result<Vec<ReminderTask>, AppError> {
        self.reminders.find_by_entity(entity_id).await
    }

    /// Fire every pending reminder scheduled at or before `now`.
    ///
    /// Each becomes an inbox notification for the lead's owner, or for the
    /// user who caused the stage change when the lead has no owner. A
    /// reminder is claimed (moved to `sent`) before anything is delivered,
    /// so a cancelled or concurrently dispatched reminder is never fired.
    pub async fn dispatch_due(&self, now: DateTime<Utc>) -> Result<DispatchSummary, AppError> {
        let mut summary = DispatchSummary::default();

        loop {
            let batch = self.reminders.find_due(now, DISPATCH_BATCH).await?;
            if batch.is_empty() {
                break;
            }
            let batch_len = batch.len() as u64;

            for reminder in batch {
                if !self.reminders.mark_sent(reminder.id).await? {
                    debug!(reminder_id = %reminder.id, "Reminder no longer pending, skipping");
                    continue;
                }
                summary.due += 1;
                match self.recipient_of(&reminder).await? {
                    Some(user_id) => {
                        self.notifications
                            .create(&CreateNotification {
                                user_id,
                                category: REMINDER_CATEGORY.to_string(),
                                title: reminder.reminder_type.as_str().to_string(),
                                message: reminder.message.clone(),
                                entity_type: Some(reminder.entity_type.as_str().to_string()),
                                entity_id: Some(reminder.entity_id),
                            })
                            .await?;
                        summary.delivered += 1;
                        debug!(reminder_id = %reminder.id, user_id = %user_id, "Reminder delivered");
                    }
                    None => {
                        summary.orphaned += 1;
                        warn!(
                            reminder_id = %reminder.id,
                            entity_id = %reminder.entity_id,
                            "Reminder has no recipient, closing"
                        );
                    }
                }
            }

            if batch_len < DISPATCH_BATCH {
                break;
            }
        }

        if summary.due > 0 {
            info!(
                due = summary.due,
                delivered = summary.delivered,
                orphaned = summary.orphaned,
                "Reminder dispatch complete"
            );
        }
        Ok(summary)
    }

    async fn recipient_of(&self, reminder: &ReminderTask) -> Result<Option<Uuid>, AppError> {
        let owner = match reminder.entity_type {
            EntityType::Lead => self
                .leads
                .find_by_id(reminder.entity_id)
                .await?
                .and_then(|lead| lead.assigned_to_id),
            EntityType::Deal => None,
        };
        Ok(owner.or(reminder.created_by))
    }
}
