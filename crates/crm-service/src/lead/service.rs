//! Lead CRUD.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crm_core::error::AppError;
use crm_core::types::pagination::{PageRequest, PageResponse};
use crm_database::traits::LeadStore;
use crm_entity::lead::{CreateLead, Lead};
use crm_entity::reminder::EntityType;

use crate::context::RequestContext;
use crate::reminder::ReminderService;

#[derive(Clone)]
pub struct LeadService {
    leads: Arc<dyn LeadStore>,
    reminders: Arc<ReminderService>,
}

impl std::fmt::Debug for LeadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeadService").finish()
    }
}

impl LeadService {
    pub fn new(leads: Arc<dyn LeadStore>, reminders: Arc<ReminderService>) -> Self {
        Self { leads, reminders }
    }

    /// Creates a lead with status `NEW`. A lead that starts in a stage with
    /// a follow-up rule gets that reminder scheduled straight away.
    pub async fn create_lead(
        &self,
        ctx: &RequestContext,
        data: CreateLead,
    ) -> Result<Lead, AppError> {
        if data.name.trim().is_empty() {
            return Err(AppError::validation("Lead name must not be empty"));
        }
        if !(0..=100).contains(&data.score) {
            return Err(AppError::validation("Lead score must be between 0 and 100"));
        }
        if !(0..=100).contains(&data.probability) {
            return Err(AppError::validation(
                "Lead probability must be between 0 and 100",
            ));
        }
        if !data.value.is_finite() || data.value < 0.0 {
            return Err(AppError::validation("Lead value must be a non-negative number"));
        }

        let lead = self.leads.create(&data).await?;
        info!(lead_id = %lead.id, user_id = %ctx.user_id, "Lead created");

        self.reminders
            .on_stage_change(ctx, lead.id, EntityType::Lead, None, lead.stage)
            .await?;
        Ok(lead)
    }

    pub async fn get_lead(&self, lead_id: Uuid) -> Result<Lead, AppError> {
        self.leads
            .find_by_id(lead_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Lead {lead_id} not found")))
    }

    pub async fn list_leads(&self, page: &PageRequest) -> Result<PageResponse<Lead>, AppError> {
        self.leads.find_all(page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crm_core::error::ErrorKind;
    use crm_database::MemoryStore;
    use crm_entity::lead::{LeadStatus, PipelineStage};
    use crm_entity::reminder::ReminderType;

    fn service(store: &Arc<MemoryStore>) -> LeadService {
        let reminders = Arc::new(ReminderService::new(
            store.clone(),
            store.clone(),
            store.clone(),
        ));
        LeadService::new(store.clone(), reminders)
    }

    fn data(name: &str, score: i32) -> CreateLead {
        CreateLead {
            name: name.into(),
            company: Some("Acme".into()),
            email: None,
            score,
            stage: PipelineStage::Lead,
            probability: 5,
            value: 10.0,
            assigned_to_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let svc = service(&Arc::new(MemoryStore::new()));
        let ctx = RequestContext::system();
        let lead = svc.create_lead(&ctx, data("Acme", 40)).await.unwrap();
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(svc.get_lead(lead.id).await.unwrap().name, "Acme");
        assert_eq!(
            svc.list_leads(&PageRequest::default()).await.unwrap().total_items,
            1
        );
    }

    #[tokio::test]
    async fn test_lead_created_in_proposal_gets_reminder() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let mut input = data("Acme", 60);
        input.stage = PipelineStage::Proposal;

        let lead = svc
            .create_lead(&RequestContext::system(), input)
            .await
            .unwrap();
        let reminders = svc.reminders.list_reminders(lead.id).await.unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].reminder_type, ReminderType::ProposalFollowUp);

        let plain = svc
            .create_lead(&RequestContext::system(), data("Beta", 10))
            .await
            .unwrap();
        assert!(svc.reminders.list_reminders(plain.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_score() {
        let svc = service(&Arc::new(MemoryStore::new()));
        let err = svc
            .create_lead(&RequestContext::system(), data("Acme", 101))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = svc.get_lead(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
