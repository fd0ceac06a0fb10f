//! Commission records.

use std::sync::Arc;

use tracing::info;

use crm_core::error::AppError;
use crm_core::types::pagination::{PageRequest, PageResponse};
use crm_database::traits::{CommissionStore, LeadStore};
use crm_entity::commission::{Commission, CreateCommission};

use crate::context::RequestContext;

#[derive(Clone)]
pub struct CommissionService {
    commissions: Arc<dyn CommissionStore>,
    leads: Arc<dyn LeadStore>,
}

impl std::fmt::Debug for CommissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommissionService").finish()
    }
}

impl CommissionService {
    pub fn new(commissions: Arc<dyn CommissionStore>, leads: Arc<dyn LeadStore>) -> Self {
        Self { commissions, leads }
    }

    pub async fn create_commission(
        &self,
        ctx: &RequestContext,
        data: CreateCommission,
    ) -> Result<Commission, AppError> {
        if !data.amount.is_finite() || data.amount <= 0.0 {
            return Err(AppError::validation("Commission amount must be positive"));
        }
        if self.leads.find_by_id(data.lead_id).await?.is_none() {
            return Err(AppError::not_found(format!("Lead {} not found", data.lead_id)));
        }

        let commission = self.commissions.create(&data).await?;
        info!(
            commission_id = %commission.id,
            lead_id = %commission.lead_id,
            amount = commission.amount,
            user_id = %ctx.user_id,
            "Commission recorded"
        );
        Ok(commission)
    }

    pub async fn list_commissions(
        &self,
        page: &PageRequest,
    ) -> Result<PageResponse<Commission>, AppError> {
        self.commissions.find_all(page).await
    }
}
