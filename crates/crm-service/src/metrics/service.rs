//! Loads rows and computes the aggregation views.

use std::sync::Arc;

use crm_core::error::AppError;
use crm_database::traits::{CommissionStore, LeadStore};

use super::commission::{CommissionStats, commission_stats};
use super::kanban::{KanbanStats, kanban_stats};

#[derive(Clone)]
pub struct MetricsService {
    leads: Arc<dyn LeadStore>,
    commissions: Arc<dyn CommissionStore>,
}

impl std::fmt::Debug for MetricsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsService").finish()
    }
}

impl MetricsService {
    pub fn new(leads: Arc<dyn LeadStore>, commissions: Arc<dyn CommissionStore>) -> Self {
        Self { leads, commissions }
    }

    pub async fn kanban(&self) -> Result<KanbanStats, AppError> {
        let leads = self.leads.list_all().await?;
        Ok(kanban_stats(&leads))
    }

    pub async fn commissions(&self) -> Result<CommissionStats, AppError> {
        let commissions = self.commissions.list_all().await?;
        Ok(commission_stats(&commissions))
    }
}
