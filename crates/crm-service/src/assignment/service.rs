//! Applies assignment plans to the lead table.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crm_core::error::AppError;
use crm_core::types::id::LeadId;
use crm_database::traits::LeadStore;
use crm_entity::lead::{Assignment, LeadStatus};

use crate::context::RequestContext;

use super::planner::{plan_auto_assignment, plan_redistribution};

/// What an assignment run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    /// Leads whose owner was written.
    pub assigned: u64,
    /// Workers that took part in the plan.
    pub workers: usize,
    /// The applied plan.
    pub plan: Vec<Assignment>,
}

/// Distributes leads over assignable users.
#[derive(Clone)]
pub struct AssignmentService {
    leads: Arc<dyn LeadStore>,
}

impl std::fmt::Debug for AssignmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssignmentService").finish()
    }
}

impl AssignmentService {
    pub fn new(leads: Arc<dyn LeadStore>) -> Self {
        Self { leads }
    }

    /// Round-robin leads to the least-loaded workers and mark them
    /// `CONTACTED`.
    ///
    /// With no explicit ids, every unassigned `NEW` lead is taken.
    pub async fn auto_assign_leads(
        &self,
        ctx: &RequestContext,
        lead_ids: Option<Vec<LeadId>>,
    ) -> Result<AssignmentSummary, AppError> {
        let lead_ids = match lead_ids {
            Some(ids) => {
                let uuids: Vec<_> = ids.iter().map(|id| id.into_uuid()).collect();
                let found = self.leads.find_by_ids(&uuids).await?;
                if let Some(missing) = ids
                    .iter()
                    .find(|id| !found.iter().any(|l| l.id == id.into_uuid()))
                {
                    return Err(AppError::not_found(format!("Lead {missing} not found")));
                }
                ids
            }
            None => self
                .leads
                .find_unassigned_new()
                .await?
                .into_iter()
                .map(|l| LeadId::from_uuid(l.id))
                .collect(),
        };

        if lead_ids.is_empty() {
            info!(user_id = %ctx.user_id, "No leads to assign");
            return Ok(AssignmentSummary::default());
        }

        let workers = self.leads.worker_loads().await?;
        let plan = plan_auto_assignment(&workers, &lead_ids)?;
        let assigned = self
            .leads
            .apply_assignments(&plan, Some(LeadStatus::Contacted))
            .await?;

        info!(
            assigned,
            workers = workers.len(),
            user_id = %ctx.user_id,
            "Leads auto-assigned"
        );
        Ok(AssignmentSummary {
            assigned,
            workers: workers.len(),
            plan,
        })
    }

    /// Re-own every open assigned lead so that worker loads differ by at
    /// most one.
    pub async fn redistribute_workload(
        &self,
        ctx: &RequestContext,
    ) -> Result<AssignmentSummary, AppError> {
        let lead_ids: Vec<LeadId> = self
            .leads
            .find_open_assigned()
            .await?
            .into_iter()
            .map(|l| LeadId::from_uuid(l.id))
            .collect();
        let workers = self.leads.worker_loads().await?;

        let plan = {
            let mut rng = rand::thread_rng();
            plan_redistribution(&workers, &lead_ids, &mut rng)?
        };
        let assigned = self.leads.apply_assignments(&plan, None).await?;

        info!(
            assigned,
            workers = workers.len(),
            user_id = %ctx.user_id,
            "Workload redistributed"
        );
        Ok(AssignmentSummary {
            assigned,
            workers: workers.len(),
            plan,
        })
    }
}
