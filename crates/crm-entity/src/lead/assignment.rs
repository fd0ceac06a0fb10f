//! Value types consumed and produced by the lead balancer.

use serde::{Deserialize, Serialize};

use crm_core::types::{LeadId, UserId};

/// An assignable worker and the number of open leads they currently own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerLoad {
    /// The worker.
    pub worker_id: UserId,
    /// Open leads currently assigned to the worker.
    pub open_leads: u32,
}

impl WorkerLoad {
    pub fn new(worker_id: UserId, open_leads: u32) -> Self {
        Self {
            worker_id,
            open_leads,
        }
    }
}

/// One line of an assignment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Lead being (re)assigned.
    pub lead_id: LeadId,
    /// New owner.
    pub worker_id: UserId,
}
