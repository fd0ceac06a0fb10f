//! Commission totals.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crm_entity::commission::{Commission, CommissionStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaboratorTotal {
    pub collaborator_id: Uuid,
    pub total: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommissionStats {
    pub pending: f64,
    pub approved: f64,
    pub paid: f64,
    pub cancelled: f64,
    /// Sum over every status except cancelled.
    pub total: f64,
    /// Number of non-cancelled commissions.
    pub count: u64,
    /// `total / count`, 0 when there are none.
    pub average: f64,
    /// Non-cancelled totals per collaborator, largest first.
    pub by_collaborator: Vec<CollaboratorTotal>,
}

pub fn commission_stats(commissions: &[Commission]) -> CommissionStats {
    let mut stats = CommissionStats::default();
    let mut per_collaborator: HashMap<Uuid, CollaboratorTotal> = HashMap::new();

    for c in commissions {
        match c.status {
            CommissionStatus::Pending => stats.pending += c.amount,
            CommissionStatus::Approved => stats.approved += c.amount,
            CommissionStatus::Paid => stats.paid += c.amount,
            CommissionStatus::Cancelled => {
                stats.cancelled += c.amount;
                continue;
            }
        }
        stats.total += c.amount;
        stats.count += 1;

        let entry = per_collaborator
            .entry(c.collaborator_id)
            .or_insert_with(|| CollaboratorTotal {
                collaborator_id: c.collaborator_id,
                total: 0.0,
                count: 0,
            });
        entry.total += c.amount;
        entry.count += 1;
    }

    if stats.count > 0 {
        stats.average = stats.total / stats.count as f64;
    }

    let mut by_collaborator: Vec<CollaboratorTotal> = per_collaborator.into_values().collect();
    by_collaborator.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then(a.collaborator_id.cmp(&b.collaborator_id))
    });
    stats.by_collaborator = by_collaborator;
    stats
}
