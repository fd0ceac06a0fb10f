//! Pure assignment planning over explicit value types.

use rand::Rng;
use rand::seq::SliceRandom;

use crm_core::error::AppError;
use crm_core::types::id::LeadId;
use crm_entity::lead::{Assignment, WorkerLoad};

/// Round-robin `leads` over `workers`, least-loaded first.
///
/// Workers are stable-sorted by current open-lead count (ties broken by
/// id) and lead `i` goes to `sorted[i % n]`.
pub fn plan_auto_assignment(
    workers: &[WorkerLoad],
    leads: &[LeadId],
) -> Result<Vec<Assignment>, AppError> {
    if workers.is_empty() {
        return Err(AppError::validation("No workers available for assignment"));
    }

    let mut sorted = workers.to_vec();
    sorted.sort_by_key(|w| (w.open_leads, w.worker_id));

    Ok(leads
        .iter()
        .enumerate()
        .map(|(i, lead_id)| Assignment {
            lead_id: *lead_id,
            worker_id: sorted[i % sorted.len()].worker_id,
        })
        .collect())
}

/// Split `leads` evenly over `workers`.
///
/// Every worker receives `total / n` leads; after a random shuffle of the
/// workers, the first `total % n` of them receive one extra. Leads are
/// dealt in order, filling each worker's quota before moving on.
pub fn plan_redistribution<R: Rng + ?Sized>(
    workers: &[WorkerLoad],
    leads: &[LeadId],
    rng: &mut R,
) -> Result<Vec<Assignment>, AppError> {
    if workers.is_empty() {
        return Err(AppError::validation("No workers available for redistribution"));
    }

    let mut shuffled = workers.to_vec();
    shuffled.sort_by_key(|w| w.worker_id);
    shuffled.shuffle(rng);

    let n = shuffled.len();
    let base = leads.len() / n;
    let remainder = leads.len() % n;

    let mut plan = Vec::with_capacity(leads.len());
    let mut remaining = leads.iter();
    for (i, worker) in shuffled.iter().enumerate() {
        let quota = if i < remainder { base + 1 } else { base };
        plan.extend(remaining.by_ref().take(quota).map(|lead_id| Assignment {
            lead_id: *lead_id,
            worker_id: worker.worker_id,
        }));
    }
    Ok(plan)
}
