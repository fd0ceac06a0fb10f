//! Dependency list validation and cycle detection.
//!
//! The graph is walked lazily through the task store: starting from the
//! proposed dependencies, every reachable task is loaded one frontier at a
//! time. Reaching the task being edited means the edit would close a cycle.

use std::collections::{BTreeMap, HashSet};

use uuid::Uuid;

use crm_core::error::AppError;
use crm_core::result::AppResult;
use crm_database::traits::TaskStore;
use crm_entity::task::{Task, TaskStatus, TaskWithDependencies};

/// Drop duplicate ids, keeping first-seen order.
pub fn normalize(dependencies: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    dependencies
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Check that every dependency exists and, when `task_id` is given, that
/// the list neither references the task itself nor closes a cycle.
pub async fn validate(
    store: &dyn TaskStore,
    task_id: Option<Uuid>,
    dependencies: &[Uuid],
) -> AppResult<()> {
    if dependencies.is_empty() {
        return Ok(());
    }

    if let Some(id) = task_id {
        if dependencies.contains(&id) {
            return Err(AppError::validation("A task cannot depend on itself"));
        }
    }

    let found: HashSet<Uuid> = store
        .find_by_ids(dependencies)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();
    let missing: Vec<String> = dependencies
        .iter()
        .filter(|id| !found.contains(id))
        .map(Uuid::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::validation(format!(
            "Unknown dependency task(s): {}",
            missing.join(", ")
        )));
    }

    match task_id {
        Some(id) if reaches(store, dependencies, id).await? => Err(AppError::conflict(
            "Dependency would create a cycle in the task graph",
        )),
        _ => Ok(()),
    }
}

/// Whether `target` is reachable from any of `start` by following
/// dependency edges.
pub async fn reaches(store: &dyn TaskStore, start: &[Uuid], target: Uuid) -> AppResult<bool> {
    let mut visited: HashSet<Uuid> = HashSet::new();
    let mut frontier: Vec<Uuid> = start.to_vec();

    while !frontier.is_empty() {
        if frontier.contains(&target) {
            return Ok(true);
        }
        frontier.retain(|id| visited.insert(*id));
        if frontier.is_empty() {
            break;
        }
        frontier = store
            .find_by_ids(&frontier)
            .await?
            .into_iter()
            .flat_map(|task| task.dependencies)
            .filter(|id| !visited.contains(id))
            .collect();
    }
    Ok(false)
}

/// Attach `can_start` and `dependency_status` to each task.
///
/// Dependencies are looked up in `tasks` first, then in `external`
/// (dependencies that live on other leads).
pub fn resolve_all(tasks: Vec<Task>, external: &[Task]) -> Vec<TaskWithDependencies> {
    let statuses: BTreeMap<Uuid, TaskStatus> = tasks
        .iter()
        .chain(external.iter())
        .map(|t| (t.id, t.status))
        .collect();

    tasks
        .into_iter()
        .map(|task| TaskWithDependencies::resolve(task, &statuses))
        .collect()
}
