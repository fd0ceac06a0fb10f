//! Job queue over the `jobs` table.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crm_core::error::AppError;
use crm_core::types::pagination::{PageRequest, PageResponse};
use crm_database::traits::JobStore;
use crm_entity::job::{CreateJob, Job, JobKind, JobPriority};

/// Enqueues and claims background jobs.
#[derive(Clone)]
pub struct JobQueue {
    store: Arc<dyn JobStore>,
    /// Identifier written to `jobs.worker_id` on claim.
    worker_id: String,
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQueue")
            .field("worker_id", &self.worker_id)
            .finish()
    }
}

impl JobQueue {
    pub fn new(store: Arc<dyn JobStore>, worker_id: impl Into<String>) -> Self {
        Self {
            store,
            worker_id: worker_id.into(),
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Enqueue a new job.
    pub async fn enqueue(&self, params: &CreateJob) -> Result<Job, AppError> {
        let job = self.store.create(params).await?;
        debug!(
            job_id = %job.id,
            job_type = %job.job_type,
            queue = %job.queue,
            priority = job.priority.as_str(),
            "Enqueued job"
        );
        Ok(job)
    }

    /// Enqueue an immediate job of a known kind.
    pub async fn enqueue_kind(&self, kind: JobKind, priority: JobPriority) -> Result<Job, AppError> {
        self.enqueue(&CreateJob::for_kind(kind, priority)).await
    }

    /// Claim the next job from the first non-empty queue, in order.
    pub async fn dequeue(&self, queues: &[&str]) -> Result<Option<Job>, AppError> {
        for queue in queues {
            if let Some(job) = self.store.dequeue(queue, &self.worker_id).await? {
                debug!(job_id = %job.id, job_type = %job.job_type, queue, "Dequeued job");
                return Ok(Some(job));
            }
        }
        Ok(None)
    }

    pub async fn complete(
        &self,
        job_id: Uuid,
        result: Option<&serde_json::Value>,
    ) -> Result<(), AppError> {
        self.store.complete(job_id, result).await
    }

    pub async fn fail(&self, job_id: Uuid, error: &str) -> Result<(), AppError> {
        self.store.fail(job_id, error).await
    }

    /// Record a failed attempt and put the job back to pending.
    pub async fn requeue(&self, job_id: Uuid, error: &str) -> Result<(), AppError> {
        self.store.fail(job_id, error).await?;
        self.store.retry(job_id).await
    }

    pub async fn find(&self, job_id: Uuid) -> Result<Option<Job>, AppError> {
        self.store.find_by_id(job_id).await
    }

    /// Page through jobs, newest first.
    pub async fn list(&self, page: &PageRequest) -> Result<PageResponse<Job>, AppError> {
        self.store.find_all(page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crm_database::MemoryStore;
    use crm_entity::job::JobStatus;

    #[tokio::test]
    async fn test_dequeue_walks_queues_in_order() {
        let queue = JobQueue::new(Arc::new(MemoryStore::new()), "w1");
        let maintenance = queue
            .enqueue_kind(JobKind::SlaBreachCheck, JobPriority::Critical)
            .await
            .unwrap();
        let notification = queue
            .enqueue_kind(JobKind::ReminderDispatch, JobPriority::Low)
            .await
            .unwrap();

        let first = queue
            .dequeue(&["notifications", "maintenance"])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.id, notification.id);
        assert_eq!(first.worker_id.as_deref(), Some("w1"));

        let second = queue
            .dequeue(&["notifications", "maintenance"])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.id, maintenance.id);
        assert!(queue.dequeue(&["notifications"]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_requeue_returns_job_to_pending() {
        let queue = JobQueue::new(Arc::new(MemoryStore::new()), "w1");
        let job = queue
            .enqueue_kind(JobKind::MaintenanceCleanup, JobPriority::Normal)
            .await
            .unwrap();
        queue.dequeue(&["maintenance"]).await.unwrap().unwrap();

        queue.requeue(job.id, "db timeout").await.unwrap();

        let stored = queue.find(job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Pending);
        assert_eq!(stored.attempts, 1);
        assert_eq!(stored.error_message.as_deref(), Some("db timeout"));
    }
}
