//! Worker runner: polls the queues and executes jobs on a bounded pool.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, watch};
use tokio::time;
use tracing::{error, info, trace, warn};

use crm_core::config::WorkerConfig;
use crm_entity::job::Job;

use crate::executor::{JobExecutionError, JobExecutor};
use crate::queue::JobQueue;

/// How long shutdown waits for in-flight jobs.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct WorkerRunner {
    queue: Arc<JobQueue>,
    executor: Arc<JobExecutor>,
    config: WorkerConfig,
    /// Queues to poll, in priority order.
    queues: Vec<String>,
}

impl WorkerRunner {
    pub fn new(queue: Arc<JobQueue>, executor: Arc<JobExecutor>, config: WorkerConfig) -> Self {
        Self {
            queue,
            executor,
            config,
            queues: vec!["notifications".to_string(), "maintenance".to_string()],
        }
    }

    pub fn with_queues(mut self, queues: Vec<String>) -> Self {
        self.queues = queues;
        self
    }

    /// Run until the cancel signal flips to `true`.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        let concurrency = self.config.concurrency.max(1);
        info!(
            worker_id = self.queue.worker_id(),
            concurrency,
            poll_interval_seconds = self.config.poll_interval_seconds,
            queues = ?self.queues,
            "Worker started"
        );

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let poll_interval = Duration::from_secs(self.config.poll_interval_seconds.max(1));

        loop {
            self.fill_slots(&semaphore).await;

            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!(worker_id = self.queue.worker_id(), "Worker received shutdown signal");
                        break;
                    }
                }
                _ = time::sleep(poll_interval) => {}
            }
        }

        info!(worker_id = self.queue.worker_id(), "Waiting for in-flight jobs");
        let permits = u32::try_from(concurrency).unwrap_or(u32::MAX);
        if time::timeout(DRAIN_TIMEOUT, semaphore.acquire_many(permits))
            .await
            .is_err()
        {
            warn!(worker_id = self.queue.worker_id(), "In-flight jobs did not finish in time");
        }
        info!(worker_id = self.queue.worker_id(), "Worker shut down");
    }

    /// Claim jobs while there are free slots and runnable jobs.
    async fn fill_slots(&self, semaphore: &Arc<Semaphore>) {
        loop {
            let Ok(permit) = semaphore.clone().try_acquire_owned() else {
                trace!("All worker slots occupied");
                return;
            };

            match self.queue.dequeue(&self.queue_refs()).await {
                Ok(Some(job)) => {
                    let queue = Arc::clone(&self.queue);
                    let executor = Arc::clone(&self.executor);
                    tokio::spawn(async move {
                        let _permit = permit;
                        process(&queue, &executor, job).await;
                    });
                }
                Ok(None) => {
                    trace!("No jobs available");
                    return;
                }
                Err(e) => {
                    error!(error = %e, "Failed to dequeue job");
                    return;
                }
            }
        }
    }

    /// Claim and run jobs inline until the queues are empty. Returns the
    /// number of jobs processed. Used by the CLI and tests.
    pub async fn drain(&self) -> usize {
        let mut processed = 0;
        loop {
            match self.queue.dequeue(&self.queue_refs()).await {
                Ok(Some(job)) => {
                    process(&self.queue, &self.executor, job).await;
                    processed += 1;
                }
                Ok(None) => return processed,
                Err(e) => {
                    error!(error = %e, "Failed to dequeue job");
                    return processed;
                }
            }
        }
    }

    fn queue_refs(&self) -> Vec<&str> {
        self.queues.iter().map(String::as_str).collect()
    }
}

/// Execute one claimed job and record its outcome.
async fn process(queue: &JobQueue, executor: &JobExecutor, job: Job) {
    let job_id = job.id;

    match executor.execute(&job).await {
        Ok(result) => match queue.complete(job_id, result.as_ref()).await {
            Ok(()) => info!(job_id = %job_id, job_type = %job.job_type, "Job completed"),
            Err(e) => error!(job_id = %job_id, error = %e, "Failed to mark job completed"),
        },
        Err(JobExecutionError::Transient(msg)) if job.attempts < job.max_attempts => {
            warn!(
                job_id = %job_id,
                attempt = job.attempts,
                max_attempts = job.max_attempts,
                error = %msg,
                "Job failed, will retry"
            );
            if let Err(e) = queue.requeue(job_id, &msg).await {
                error!(job_id = %job_id, error = %e, "Failed to requeue job");
            }
        }
        Err(err) => {
            let msg = err.to_string();
            error!(job_id = %job_id, job_type = %job.job_type, error = %msg, "Job failed");
            if let Err(e) = queue.fail(job_id, &msg).await {
                error!(job_id = %job_id, error = %e, "Failed to mark job failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use serde_json::Value;

    use crm_database::MemoryStore;
    use crm_entity::job::{JobKind, JobPriority, JobStatus};

    use crate::executor::JobHandler;

    #[derive(Debug, Default)]
    struct Flaky {
        calls: AtomicU32,
    }

    #[async_trait]
    impl JobHandler for Flaky {
        fn job_type(&self) -> &str {
            "sla_breach_check"
        }

        async fn execute(&self, _job: &Job) -> Result<Option<Value>, JobExecutionError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(JobExecutionError::Transient("database busy".into()))
            } else {
                Ok(Some(serde_json::json!({"flagged": 0})))
            }
        }
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let queue = Arc::new(JobQueue::new(Arc::new(MemoryStore::new()), "w1"));
        let mut executor = JobExecutor::new();
        let flaky = Arc::new(Flaky::default());
        executor.register(flaky.clone());
        let runner = WorkerRunner::new(queue.clone(), Arc::new(executor), WorkerConfig::default());

        let job = queue
            .enqueue_kind(JobKind::SlaBreachCheck, JobPriority::Normal)
            .await
            .unwrap();

        assert_eq!(runner.drain().await, 2);

        let stored = queue.find(job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Completed);
        assert_eq!(stored.attempts, 2);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_job_type_fails_permanently() {
        let queue = Arc::new(JobQueue::new(Arc::new(MemoryStore::new()), "w1"));
        let runner = WorkerRunner::new(
            queue.clone(),
            Arc::new(JobExecutor::new()),
            WorkerConfig::default(),
        );
        let job = queue
            .enqueue_kind(JobKind::ReminderDispatch, JobPriority::Normal)
            .await
            .unwrap();

        assert_eq!(runner.drain().await, 1);
        let stored = queue.find(job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let queue = Arc::new(JobQueue::new(Arc::new(MemoryStore::new()), "w1"));
        let runner = WorkerRunner::new(queue, Arc::new(JobExecutor::new()), WorkerConfig::default());
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move { runner.run(rx).await });
        tx.send(true).unwrap();
        time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
