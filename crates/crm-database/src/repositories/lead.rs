//! Lead repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crm_core::error::{AppError, ErrorKind};
use crm_core::result::AppResult;
use crm_core::types::id::UserId;
use crm_core::types::pagination::{PageRequest, PageResponse};
use crm_entity::lead::{Assignment, CreateLead, Lead, LeadStatus, PipelineStage, WorkerLoad};

use crate::traits::LeadStore;

const OPEN_STATUSES: &str = "('NEW', 'CONTACTED', 'QUALIFIED')";

/// Repository for leads and assignment workload.
#[derive(Debug, Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    /// Create a new lead repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for LeadRepository {
    async fn create(&self, data: &CreateLead) -> AppResult<Lead> {
        sqlx::query_as::<_, Lead>(
            "INSERT INTO leads (name, company, email, score, stage, probability, value, assigned_to_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.company)
        .bind(&data.email)
        .bind(data.score)
        .bind(data.stage)
        .bind(data.probability)
        .bind(data.value)
        .bind(data.assigned_to_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create lead", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Lead>> {
        sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find lead", e))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Lead>> {
        sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = ANY($1) ORDER BY created_at ASC")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load leads", e))
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Lead>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leads")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count leads", e))?;

        let leads = sqlx::query_as::<_, Lead>(
            "SELECT * FROM leads ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list leads", e))?;

        Ok(PageResponse::new(leads, page, total as u64))
    }

    async fn list_all(&self) -> AppResult<Vec<Lead>> {
        sqlx::query_as::<_, Lead>("SELECT * FROM leads ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list leads", e))
    }

    async fn find_open_with_min_score(&self, min_score: i32) -> AppResult<Vec<Lead>> {
        sqlx::query_as::<_, Lead>(&format!(
            "SELECT * FROM leads WHERE status IN {OPEN_STATUSES} AND score >= $1 ORDER BY score DESC"
        ))
        .bind(min_score)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query high-score leads", e))
    }

    async fn find_in_stage_with_min_probability(
        &self,
        stage: PipelineStage,
        min_probability: i32,
    ) -> AppResult<Vec<Lead>> {
        sqlx::query_as::<_, Lead>(
            "SELECT * FROM leads WHERE stage = $1 AND probability >= $2 ORDER BY probability DESC",
        )
        .bind(stage)
        .bind(min_probability)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query leads by stage", e))
    }

    async fn find_unassigned_new(&self) -> AppResult<Vec<Lead>> {
        sqlx::query_as::<_, Lead>(
            "SELECT * FROM leads WHERE status = 'NEW' AND assigned_to_id IS NULL ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query unassigned leads", e))
    }

    async fn find_open_assigned(&self) -> AppResult<Vec<Lead>> {
        sqlx::query_as::<_, Lead>(&format!(
            "SELECT * FROM leads WHERE status IN {OPEN_STATUSES} AND assigned_to_id IS NOT NULL \
             ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query assigned leads", e))
    }

    async fn update_stage(&self, id: Uuid, stage: PipelineStage) -> AppResult<Lead> {
        sqlx::query_as::<_, Lead>(
            "UPDATE leads SET stage = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(stage)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update lead stage", e))?
        .ok_or_else(|| AppError::not_found(format!("Lead {id} not found")))
    }

    async fn worker_loads(&self) -> AppResult<Vec<WorkerLoad>> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(&format!(
            "SELECT u.id, COUNT(l.id) FROM users u \
             LEFT JOIN leads l ON l.assigned_to_id = u.id AND l.status IN {OPEN_STATUSES} \
             WHERE u.is_active AND u.accepts_leads \
             GROUP BY u.id ORDER BY u.id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load worker loads", e))?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| WorkerLoad::new(UserId::from_uuid(id), count.max(0) as u32))
            .collect())
    }

    async fn apply_assignments(
        &self,
        plan: &[Assignment],
        status: Option<LeadStatus>,
    ) -> AppResult<u64> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut updated = 0u64;
        for assignment in plan {
            let result = sqlx::query(
                "UPDATE leads SET assigned_to_id = $2, status = COALESCE($3, status), updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(assignment.lead_id.into_uuid())
            .bind(assignment.worker_id.into_uuid())
            .bind(status)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to assign lead", e))?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls every previous update back.
                return Err(AppError::not_found(format!(
                    "Lead {} not found",
                    assignment.lead_id
                )));
            }
            updated += result.rows_affected();
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit assignments", e)
        })?;

        debug!(updated, "Applied assignment plan");
        Ok(updated)
    }
}
