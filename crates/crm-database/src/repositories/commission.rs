//! Commission repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use crm_core::error::{AppError, ErrorKind};
use crm_core::result::AppResult;
use crm_core::types::pagination::{PageRequest, PageResponse};
use crm_entity::commission::{Commission, CommissionStatus, CreateCommission};

use crate::traits::CommissionStore;

#[derive(Debug, Clone)]
pub struct CommissionRepository {
    pool: PgPool,
}

impl CommissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommissionStore for CommissionRepository {
    async fn create(&self, data: &CreateCommission) -> AppResult<Commission> {
        let paid_at = (data.status == CommissionStatus::Paid).then(chrono::Utc::now);
        sqlx::query_as::<_, Commission>(
            "INSERT INTO commissions (lead_id, collaborator_id, amount, status, paid_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.lead_id)
        .bind(data.collaborator_id)
        .bind(data.amount)
        .bind(data.status)
        .bind(paid_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create commission", e))
    }

    async fn list_all(&self) -> AppResult<Vec<Commission>> {
        sqlx::query_as::<_, Commission>("SELECT * FROM commissions ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list commissions", e))
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Commission>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM commissions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count commissions", e))?;

        let rows = sqlx::query_as::<_, Commission>(
            "SELECT * FROM commissions ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list commissions", e))?;

        Ok(PageResponse::new(rows, page, total as u64))
    }
}
