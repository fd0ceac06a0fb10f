//! Stores teaser documents in the teaser bucket.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crm_core::error::{AppError, ErrorKind};
use crm_core::traits::storage::StorageProvider;
use crm_database::traits::LeadStore;

use crate::context::RequestContext;

use super::validate::{effective_mime, sanitize_file_name, validate_with_limit};

/// A stored teaser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeaserUpload {
    pub lead_id: Uuid,
    pub bucket: String,
    /// `{lead_id}/{uuid}-{file name}` inside the bucket.
    pub path: String,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TeaserService {
    storage: Arc<dyn StorageProvider>,
    leads: Arc<dyn LeadStore>,
    bucket: String,
    max_bytes: u64,
}

impl std::fmt::Debug for TeaserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeaserService")
            .field("storage", &self.storage)
            .field("bucket", &self.bucket)
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

impl TeaserService {
    pub fn new(
        storage: Arc<dyn StorageProvider>,
        leads: Arc<dyn LeadStore>,
        bucket: impl Into<String>,
        max_bytes: u64,
    ) -> Self {
        Self {
            storage,
            leads,
            bucket: bucket.into(),
            max_bytes,
        }
    }

    /// Validate and store a teaser for a lead.
    ///
    /// If the bucket does not exist yet it is created and the write is
    /// retried once.
    pub async fn upload_teaser(
        &self,
        ctx: &RequestContext,
        lead_id: Uuid,
        file_name: &str,
        mime_type: &str,
        data: Bytes,
    ) -> Result<TeaserUpload, AppError> {
        let mime_type = effective_mime(file_name, mime_type);
        validate_with_limit(file_name, mime_type, data.len() as u64, self.max_bytes)?;

        if self.leads.find_by_id(lead_id).await?.is_none() {
            return Err(AppError::not_found(format!("Lead {lead_id} not found")));
        }

        let safe_name = sanitize_file_name(file_name);
        let path = format!("{lead_id}/{}-{safe_name}", Uuid::now_v7());

        let stored = match self
            .storage
            .put_object(&self.bucket, &path, data.clone(), mime_type)
            .await
        {
            Err(e) if e.kind == ErrorKind::BucketNotFound => {
                warn!(bucket = %self.bucket, "Teaser bucket missing, creating it");
                self.storage.create_bucket(&self.bucket).await?;
                self.storage
                    .put_object(&self.bucket, &path, data, mime_type)
                    .await?
            }
            other => other?,
        };

        info!(
            lead_id = %lead_id,
            bucket = %stored.bucket,
            path = %stored.path,
            size = stored.size_bytes,
            user_id = %ctx.user_id,
            "Teaser uploaded"
        );

        Ok(TeaserUpload {
            lead_id,
            bucket: stored.bucket,
            path: stored.path,
            file_name: safe_name,
            mime_type: stored.mime_type,
            size_bytes: stored.size_bytes,
            uploaded_by: ctx.user_id.into_uuid(),
            uploaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crm_core::types::id::UserId;
    use crm_database::MemoryStore;
    use crm_entity::lead::{CreateLead, PipelineStage};
    use crm_entity::user::UserRole;
    use crm_storage::LocalStorageProvider;

    use crate::teaser::validate::MAX_TEASER_BYTES;

    async fn setup() -> (tempfile::TempDir, Arc<LocalStorageProvider>, TeaserService, Uuid) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorageProvider::new(dir.path()).await.unwrap());
        let store = Arc::new(MemoryStore::new());
        let lead = LeadStore::create(
            store.as_ref(),
            &CreateLead {
                name: "Industrias Sol".into(),
                company: None,
                email: None,
                score: 70,
                stage: PipelineStage::Qualified,
                probability: 30,
                value: 0.0,
                assigned_to_id: None,
            },
        )
        .await
        .unwrap();
        let svc = TeaserService::new(storage.clone(), store, "teasers", MAX_TEASER_BYTES);
        (dir, storage, svc, lead.id)
    }

    fn ctx() -> RequestContext {
        RequestContext::new(UserId::new(), UserRole::Advisor, "Sara")
    }

    #[tokio::test]
    async fn test_upload_creates_missing_bucket() {
        let (_dir, storage, svc, lead_id) = setup().await;
        assert!(!storage.bucket_exists("teasers").await.unwrap());

        let upload = svc
            .upload_teaser(
                &ctx(),
                lead_id,
                "Teaser Sol.pdf",
                "application/pdf",
                Bytes::from_static(b"%PDF-1.7"),
            )
            .await
            .unwrap();

        assert!(storage.bucket_exists("teasers").await.unwrap());
        assert!(upload.path.starts_with(&format!("{lead_id}/")));
        assert!(upload.path.ends_with("-Teaser_Sol.pdf"));
        let body = storage.get_object("teasers", &upload.path).await.unwrap();
        assert_eq!(&body[..], b"%PDF-1.7");
    }

    #[tokio::test]
    async fn test_rejected_upload_touches_nothing() {
        let (_dir, storage, svc, lead_id) = setup().await;
        let err = svc
            .upload_teaser(&ctx(), lead_id, "photo.png", "image/png", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(!storage.bucket_exists("teasers").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_lead_is_not_found() {
        let (_dir, _storage, svc, _lead_id) = setup().await;
        let err = svc
            .upload_teaser(
                &ctx(),
                Uuid::new_v4(),
                "t.doc",
                "application/msword",
                Bytes::from_static(b"doc"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
