//! User management (workers that receive leads).

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crm_core::error::AppError;
use crm_database::traits::UserStore;
use crm_entity::user::{CreateUser, User};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish()
    }
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn create_user(&self, data: CreateUser) -> Result<User, AppError> {
        if data.full_name.trim().is_empty() {
            return Err(AppError::validation("Full name must not be empty"));
        }
        if !data.email.contains('@') {
            return Err(AppError::validation(format!("Invalid e-mail: '{}'", data.email)));
        }
        let user = self.users.create(&data).await?;
        info!(user_id = %user.id, role = user.role.as_str(), "User created");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.users.find_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crm_core::error::ErrorKind;
    use crm_database::MemoryStore;
    use crm_entity::user::UserRole;

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let svc = UserService::new(Arc::new(MemoryStore::new()));
        let data = CreateUser {
            full_name: "Nuria".into(),
            email: "nuria@example.com".into(),
            role: UserRole::Manager,
            accepts_leads: false,
        };
        let user = svc.create_user(data.clone()).await.unwrap();
        assert_eq!(svc.get_user(user.id).await.unwrap().email, data.email);

        let err = svc.create_user(data).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }
}
