//! Shared test helpers for integration tests.
//!
//! The app runs against the in-memory stores and a temporary teaser
//! directory, so no database is required.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use crm_api::{AppState, build_app};
use crm_core::config::AppConfig;
use crm_database::{MemoryStore, Stores};
use crm_entity::user::{CreateUser, UserRole};
use crm_service::LogEmailSender;
use crm_storage::LocalStorageProvider;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for driving services directly
    pub state: AppState,
    /// Backing store
    pub store: Arc<MemoryStore>,
    /// Teaser storage root, removed on drop
    pub storage_dir: TempDir,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let storage_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = AppConfig::from_toml(&format!(
            r#"
            [database]
            url = "postgres://unused/test"

            [auth]
            jwt_secret = "integration-test-secret"

            [storage]
            root_path = "{}"
            max_teaser_bytes = 1048576
            "#,
            storage_dir.path().display()
        ))
        .expect("Failed to parse test config");

        let storage = Arc::new(
            LocalStorageProvider::new(storage_dir.path())
                .await
                .expect("Failed to init storage"),
        );
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(
            config,
            Stores::memory(Arc::clone(&store)),
            storage,
            Arc::new(LogEmailSender),
        );

        Self {
            router: build_app(state.clone()),
            state,
            store,
            storage_dir,
        }
    }

    /// Mint a token for a user id that need not exist in the store.
    pub fn token_for(&self, user_id: Uuid, role: UserRole) -> String {
        self.state
            .jwt_encoder
            .generate_access_token(user_id, role, "Test User")
            .expect("Failed to mint token")
            .0
    }

    /// Token for a fresh, unstored user with the given role.
    pub fn token(&self, role: UserRole) -> String {
        self.token_for(Uuid::new_v4(), role)
    }

    /// Create a stored user and return their ID
    pub async fn create_user(&self, name: &str, role: UserRole, accepts_leads: bool) -> Uuid {
        self.state
            .services
            .users
            .create_user(CreateUser {
                full_name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
                role,
                accepts_leads,
            })
            .await
            .expect("Failed to create test user")
            .id
    }

    /// Create a lead through the API and return its ID
    pub async fn create_lead(&self, token: &str, body: Value) -> Uuid {
        let response = self.request("POST", "/api/leads", Some(body), Some(token)).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.id()
    }

    /// Create a task through the API and return its ID
    pub async fn create_task(&self, token: &str, lead_id: Uuid, extra: Value) -> Uuid {
        let mut body = json!({
            "lead_id": lead_id,
            "task_type": "call",
            "title": "Call the seller",
        });
        if let (Some(target), Value::Object(extra)) = (body.as_object_mut(), extra) {
            target.extend(extra);
        }
        let response = self.request("POST", "/api/tasks", Some(body), Some(token)).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.id()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Send a prebuilt request
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 4 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` payload of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// `data.id` parsed as a UUID.
    pub fn id(&self) -> Uuid {
        self.data()["id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("Response has no data.id")
    }
}
