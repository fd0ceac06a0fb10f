//! Integration tests for the lead assignment balancer.

mod helpers;

use std::collections::HashMap;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crm_entity::user::UserRole;

async fn owners(app: &helpers::TestApp, token: &str) -> HashMap<String, usize> {
    let listing = app.request("GET", "/api/leads", None, Some(token)).await;
    let mut counts = HashMap::new();
    for lead in listing.data()["items"].as_array().unwrap() {
        if let Some(owner) = lead["assigned_to_id"].as_str() {
            *counts.entry(owner.to_string()).or_default() += 1;
        }
    }
    counts
}

#[tokio::test]
async fn test_auto_assign_spreads_new_leads() {
    let app = helpers::TestApp::new().await;
    let manager = app.token(UserRole::Manager);
    let ana = app.create_user("Ana", UserRole::Advisor, true).await;
    let ben = app.create_user("Ben", UserRole::Advisor, true).await;
    app.create_user("Carla", UserRole::Advisor, false).await;

    for i in 0..4 {
        app.create_lead(&manager, json!({ "name": format!("Lead {i}") })).await;
    }

    let response = app
        .request("POST", "/api/leads/auto-assign", Some(json!({})), Some(&manager))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["assigned"], 4);
    assert_eq!(response.data()["workers"], 2);

    let counts = owners(&app, &manager).await;
    assert_eq!(counts.get(&ana.to_string()), Some(&2));
    assert_eq!(counts.get(&ben.to_string()), Some(&2));

    let listing = app.request("GET", "/api/leads", None, Some(&manager)).await;
    for lead in listing.data()["items"].as_array().unwrap() {
        assert_eq!(lead["status"], "CONTACTED");
    }

    let second = app
        .request("POST", "/api/leads/auto-assign", Some(json!({})), Some(&manager))
        .await;
    assert_eq!(second.data()["assigned"], 0);
}

#[tokio::test]
async fn test_auto_assign_prefers_least_loaded() {
    let app = helpers::TestApp::new().await;
    let manager = app.token(UserRole::Manager);
    let busy = app.create_user("Busy", UserRole::Advisor, true).await;
    let idle = app.create_user("Idle", UserRole::Advisor, true).await;

    app.create_lead(&manager, json!({ "name": "Existing", "assigned_to_id": busy }))
        .await;
    let fresh = app.create_lead(&manager, json!({ "name": "Fresh" })).await;

    let response = app
        .request(
            "POST",
            "/api/leads/auto-assign",
            Some(json!({ "lead_ids": [fresh] })),
            Some(&manager),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["plan"][0]["worker_id"], idle.to_string());
}

#[tokio::test]
async fn test_auto_assign_unknown_lead_is_not_found() {
    let app = helpers::TestApp::new().await;
    let manager = app.token(UserRole::Manager);
    app.create_user("Ana", UserRole::Advisor, true).await;

    let response = app
        .request(
            "POST",
            "/api/leads/auto-assign",
            Some(json!({ "lead_ids": [Uuid::new_v4()] })),
            Some(&manager),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_auto_assign_without_workers_fails() {
    let app = helpers::TestApp::new().await;
    let manager = app.token(UserRole::Manager);
    app.create_lead(&manager, json!({ "name": "Lonely" })).await;

    let response = app
        .request("POST", "/api/leads/auto-assign", Some(json!({})), Some(&manager))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_advisor_cannot_assign() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/api/leads/auto-assign",
            Some(json!({})),
            Some(&app.token(UserRole::Advisor)),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "POST",
            "/api/leads/redistribute",
            None,
            Some(&app.token(UserRole::Advisor)),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_redistribute_balances_open_leads() {
    let app = helpers::TestApp::new().await;
    let manager = app.token(UserRole::Manager);
    let loaded = app.create_user("Loaded", UserRole::Advisor, true).await;
    let empty = app.create_user("Empty", UserRole::Advisor, true).await;

    for i in 0..5 {
        app.create_lead(
            &manager,
            json!({ "name": format!("Deal {i}"), "assigned_to_id": loaded }),
        )
        .await;
    }

    let response = app
        .request("POST", "/api/leads/redistribute", None, Some(&manager))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["assigned"], 5);

    let counts = owners(&app, &manager).await;
    let a = counts.get(&loaded.to_string()).copied().unwrap_or(0);
    let b = counts.get(&empty.to_string()).copied().unwrap_or(0);
    assert_eq!(a + b, 5);
    assert!(a.abs_diff(b) <= 1);
}
