//! Integration tests for tasks, SLA policies and dependencies.

mod helpers;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crm_entity::user::UserRole;

fn parse_time(value: &serde_json::Value) -> DateTime<Utc> {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("not a timestamp")
}

#[tokio::test]
async fn test_task_due_date_follows_sla_policy() {
    let app = helpers::TestApp::new().await;
    let token = app.token(UserRole::Advisor);
    let lead_id = app.create_lead(&token, json!({ "name": "Acme" })).await;

    let before = Utc::now();
    let task_id = app.create_task(&token, lead_id, json!({})).await;

    let response = app
        .request("GET", &format!("/api/tasks/{task_id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let task = response.data();
    assert_eq!(task["status"], "open");
    assert_eq!(task["sla_hours"], 24);
    assert_eq!(task["sla_breached"], false);

    let due = parse_time(&task["due_date"]);
    assert!(due >= before + Duration::hours(24));
    assert!(due <= Utc::now() + Duration::hours(24));
}

#[tokio::test]
async fn test_updated_sla_policy_applies_to_new_tasks() {
    let app = helpers::TestApp::new().await;
    let manager = app.token(UserRole::Manager);
    let advisor = app.token(UserRole::Advisor);

    let response = app
        .request(
            "PUT",
            "/api/sla-policies/valuation",
            Some(json!({ "default_sla_hours": 10 })),
            Some(&advisor),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "PUT",
            "/api/sla-policies/valuation",
            Some(json!({ "default_sla_hours": 10 })),
            Some(&manager),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["default_sla_hours"], 10);

    let lead_id = app.create_lead(&manager, json!({ "name": "Valuation Co" })).await;
    let task_id = app
        .create_task(&manager, lead_id, json!({ "task_type": "valuation", "title": "Value it" }))
        .await;
    let task = app
        .request("GET", &format!("/api/tasks/{task_id}"), None, Some(&manager))
        .await;
    assert_eq!(task.data()["sla_hours"], 10);
}

#[tokio::test]
async fn test_unknown_task_type_in_policy_path_is_rejected() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request(
            "PUT",
            "/api/sla-policies/coffee",
            Some(json!({ "default_sla_hours": 5 })),
            Some(&app.token(UserRole::Admin)),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dependencies_gate_can_start() {
    let app = helpers::TestApp::new().await;
    let token = app.token(UserRole::Advisor);
    let lead_id = app.create_lead(&token, json!({ "name": "Gate" })).await;

    let first = app.create_task(&token, lead_id, json!({ "title": "First" })).await;
    let second = app
        .create_task(&token, lead_id, json!({ "title": "Second", "dependencies": [first] }))
        .await;

    let listing = app
        .request("GET", &format!("/api/leads/{lead_id}/tasks"), None, Some(&token))
        .await;
    assert_eq!(listing.status, StatusCode::OK);
    let blocked = listing
        .data()
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == second.to_string())
        .unwrap()
        .clone();
    assert_eq!(blocked["can_start"], false);
    assert_eq!(blocked["dependency_status"][first.to_string()], "open");

    let done = app
        .request("POST", &format!("/api/tasks/{first}/complete"), None, Some(&token))
        .await;
    assert_eq!(done.status, StatusCode::OK);
    assert_eq!(done.data()["status"], "done");
    assert!(!done.data()["completed_at"].is_null());

    let listing = app
        .request("GET", &format!("/api/leads/{lead_id}/tasks"), None, Some(&token))
        .await;
    let unblocked = listing
        .data()
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == second.to_string())
        .unwrap()
        .clone();
    assert_eq!(unblocked["can_start"], true);
}

#[tokio::test]
async fn test_dependency_cycles_and_bad_ids_are_rejected() {
    let app = helpers::TestApp::new().await;
    let token = app.token(UserRole::Advisor);
    let lead_id = app.create_lead(&token, json!({ "name": "Cycle" })).await;

    let a = app.create_task(&token, lead_id, json!({ "title": "A" })).await;
    let b = app
        .create_task(&token, lead_id, json!({ "title": "B", "dependencies": [a] }))
        .await;

    let cycle = app
        .request(
            "PUT",
            &format!("/api/tasks/{a}/dependencies"),
            Some(json!({ "dependencies": [b] })),
            Some(&token),
        )
        .await;
    assert_eq!(cycle.status, StatusCode::CONFLICT);

    let itself = app
        .request(
            "PUT",
            &format!("/api/tasks/{a}/dependencies"),
            Some(json!({ "dependencies": [a] })),
            Some(&token),
        )
        .await;
    assert_eq!(itself.status, StatusCode::BAD_REQUEST);

    let unknown = app
        .request(
            "PUT",
            &format!("/api/tasks/{a}/dependencies"),
            Some(json!({ "dependencies": [uuid::Uuid::new_v4()] })),
            Some(&token),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);

    let cleared = app
        .request(
            "PUT",
            &format!("/api/tasks/{b}/dependencies"),
            Some(json!({ "dependencies": [] })),
            Some(&token),
        )
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.data()["dependencies"], json!([]));
}

#[tokio::test]
async fn test_snooze_then_reopen() {
    let app = helpers::TestApp::new().await;
    let token = app.token(UserRole::Advisor);
    let lead_id = app.create_lead(&token, json!({ "name": "Snoozy" })).await;
    let task_id = app.create_task(&token, lead_id, json!({})).await;

    let zero = app
        .request(
            "POST",
            &format!("/api/tasks/{task_id}/snooze"),
            Some(json!({ "days": 0 })),
            Some(&token),
        )
        .await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);

    let snoozed = app
        .request(
            "POST",
            &format!("/api/tasks/{task_id}/snooze"),
            Some(json!({ "days": 3 })),
            Some(&token),
        )
        .await;
    assert_eq!(snoozed.status, StatusCode::OK);
    assert_eq!(snoozed.data()["status"], "snoozed");
    let due = parse_time(&snoozed.data()["due_date"]);
    assert!(due > Utc::now() + Duration::days(2));
    assert!(snoozed.data()["completed_at"].is_null());

    let reopened = app
        .request("POST", &format!("/api/tasks/{task_id}/reopen"), None, Some(&token))
        .await;
    assert_eq!(reopened.status, StatusCode::OK);
    assert_eq!(reopened.data()["status"], "open");
}

#[tokio::test]
async fn test_task_on_unknown_lead_is_not_found() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/api/tasks",
            Some(json!({
                "lead_id": uuid::Uuid::new_v4(),
                "task_type": "call",
                "title": "Orphan",
            })),
            Some(&app.token(UserRole::Advisor)),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_sla_breach_check_flags_overdue_tasks_once() {
    let app = helpers::TestApp::new().await;
    let token = app.token(UserRole::Advisor);
    let lead_id = app.create_lead(&token, json!({ "name": "Late" })).await;
    let overdue = app
        .create_task(
            &token,
            lead_id,
            json!({ "due_date": Utc::now() - Duration::hours(2) }),
        )
        .await;
    app.create_task(&token, lead_id, json!({ "title": "On time" })).await;

    let flagged = app
        .state
        .services
        .tasks
        .mark_sla_breaches(Utc::now())
        .await
        .unwrap();
    assert_eq!(flagged, 1);

    let again = app
        .state
        .services
        .tasks
        .mark_sla_breaches(Utc::now())
        .await
        .unwrap();
    assert_eq!(again, 0);

    let task = app
        .request("GET", &format!("/api/tasks/{overdue}"), None, Some(&token))
        .await;
    assert_eq!(task.data()["sla_breached"], true);
}
