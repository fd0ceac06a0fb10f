//! Integration tests for the automated notification rules and the inbox.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use crm_entity::user::UserRole;

#[tokio::test]
async fn test_rules_are_seeded() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request("GET", "/api/notification-rules", None, Some(&app.token(UserRole::Advisor)))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data().as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_high_score_lead_notifies_owner_once_per_window() {
    let app = helpers::TestApp::new().await;
    let manager = app.token(UserRole::Manager);
    let owner = app.create_user("Scout", UserRole::Advisor, true).await;
    let owner_token = app.token_for(owner, UserRole::Advisor);

    app.create_lead(
        &manager,
        json!({ "name": "Star", "score": 95, "assigned_to_id": owner }),
    )
    .await;
    app.create_lead(
        &manager,
        json!({ "name": "Meh", "score": 40, "assigned_to_id": owner }),
    )
    .await;

    let first = app
        .request("POST", "/api/notification-rules/trigger", None, Some(&manager))
        .await;
    assert_eq!(first.status, StatusCode::OK, "{:?}", first.body);
    assert_eq!(first.data()["rules_evaluated"], 3);
    assert_eq!(first.data()["matches"], 1);
    assert_eq!(first.data()["delivered"], 1);

    let second = app
        .request("POST", "/api/notification-rules/trigger", None, Some(&manager))
        .await;
    assert_eq!(second.data()["matches"], 1);
    assert_eq!(second.data()["deduplicated"], 1);
    assert_eq!(second.data()["delivered"], 0);

    let inbox = app
        .request("GET", "/api/notifications", None, Some(&owner_token))
        .await;
    let items = inbox.data()["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["category"], "rule:high_score_lead");
    assert!(items[0]["message"].as_str().unwrap().contains("Star"));

    let logs = app
        .request("GET", "/api/notification-logs", None, Some(&manager))
        .await;
    assert_eq!(logs.status, StatusCode::OK);
    assert_eq!(logs.data()["total_items"], 1);
}

#[tokio::test]
async fn test_inactive_rule_is_skipped() {
    let app = helpers::TestApp::new().await;
    let manager = app.token(UserRole::Manager);
    let owner = app.create_user("Closer", UserRole::Advisor, true).await;
    app.create_lead(
        &manager,
        json!({
            "name": "Almost",
            "stage": "negotiation",
            "probability": 85,
            "assigned_to_id": owner,
        }),
    )
    .await;

    let toggled = app
        .request(
            "PUT",
            "/api/notification-rules/high_prob_negotiation/active",
            Some(json!({ "is_active": false })),
            Some(&manager),
        )
        .await;
    assert_eq!(toggled.status, StatusCode::OK);
    assert_eq!(toggled.data()["is_active"], false);

    let summary = app
        .request("POST", "/api/notification-rules/trigger", None, Some(&manager))
        .await;
    assert_eq!(summary.data()["rules_evaluated"], 2);
    assert_eq!(summary.data()["delivered"], 0);
}

#[tokio::test]
async fn test_threshold_update_changes_matches() {
    let app = helpers::TestApp::new().await;
    let admin = app.token(UserRole::Admin);
    let owner = app.create_user("Tuner", UserRole::Advisor, true).await;
    app.create_lead(
        &admin,
        json!({ "name": "Warm", "score": 60, "assigned_to_id": owner }),
    )
    .await;

    let invalid = app
        .request(
            "PUT",
            "/api/notification-rules/high_score_lead/config",
            Some(json!({ "message": "Lead {name}", "threshold": 150 })),
            Some(&admin),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let updated = app
        .request(
            "PUT",
            "/api/notification-rules/high_score_lead/config",
            Some(json!({ "message": "Lead {name} is warming up", "threshold": 50 })),
            Some(&admin),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["notification_config"]["threshold"], 50);

    let summary = app
        .request("POST", "/api/notification-rules/trigger", None, Some(&admin))
        .await;
    assert_eq!(summary.data()["delivered"], 1);
}

#[tokio::test]
async fn test_advisor_cannot_manage_rules() {
    let app = helpers::TestApp::new().await;
    let advisor = app.token(UserRole::Advisor);

    let toggle = app
        .request(
            "PUT",
            "/api/notification-rules/task_reminder/active",
            Some(json!({ "is_active": false })),
            Some(&advisor),
        )
        .await;
    assert_eq!(toggle.status, StatusCode::FORBIDDEN);

    let trigger = app
        .request("POST", "/api/notification-rules/trigger", None, Some(&advisor))
        .await;
    assert_eq!(trigger.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_mark_all_read_clears_unread_count() {
    let app = helpers::TestApp::new().await;
    let manager = app.token(UserRole::Manager);
    let owner = app.create_user("Reader", UserRole::Advisor, true).await;
    let owner_token = app.token_for(owner, UserRole::Advisor);

    for name in ["One", "Two"] {
        app.create_lead(
            &manager,
            json!({ "name": name, "score": 99, "assigned_to_id": owner }),
        )
        .await;
    }
    app.request("POST", "/api/notification-rules/trigger", None, Some(&manager))
        .await;

    let unread = app
        .request("GET", "/api/notifications/unread-count", None, Some(&owner_token))
        .await;
    assert_eq!(unread.data()["count"], 2);

    let inbox = app
        .request("GET", "/api/notifications", None, Some(&owner_token))
        .await;
    let first_id = inbox.data()["items"][0]["id"].as_str().unwrap().to_string();

    let stranger = app.token(UserRole::Advisor);
    let foreign = app
        .request(
            "PUT",
            &format!("/api/notifications/{first_id}/read"),
            None,
            Some(&stranger),
        )
        .await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let cleared = app
        .request("PUT", "/api/notifications/read-all", None, Some(&owner_token))
        .await;
    assert_eq!(cleared.data()["count"], 2);

    let unread = app
        .request("GET", "/api/notifications/unread-count", None, Some(&owner_token))
        .await;
    assert_eq!(unread.data()["count"], 0);
}
