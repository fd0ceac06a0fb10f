//! Integration tests for stage-change reminders and their dispatch.

mod helpers;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crm_entity::user::UserRole;

#[tokio::test]
async fn test_entering_nda_schedules_follow_up() {
    let app = helpers::TestApp::new().await;
    let token = app.token(UserRole::Advisor);
    let lead_id = app.create_lead(&token, json!({ "name": "Target" })).await;

    let before = Utc::now();
    let response = app
        .request(
            "PUT",
            &format!("/api/leads/{lead_id}/stage"),
            Some(json!({ "stage": "nda" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["lead"]["stage"], "nda");

    let reminder = &response.data()["reminder"];
    assert_eq!(reminder["reminder_type"], "NDA_FOLLOW_UP");
    assert_eq!(reminder["status"], "pending");
    let scheduled: DateTime<Utc> = reminder["scheduled_for"].as_str().unwrap().parse().unwrap();
    assert!(scheduled >= before + Duration::hours(48));

    let same = app
        .request(
            "PUT",
            &format!("/api/leads/{lead_id}/stage"),
            Some(json!({ "stage": "nda" })),
            Some(&token),
        )
        .await;
    assert_eq!(same.status, StatusCode::OK);
    assert!(same.data()["reminder"].is_null());

    let listing = app
        .request("GET", &format!("/api/leads/{lead_id}/reminders"), None, Some(&token))
        .await;
    assert_eq!(listing.data().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_stage_without_rule_schedules_nothing() {
    let app = helpers::TestApp::new().await;
    let token = app.token(UserRole::Advisor);
    let lead_id = app.create_lead(&token, json!({ "name": "Quiet" })).await;

    let response = app
        .request(
            "PUT",
            &format!("/api/leads/{lead_id}/stage"),
            Some(json!({ "stage": "qualified" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.data()["reminder"].is_null());
}

#[tokio::test]
async fn test_lead_created_in_negotiation_gets_reminder() {
    let app = helpers::TestApp::new().await;
    let token = app.token(UserRole::Advisor);
    let lead_id = app
        .create_lead(&token, json!({ "name": "Hot", "stage": "negotiation" }))
        .await;

    let listing = app
        .request("GET", &format!("/api/leads/{lead_id}/reminders"), None, Some(&token))
        .await;
    let reminders = listing.data().as_array().unwrap();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0]["reminder_type"], "NO_ACTIVITY_NEGOTIATION");
}

#[tokio::test]
async fn test_cancel_pending_reminder() {
    let app = helpers::TestApp::new().await;
    let token = app.token(UserRole::Advisor);
    let lead_id = app
        .create_lead(&token, json!({ "name": "Proposal Co", "stage": "proposal" }))
        .await;

    let cancelled = app
        .request(
            "DELETE",
            &format!("/api/leads/{lead_id}/reminders/PROPOSAL_FOLLOW_UP"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.data()["count"], 1);

    let again = app
        .request(
            "DELETE",
            &format!("/api/leads/{lead_id}/reminders/PROPOSAL_FOLLOW_UP"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(again.data()["count"], 0);

    let listing = app
        .request("GET", &format!("/api/leads/{lead_id}/reminders"), None, Some(&token))
        .await;
    assert_eq!(listing.data()[0]["status"], "cancelled");

    let bad = app
        .request(
            "DELETE",
            &format!("/api/leads/{lead_id}/reminders/BIRTHDAY"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_due_reminders_reach_lead_owner_inbox() {
    let app = helpers::TestApp::new().await;
    let owner = app.create_user("Owner One", UserRole::Advisor, true).await;
    let owner_token = app.token_for(owner, UserRole::Advisor);
    let manager = app.token(UserRole::Manager);

    app.create_lead(
        &manager,
        json!({ "name": "Owned", "stage": "proposal", "assigned_to_id": owner }),
    )
    .await;

    let early = app
        .state
        .services
        .reminders
        .dispatch_due(Utc::now())
        .await
        .unwrap();
    assert_eq!(early.due, 0);

    let summary = app
        .state
        .services
        .reminders
        .dispatch_due(Utc::now() + Duration::hours(73))
        .await
        .unwrap();
    assert_eq!(summary.due, 1);
    assert_eq!(summary.delivered, 1);
    assert_eq!(summary.orphaned, 0);

    let unread = app
        .request("GET", "/api/notifications/unread-count", None, Some(&owner_token))
        .await;
    assert_eq!(unread.data()["count"], 1);

    let inbox = app
        .request("GET", "/api/notifications", None, Some(&owner_token))
        .await;
    assert_eq!(inbox.data()["items"][0]["title"], "PROPOSAL_FOLLOW_UP");

    let resent = app
        .state
        .services
        .reminders
        .dispatch_due(Utc::now() + Duration::hours(73))
        .await
        .unwrap();
    assert_eq!(resent.due, 0);
}
