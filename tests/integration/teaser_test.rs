//! Integration tests for teaser uploads.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use uuid::Uuid;

use crm_entity::user::UserRole;

const BOUNDARY: &str = "crm-test-boundary";

fn multipart_request(
    lead_id: Uuid,
    token: &str,
    field: &str,
    file_name: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(format!("/api/leads/{lead_id}/teaser"))
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_pdf_teaser() {
    let app = helpers::TestApp::new().await;
    let token = app.token(UserRole::Advisor);
    let lead_id = app.create_lead(&token, json!({ "name": "Seller" })).await;

    let response = app
        .send(multipart_request(
            lead_id,
            &token,
            "file",
            "Teaser Q3.pdf",
            "application/pdf",
            b"%PDF-1.4 teaser",
        ))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let upload = response.data();
    assert_eq!(upload["bucket"], "teasers");
    assert_eq!(upload["mime_type"], "application/pdf");
    assert_eq!(upload["size_bytes"], 15);
    let path = upload["path"].as_str().unwrap();
    assert!(path.starts_with(&lead_id.to_string()));

    let stored = app.storage_dir.path().join("teasers").join(path);
    assert_eq!(std::fs::read(stored).unwrap(), b"%PDF-1.4 teaser");
}

#[tokio::test]
async fn test_octet_stream_falls_back_to_extension() {
    let app = helpers::TestApp::new().await;
    let token = app.token(UserRole::Advisor);
    let lead_id = app.create_lead(&token, json!({ "name": "Docx" })).await;

    let response = app
        .send(multipart_request(
            lead_id,
            &token,
            "file",
            "teaser.docx",
            "application/octet-stream",
            b"PK docx bytes",
        ))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(
        response.data()["mime_type"],
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
}

#[tokio::test]
async fn test_rejects_unsupported_type() {
    let app = helpers::TestApp::new().await;
    let token = app.token(UserRole::Advisor);
    let lead_id = app.create_lead(&token, json!({ "name": "Text" })).await;

    let response = app
        .send(multipart_request(
            lead_id,
            &token,
            "file",
            "notes.txt",
            "text/plain",
            b"plain",
        ))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rejects_missing_file_field() {
    let app = helpers::TestApp::new().await;
    let token = app.token(UserRole::Advisor);
    let lead_id = app.create_lead(&token, json!({ "name": "Nofile" })).await;

    let response = app
        .send(multipart_request(
            lead_id,
            &token,
            "attachment",
            "teaser.pdf",
            "application/pdf",
            b"%PDF",
        ))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_lead_is_not_found() {
    let app = helpers::TestApp::new().await;
    let token = app.token(UserRole::Advisor);

    let response = app
        .send(multipart_request(
            Uuid::new_v4(),
            &token,
            "file",
            "teaser.pdf",
            "application/pdf",
            b"%PDF",
        ))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
