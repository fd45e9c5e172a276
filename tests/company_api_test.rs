mod common;

use axum::http::StatusCode;
use common::{
    empty_request, json_request, multipart_request, register_and_login, send, setup_app, Part, PNG,
};
use serde_json::json;

async fn register_acme(app: &axum::Router) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/company/register",
            None,
            json!({
                "name": "Acme S.p.A.",
                "email": "hr@acme.io",
                "password": "s3cret!",
                "vat_number": "IT01234567890",
                "description": "Industrial automation"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["message"], "Company registered successfully");
    assert_eq!(body["company"]["vatNumber"], "IT01234567890");

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/company/login",
            None,
            json!({ "email": "hr@acme.io", "password": "s3cret!" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn company_register_login_and_profile() {
    let app = setup_app();
    let token = register_acme(&app).await;

    let (status, body) = send(
        &app,
        empty_request("GET", "/api/company/profile", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Acme S.p.A.");
    assert_eq!(body["email"], "hr@acme.io");

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/company/profile",
            Some(&token),
            json!({ "description": "Robotics" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Robotics");
    assert_eq!(body["name"], "Acme S.p.A.");

    let (_, counters) = send(&app, empty_request("GET", "/api/counters", None)).await;
    assert_eq!(counters["companies"], 1);
}

#[tokio::test]
async fn company_login_error_contract() {
    let app = setup_app();
    register_acme(&app).await;
    register_and_login(&app, "ada@talfy.io", "candidate").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/company/login",
            None,
            json!({ "email": "hr@acme.io", "password": "wrong-pass" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/company/login",
            None,
            json!({ "email": "ada@talfy.io", "password": "s3cret!" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Company not found");
}

#[tokio::test]
async fn logo_upload_and_profile_delete() {
    let app = setup_app();
    let token = register_acme(&app).await;

    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            "/api/company/logo",
            &token,
            &[Part::File {
                field: "logo",
                file_name: "acme.png",
                content_type: "image/png",
                data: PNG,
            }],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["logo"].as_str().unwrap().starts_with("/uploads/photos/"));

    let (status, _) = send(
        &app,
        empty_request("DELETE", "/api/company/profile", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        empty_request("GET", "/api/company/profile", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Company not found");
}

#[tokio::test]
async fn invalid_company_payload_is_rejected() {
    let app = setup_app();
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/company/register",
            None,
            json!({ "name": "", "email": "not-an-email", "password": "123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_company_name_is_rejected() {
    let app = setup_app();
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/company/register",
            None,
            json!({ "name": "   ", "email": "hr@acme.io", "password": "s3cret!" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Company name is required");

    let (_, counters) = send(&app, empty_request("GET", "/api/counters", None)).await;
    assert_eq!(counters["companies"], 0);
}
