#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use serde_json::{json, Value as JsonValue};
use talfy_backend::{
    config::{get_config, init_config, Config},
    database::memory::MemoryStore,
    routes, AppState,
};
use tower::ServiceExt;

const BOUNDARY: &str = "talfy-test-boundary";

pub const PDF: &[u8] = b"%PDF-1.4\n%test document\n";
pub const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];

/// Every test binary shares one process-wide config; the values are
/// identical across tests so whichever call wins the init is fine.
pub fn setup_app() -> Router {
    setup_app_with(|_| {})
}

/// Same as [`setup_app`], with router-level settings overridden.
pub fn setup_app_with(configure: impl FnOnce(&mut Config)) -> Router {
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("STORAGE_BACKEND", "memory");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("AUTH_RPS", "10000");
    env::set_var(
        "UPLOADS_DIR",
        env::temp_dir().join("talfy-it-uploads").to_string_lossy().to_string(),
    );
    env::set_var(
        "PUBLIC_DIR",
        env::temp_dir().join("talfy-it-public").to_string_lossy().to_string(),
    );
    let _ = init_config();

    let mut config = get_config().clone();
    configure(&mut config);
    let state = AppState::new(Arc::new(MemoryStore::new()));
    routes::app(state, &config)
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        field: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                field,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        field, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let resp = app.clone().oneshot(req).await.unwrap();
    read_json(resp).await
}

pub async fn send_raw(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

pub async fn read_json(resp: Response<Body>) -> (StatusCode, JsonValue) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, body)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: JsonValue) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn multipart_request(method: &str, uri: &str, token: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Registers an account and logs it in, returning `(user id, token)`.
pub async fn register_and_login(app: &Router, email: &str, user_type: &str) -> (String, String) {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/register",
            None,
            json!({ "email": email, "password": "s3cret!", "user_type": user_type }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {}", body);

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/login",
            None,
            json!({ "email": email, "password": "s3cret!" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    (
        body["userId"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}
