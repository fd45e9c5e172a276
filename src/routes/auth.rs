use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Missing fields, mismatched passwords or email already registered")
    ),
    tag = "auth"
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let user = state.auth_service.register(payload).await?;
    Ok(Json(RegisterResponse {
        message: "Registration successful".into(),
        user_id: user.id,
    }))
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed token for the account", body = LoginResponse),
        (status = 400, description = "Invalid email or password")
    ),
    tag = "auth"
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let response = state.auth_service.login(payload).await?;
    Ok(Json(response))
}
