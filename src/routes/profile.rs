use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    dto::profile_dto::{MessageResponse, UpdateProfileRequest},
    error::Result,
    models::counters::Counters,
    services::profile_form::FormData,
    utils::token::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state.profile_service.get_user(claims.user_id()?).await?;
    Ok(Json(user))
}

#[axum::debug_handler]
pub async fn put_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let form = FormData::read(&mut multipart).await?;
    let user = state
        .profile_service
        .update_profile_from_form(claims.user_id()?, form)
        .await?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/api/update-profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile replaced", body = MessageResponse),
        (status = 400, description = "Missing required data"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "userId names another account")
    ),
    tag = "profile"
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse> {
    state
        .profile_service
        .update_profile(claims.user_id()?, payload)
        .await?;
    Ok(Json(MessageResponse::new("Profile updated successfully")))
}

#[axum::debug_handler]
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    state.profile_service.delete_account(claims.user_id()?).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/counters",
    responses(
        (status = 200, description = "Number of candidate and company accounts", body = Counters)
    ),
    tag = "profile"
)]
#[axum::debug_handler]
pub async fn counters(State(state): State<AppState>) -> Result<Json<Counters>> {
    Ok(Json(state.profile_service.counters().await?))
}
