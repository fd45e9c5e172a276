use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    dto::profile_dto::CompleteProfileResponse, error::Result, services::profile_form::FormData,
    utils::token::Claims, AppState,
};

pub async fn complete_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    tracing::info!("Candidate profile submission received");
    let form = FormData::read(&mut multipart).await?;
    let candidate = state
        .candidate_service
        .complete_profile(claims.user_id()?, form)
        .await?;
    Ok(Json(CompleteProfileResponse {
        message: "Profile completed".into(),
        candidate,
    }))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let profile = state.candidate_service.get_profile(claims.user_id()?).await?;
    Ok(Json(profile))
}

pub async fn update_cv(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let form = FormData::read(&mut multipart).await?;
    let profile = state
        .candidate_service
        .replace_cv(claims.user_id()?, form)
        .await?;
    Ok(Json(profile))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    state
        .candidate_service
        .delete_profile(claims.user_id()?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
