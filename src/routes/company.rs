use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    dto::{
        auth_dto::LoginRequest,
        company_dto::{
            CompanyRegisterRequest, CompanyRegisteredResponse, CompanyResponse,
            CompanyTokenResponse, UpdateCompanyRequest,
        },
    },
    error::Result,
    services::profile_form::FormData,
    utils::token::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/company/register",
    request_body = CompanyRegisterRequest,
    responses(
        (status = 201, description = "Company account created", body = CompanyRegisteredResponse),
        (status = 400, description = "Invalid payload or email already registered")
    ),
    tag = "company"
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CompanyRegisterRequest>,
) -> Result<impl IntoResponse> {
    let company = state.company_service.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CompanyRegisteredResponse {
            message: "Company registered successfully".into(),
            company,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/company/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed token for the company", body = CompanyTokenResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "Company not found")
    ),
    tag = "company"
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let token = state.auth_service.login_company(payload).await?;
    Ok(Json(CompanyTokenResponse { token }))
}

#[utoipa::path(
    get,
    path = "/api/company/profile",
    responses(
        (status = 200, description = "Company profile", body = CompanyResponse),
        (status = 404, description = "Company not found")
    ),
    tag = "company"
)]
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let company = state.company_service.get_profile(claims.user_id()?).await?;
    Ok(Json(company))
}

#[utoipa::path(
    put,
    path = "/api/company/profile",
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Updated company profile", body = CompanyResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Company not found")
    ),
    tag = "company"
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateCompanyRequest>,
) -> Result<impl IntoResponse> {
    let company = state
        .company_service
        .update_profile(claims.user_id()?, payload)
        .await?;
    Ok(Json(company))
}

#[axum::debug_handler]
pub async fn upload_logo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let form = FormData::read(&mut multipart).await?;
    let company = state
        .company_service
        .upload_logo(claims.user_id()?, form)
        .await?;
    Ok(Json(company))
}

#[axum::debug_handler]
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    state
        .company_service
        .delete_profile(claims.user_id()?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
