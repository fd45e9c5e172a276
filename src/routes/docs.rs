use axum::Json;
use utoipa::OpenApi;

use crate::dto::{
    auth_dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    company_dto::{
        CompanyRegisterRequest, CompanyRegisteredResponse, CompanyResponse, CompanyTokenResponse,
        UpdateCompanyRequest,
    },
    profile_dto::{MessageResponse, UpdateProfileRequest},
};
use crate::models::{counters::Counters, user::UserType};

#[derive(OpenApi)]
#[openapi(
    info(title = "Talfy API", description = "Job-board accounts, profiles and uploads"),
    paths(
        crate::routes::health::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::profile::update_profile,
        crate::routes::profile::counters,
        crate::routes::company::register,
        crate::routes::company::login,
        crate::routes::company::get_profile,
        crate::routes::company::update_profile,
    ),
    components(schemas(
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        UserType,
        UpdateProfileRequest,
        MessageResponse,
        Counters,
        CompanyRegisterRequest,
        CompanyRegisteredResponse,
        CompanyResponse,
        CompanyTokenResponse,
        UpdateCompanyRequest,
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "profile", description = "Per-account JSON profile and counters"),
        (name = "company", description = "Company accounts"),
        (name = "system", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
