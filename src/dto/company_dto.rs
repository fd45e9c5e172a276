use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{company::CompanyProfile, user::User};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CompanyRegisterRequest {
    #[validate(length(min = 1, message = "Company name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(alias = "vatNumber")]
    pub vat_number: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, message = "Company name cannot be empty"))]
    pub name: Option<String>,
    #[serde(alias = "vat_number")]
    pub vat_number: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyTokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub vat_number: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CompanyResponse {
    pub fn new(user: &User, profile: CompanyProfile) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: profile.name,
            vat_number: profile.vat_number,
            description: profile.description,
            logo: profile.logo,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyRegisteredResponse {
    pub message: String,
    pub company: CompanyResponse,
}
