use std::sync::Arc;

use crate::database::Store;
use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest};
use crate::error::{Error, Result};
use crate::models::user::{NewUser, User, UserType};
use crate::utils::{
    crypto::{hash_password, verify_password},
    token::{issue_token, Claims},
    validation::{non_blank, normalize_email, validate},
};

const INVALID_LOGIN: &str = "Invalid email or password";

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    jwt_secret: String,
    jwt_ttl_hours: i64,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, jwt_secret: String, jwt_ttl_hours: i64) -> Self {
        Self {
            store,
            jwt_secret,
            jwt_ttl_hours,
        }
    }

    pub async fn register(&self, mut payload: RegisterRequest) -> Result<User> {
        payload.email = non_blank(payload.email);
        validate(&payload)?;

        let (Some(email), Some(password), Some(user_type)) = (
            non_blank(payload.email),
            payload.password.filter(|p| !p.is_empty()),
            non_blank(payload.user_type),
        ) else {
            return Err(Error::BadRequest("Missing required fields".into()));
        };

        if let Some(confirm) = payload.confirm_password {
            if confirm != password {
                return Err(Error::BadRequest("Passwords do not match".into()));
            }
        }

        let user_type: UserType = user_type
            .parse()
            .map_err(|_| Error::BadRequest("user_type must be 'candidate' or 'company'".into()))?;

        let email = normalize_email(&email);
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(Error::Conflict("Email already registered".into()));
        }

        let job_title = match user_type {
            UserType::Candidate => non_blank(payload.job_title),
            UserType::Company => None,
        };

        let user = self
            .store
            .create_user(NewUser {
                email,
                password_hash: hash_password(&password)?,
                user_type,
                job_title,
            })
            .await?;

        tracing::info!(user_id = %user.id, user_type = %user.user_type, "registered user");
        Ok(user)
    }

    /// Checks credentials without revealing which half was wrong.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.store.find_user_by_email(&normalize_email(email)).await? else {
            return Ok(None);
        };
        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    pub fn issue_for(&self, user: &User) -> Result<String> {
        issue_token(&Claims::for_user(user, self.jwt_ttl_hours), &self.jwt_secret)
    }

    pub async fn login(&self, payload: LoginRequest) -> Result<LoginResponse> {
        let (Some(email), Some(password)) = (non_blank(payload.email), payload.password) else {
            return Err(Error::BadRequest(INVALID_LOGIN.into()));
        };

        let user = self
            .verify_credentials(&email, &password)
            .await?
            .ok_or_else(|| Error::BadRequest(INVALID_LOGIN.into()))?;

        let token = self.issue_for(&user)?;
        tracing::info!(user_id = %user.id, "user logged in");

        Ok(LoginResponse {
            message: "Login successful".into(),
            token,
            user_id: user.id,
            user_type: user.user_type,
        })
    }

    /// Company login keeps the company endpoints' own error contract:
    /// unknown or non-company accounts are 404, a bad password is 401.
    pub async fn login_company(&self, payload: LoginRequest) -> Result<String> {
        let not_found = || Error::NotFound("Company not found".into());
        let email = non_blank(payload.email).ok_or_else(not_found)?;
        let user = self
            .store
            .find_user_by_email(&normalize_email(&email))
            .await?
            .filter(|u| u.user_type == UserType::Company)
            .ok_or_else(not_found)?;

        let password = payload.password.unwrap_or_default();
        if !verify_password(&password, &user.password_hash)? {
            return Err(Error::Unauthorized("Invalid credentials".into()));
        }
        self.issue_for(&user)
    }
}
