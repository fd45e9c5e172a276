use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::models::user::UserType;
use crate::utils::token::{decode_token, Claims};

fn reject(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

fn bearer_claims(req: &Request) -> Result<Claims, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(reject(StatusCode::UNAUTHORIZED, "missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(reject(StatusCode::UNAUTHORIZED, "bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(reject(StatusCode::UNAUTHORIZED, "unsupported_scheme"));
    };

    let config = crate::config::get_config();
    decode_token(token.trim(), &config.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        reject(StatusCode::UNAUTHORIZED, "invalid_token")
    })
}

async fn authorize(mut req: Request, next: Next, required: Option<UserType>) -> Response {
    let claims = match bearer_claims(&req) {
        Ok(claims) => claims,
        Err(resp) => return resp,
    };
    if let Some(required) = required {
        if claims.user_type != required {
            return reject(StatusCode::FORBIDDEN, "forbidden");
        }
    }
    req.extensions_mut().insert(claims);
    next.run(req).await
}

/// Any valid token; inserts [`Claims`] into the request extensions.
pub async fn require_bearer_auth(req: Request, next: Next) -> Response {
    authorize(req, next, None).await
}

pub async fn require_candidate(req: Request, next: Next) -> Response {
    authorize(req, next, Some(UserType::Candidate)).await
}

pub async fn require_company(req: Request, next: Next) -> Response {
    authorize(req, next, Some(UserType::Company)).await
}
