pub mod auth;
pub mod candidate_routes;
pub mod company;
pub mod docs;
pub mod health;
pub mod profile;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::{
    auth::{require_bearer_auth, require_candidate, require_company},
    cors::permissive_cors,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::services::upload_service::PUBLIC_PREFIX;
use crate::AppState;

/// Builds the full HTTP surface: API routes, uploaded files and the static site.
pub fn app(state: AppState, config: &Config) -> Router {
    let auth_api = Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/company/register", post(company::register))
        .route("/api/company/login", post(company::login))
        .layer(from_fn_with_state(
            RateLimiter::new(config.auth_rps),
            rps_middleware,
        ));

    let account_api = Router::new()
        .route(
            "/api/profile",
            get(profile::get_profile).put(profile::put_profile),
        )
        .route("/api/update-profile", post(profile::update_profile))
        .route("/api/account", axum::routing::delete(profile::delete_account))
        .route_layer(from_fn(require_bearer_auth));

    let candidate_api = Router::new()
        .route(
            "/api/candidate/complete-profile",
            post(candidate_routes::complete_profile),
        )
        .route(
            "/api/candidate/profile",
            get(candidate_routes::get_profile).delete(candidate_routes::delete_profile),
        )
        .route("/api/candidate/cv", patch(candidate_routes::update_cv))
        .route_layer(from_fn(require_candidate));

    let company_api = Router::new()
        .route(
            "/api/company/profile",
            get(company::get_profile)
                .put(company::update_profile)
                .delete(company::delete_profile),
        )
        .route("/api/company/logo", post(company::upload_logo))
        .route_layer(from_fn(require_company));

    let open_api = Router::new()
        .route("/health", get(health::health))
        .route("/api/counters", get(profile::counters))
        .route("/api/openapi.json", get(docs::openapi));

    tracing::info!(
        uploads = %config.uploads_dir.display(),
        public = %config.public_dir.display(),
        "Serving static directories"
    );

    Router::new()
        .merge(open_api)
        .merge(auth_api)
        .merge(account_api)
        .merge(candidate_api)
        .merge(company_api)
        .nest_service(PUBLIC_PREFIX, ServeDir::new(&config.uploads_dir))
        .fallback_service(ServeDir::new(&config.public_dir))
        .with_state(state)
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
}
