pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::database::Store;
use crate::services::{
    auth_service::AuthService, candidate_service::CandidateService,
    company_service::CompanyService, profile_service::ProfileService,
    upload_service::UploadService,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth_service: AuthService,
    pub profile_service: ProfileService,
    pub candidate_service: CandidateService,
    pub company_service: CompanyService,
    pub upload_service: UploadService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let config = crate::config::get_config();

        let upload_service = UploadService::new(config.uploads_dir.clone());
        let auth_service = AuthService::new(
            store.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl_hours,
        );
        let profile_service = ProfileService::new(store.clone(), upload_service.clone());
        let candidate_service = CandidateService::new(store.clone(), upload_service.clone());
        let company_service = CompanyService::new(store.clone(), upload_service.clone());

        Self {
            store,
            auth_service,
            profile_service,
            candidate_service,
            company_service,
            upload_service,
        }
    }
}
