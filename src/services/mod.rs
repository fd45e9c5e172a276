pub mod auth_service;
pub mod candidate_service;
pub mod company_service;
pub mod profile_form;
pub mod profile_service;
pub mod upload_service;
