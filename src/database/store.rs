use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    candidate::CandidateProfile,
    company::CompanyProfile,
    counters::Counters,
    user::{NewUser, User},
};

/// Persistence operations shared by the Postgres and in-memory backends.
///
/// Emails are compared case-insensitively. Profile upserts replace every
/// column of the existing row and keep its `created_at`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<()>;

    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Creates the account and its company profile in one unit.
    async fn create_company_account(
        &self,
        user: NewUser,
        profile: CompanyProfile,
    ) -> Result<(User, CompanyProfile)>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn update_user_profile(&self, id: Uuid, profile: JsonValue) -> Result<User>;

    async fn delete_user(&self, id: Uuid) -> Result<()>;

    async fn upsert_candidate_profile(&self, profile: CandidateProfile) -> Result<CandidateProfile>;

    async fn find_candidate_profile(&self, user_id: Uuid) -> Result<Option<CandidateProfile>>;

    async fn delete_candidate_profile(&self, user_id: Uuid) -> Result<()>;

    async fn upsert_company_profile(&self, profile: CompanyProfile) -> Result<CompanyProfile>;

    async fn find_company_profile(&self, user_id: Uuid) -> Result<Option<CompanyProfile>>;

    async fn delete_company_profile(&self, user_id: Uuid) -> Result<()>;

    async fn counters(&self) -> Result<Counters>;
}
