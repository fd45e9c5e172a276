use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::store::Store;
use crate::error::{Error, Result};
use crate::models::{
    candidate::CandidateProfile,
    company::CompanyProfile,
    counters::Counters,
    user::{NewUser, User, UserType},
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    candidates: HashMap<Uuid, CandidateProfile>,
    companies: HashMap<Uuid, CompanyProfile>,
}

impl MemoryState {
    fn email_taken(&self, email: &str) -> bool {
        self.users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email))
    }

    fn insert_user(&mut self, new_user: NewUser) -> Result<User> {
        if self.email_taken(&new_user.email) {
            return Err(Error::Conflict("Email already registered".to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            user_type: new_user.user_type,
            job_title: new_user.job_title,
            profile: None,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn check_owner(&self, user_id: Uuid, expected: UserType) -> Result<()> {
        match self.users.get(&user_id) {
            None => Err(Error::NotFound("User not found".to_string())),
            Some(user) if user.user_type == expected => Ok(()),
            Some(_) => Err(Error::BadRequest(format!(
                "Only {} accounts have a {} profile",
                expected, expected
            ))),
        }
    }

    fn put_company(&mut self, mut profile: CompanyProfile) -> CompanyProfile {
        let now = Utc::now();
        profile.created_at = self
            .companies
            .get(&profile.user_id)
            .and_then(|existing| existing.created_at)
            .or(Some(now));
        profile.updated_at = Some(now);
        self.companies.insert(profile.user_id, profile.clone());
        profile
    }
}

/// Process-local storage. Data lives as long as the server process.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.state.write().await.insert_user(user)
    }

    async fn create_company_account(
        &self,
        user: NewUser,
        mut profile: CompanyProfile,
    ) -> Result<(User, CompanyProfile)> {
        let mut state = self.state.write().await;
        let user = state.insert_user(user)?;
        profile.user_id = user.id;
        let profile = state.put_company(profile);
        Ok((user, profile))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update_user_profile(&self, id: Uuid, profile: JsonValue) -> Result<User> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        user.profile = Some(profile);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Err(Error::NotFound("User not found".to_string()));
        }
        state.candidates.remove(&id);
        state.companies.remove(&id);
        Ok(())
    }

    async fn upsert_candidate_profile(
        &self,
        mut profile: CandidateProfile,
    ) -> Result<CandidateProfile> {
        let mut state = self.state.write().await;
        state.check_owner(profile.user_id, UserType::Candidate)?;
        let now = Utc::now();
        profile.created_at = state
            .candidates
            .get(&profile.user_id)
            .and_then(|existing| existing.created_at)
            .or(Some(now));
        profile.updated_at = Some(now);
        state.candidates.insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn find_candidate_profile(&self, user_id: Uuid) -> Result<Option<CandidateProfile>> {
        Ok(self.state.read().await.candidates.get(&user_id).cloned())
    }

    async fn delete_candidate_profile(&self, user_id: Uuid) -> Result<()> {
        self.state
            .write()
            .await
            .candidates
            .remove(&user_id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound("Candidate profile not found".to_string()))
    }

    async fn upsert_company_profile(&self, profile: CompanyProfile) -> Result<CompanyProfile> {
        let mut state = self.state.write().await;
        state.check_owner(profile.user_id, UserType::Company)?;
        Ok(state.put_company(profile))
    }

    async fn find_company_profile(&self, user_id: Uuid) -> Result<Option<CompanyProfile>> {
        Ok(self.state.read().await.companies.get(&user_id).cloned())
    }

    async fn delete_company_profile(&self, user_id: Uuid) -> Result<()> {
        self.state
            .write()
            .await
            .companies
            .remove(&user_id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound("Company not found".to_string()))
    }

    async fn counters(&self) -> Result<Counters> {
        let state = self.state.read().await;
        let mut counters = Counters::default();
        for user in state.users.values() {
            match user.user_type {
                UserType::Candidate => counters.candidates += 1,
                UserType::Company => counters.companies += 1,
            }
        }
        Ok(counters)
    }
}
