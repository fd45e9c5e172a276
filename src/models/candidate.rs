use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub user_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub job_role: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub languages: Option<JsonValue>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub availability: Option<String>,
    pub remote_work: Option<String>,
    pub relocation: Option<String>,
    pub summary: Option<String>,
    pub sectors: Vec<String>,
    pub software: Vec<String>,
    pub avatar: Option<String>,
    pub photo: Option<String>,
    pub cv: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CandidateProfile {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }

    /// Upload paths referenced by this profile.
    pub fn stored_files(&self) -> impl Iterator<Item = &str> {
        [&self.avatar, &self.photo, &self.cv]
            .into_iter()
            .filter_map(|p| p.as_deref())
    }
}
