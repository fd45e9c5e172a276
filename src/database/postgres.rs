use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::database::store::Store;
use crate::error::{Error, Result};
use crate::models::{
    candidate::CandidateProfile,
    company::CompanyProfile,
    counters::Counters,
    user::{NewUser, User, UserType},
};

const USER_COLUMNS: &str =
    "id, email, password_hash, user_type, job_title, profile, created_at, updated_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    user_type: String,
    job_title: Option<String>,
    profile: Option<JsonValue>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        let user_type = row.user_type.parse().map_err(|e: String| {
            Error::Internal(format!("user {} has an invalid type: {}", row.id, e))
        })?;
        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            user_type,
            job_title: row.job_title,
            profile: row.profile,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn map_unique_violation(err: sqlx::Error) -> Error {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::Conflict("Email already registered".to_string())
        }
        other => other.into(),
    }
}

fn map_missing_user(err: sqlx::Error) -> Error {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            Error::NotFound("User not found".to_string())
        }
        other => other.into(),
    }
}

/// Locks the owning user row for the rest of the transaction and checks it
/// may hold a profile of `expected` type.
async fn lock_owner(conn: &mut PgConnection, user_id: Uuid, expected: UserType) -> Result<()> {
    let user_type: Option<String> =
        sqlx::query_scalar("SELECT user_type FROM users WHERE id = $1 FOR SHARE")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;
    match user_type {
        None => Err(Error::NotFound("User not found".to_string())),
        Some(t) if t == expected.as_str() => Ok(()),
        Some(_) => Err(Error::BadRequest(format!(
            "Only {} accounts have a {} profile",
            expected, expected
        ))),
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, user_type, job_title)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.user_type.as_str())
        .bind(&user.job_title)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.try_into()
    }

    async fn create_company_account(
        &self,
        user: NewUser,
        profile: CompanyProfile,
    ) -> Result<(User, CompanyProfile)> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, user_type, job_title)
            VALUES ($1, $2, $3, $4, NULL)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.user_type.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        let company = sqlx::query_as::<_, CompanyProfile>(
            r#"
            INSERT INTO company_profiles (user_id, name, vat_number, description, logo)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(row.id)
        .bind(&profile.name)
        .bind(&profile.vat_number)
        .bind(&profile.description)
        .bind(&profile.logo)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((row.try_into()?, company))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn update_user_profile(&self, id: Uuid, profile: JsonValue) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET profile = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(profile)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        row.try_into()
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn upsert_candidate_profile(&self, profile: CandidateProfile) -> Result<CandidateProfile> {
        let mut tx = self.pool.begin().await?;
        lock_owner(&mut *tx, profile.user_id, UserType::Candidate).await?;

        let saved = sqlx::query_as::<_, CandidateProfile>(
            r#"
            INSERT INTO candidate_profiles (
                user_id, first_name, last_name, location, phone, birth_date,
                job_role, experience, education, languages, salary_min, salary_max,
                availability, remote_work, relocation, summary, sectors, software,
                avatar, photo, cv
            ) VALUES (
                $1, $2, $3, $4, $5, $6,
                $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18,
                $19, $20, $21
            )
            ON CONFLICT (user_id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                location = EXCLUDED.location,
                phone = EXCLUDED.phone,
                birth_date = EXCLUDED.birth_date,
                job_role = EXCLUDED.job_role,
                experience = EXCLUDED.experience,
                education = EXCLUDED.education,
                languages = EXCLUDED.languages,
                salary_min = EXCLUDED.salary_min,
                salary_max = EXCLUDED.salary_max,
                availability = EXCLUDED.availability,
                remote_work = EXCLUDED.remote_work,
                relocation = EXCLUDED.relocation,
                summary = EXCLUDED.summary,
                sectors = EXCLUDED.sectors,
                software = EXCLUDED.software,
                avatar = EXCLUDED.avatar,
                photo = EXCLUDED.photo,
                cv = EXCLUDED.cv,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.location)
        .bind(&profile.phone)
        .bind(profile.birth_date)
        .bind(&profile.job_role)
        .bind(&profile.experience)
        .bind(&profile.education)
        .bind(&profile.languages)
        .bind(profile.salary_min)
        .bind(profile.salary_max)
        .bind(&profile.availability)
        .bind(&profile.remote_work)
        .bind(&profile.relocation)
        .bind(&profile.summary)
        .bind(&profile.sectors)
        .bind(&profile.software)
        .bind(&profile.avatar)
        .bind(&profile.photo)
        .bind(&profile.cv)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_missing_user)?;

        tx.commit().await?;
        Ok(saved)
    }

    async fn find_candidate_profile(&self, user_id: Uuid) -> Result<Option<CandidateProfile>> {
        let profile = sqlx::query_as::<_, CandidateProfile>(
            "SELECT * FROM candidate_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn delete_candidate_profile(&self, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM candidate_profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Candidate profile not found".to_string()));
        }
        Ok(())
    }

    async fn upsert_company_profile(&self, profile: CompanyProfile) -> Result<CompanyProfile> {
        let mut tx = self.pool.begin().await?;
        lock_owner(&mut *tx, profile.user_id, UserType::Company).await?;

        let saved = sqlx::query_as::<_, CompanyProfile>(
            r#"
            INSERT INTO company_profiles (user_id, name, vat_number, description, logo)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                name = EXCLUDED.name,
                vat_number = EXCLUDED.vat_number,
                description = EXCLUDED.description,
                logo = EXCLUDED.logo,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.name)
        .bind(&profile.vat_number)
        .bind(&profile.description)
        .bind(&profile.logo)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_missing_user)?;

        tx.commit().await?;
        Ok(saved)
    }

    async fn find_company_profile(&self, user_id: Uuid) -> Result<Option<CompanyProfile>> {
        let profile = sqlx::query_as::<_, CompanyProfile>(
            "SELECT * FROM company_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn delete_company_profile(&self, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM company_profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Company not found".to_string()));
        }
        Ok(())
    }

    async fn counters(&self) -> Result<Counters> {
        let (candidates, companies): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE user_type = 'candidate'),
                COUNT(*) FILTER (WHERE user_type = 'company')
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(Counters {
            candidates,
            companies,
        })
    }
}
