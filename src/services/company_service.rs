use std::sync::Arc;

use uuid::Uuid;

use crate::database::Store;
use crate::dto::company_dto::{CompanyRegisterRequest, CompanyResponse, UpdateCompanyRequest};
use crate::error::{Error, Result};
use crate::models::{
    company::CompanyProfile,
    user::{NewUser, User, UserType},
};
use crate::services::profile_form::FormData;
use crate::services::upload_service::{UploadKind, UploadService};
use crate::utils::{
    crypto::hash_password,
    validation::{non_blank, normalize_email, validate},
};

#[derive(Clone)]
pub struct CompanyService {
    store: Arc<dyn Store>,
    uploads: UploadService,
}

impl CompanyService {
    pub fn new(store: Arc<dyn Store>, uploads: UploadService) -> Self {
        Self { store, uploads }
    }

    pub async fn register(&self, mut payload: CompanyRegisterRequest) -> Result<CompanyResponse> {
        payload.name = payload.name.trim().to_string();
        payload.email = payload.email.trim().to_string();
        if payload.name.is_empty() {
            return Err(Error::BadRequest("Company name is required".into()));
        }
        validate(&payload)?;
        let email = normalize_email(&payload.email);
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(Error::Conflict("Email already registered".into()));
        }

        let new_user = NewUser {
            email,
            password_hash: hash_password(&payload.password)?,
            user_type: UserType::Company,
            job_title: None,
        };
        let profile = CompanyProfile {
            user_id: Uuid::nil(),
            name: payload.name,
            vat_number: non_blank(payload.vat_number),
            description: non_blank(payload.description),
            logo: None,
            created_at: None,
            updated_at: None,
        };

        let (user, profile) = self.store.create_company_account(new_user, profile).await?;
        tracing::info!(user_id = %user.id, "company registered");
        Ok(CompanyResponse::new(&user, profile))
    }

    async fn load(&self, user_id: Uuid) -> Result<(User, CompanyProfile)> {
        let not_found = || Error::NotFound("Company not found".into());
        let user = self.store.find_user(user_id).await?.ok_or_else(not_found)?;
        let profile = self
            .store
            .find_company_profile(user_id)
            .await?
            .ok_or_else(not_found)?;
        Ok((user, profile))
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<CompanyResponse> {
        let (user, profile) = self.load(user_id).await?;
        Ok(CompanyResponse::new(&user, profile))
    }

    /// Partial update: absent fields keep their value, blank optional
    /// fields are cleared.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        payload: UpdateCompanyRequest,
    ) -> Result<CompanyResponse> {
        validate(&payload)?;
        let (user, mut profile) = self.load(user_id).await?;

        if let Some(name) = payload.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(Error::BadRequest("Company name cannot be empty".into()));
            }
            profile.name = name;
        }
        if payload.vat_number.is_some() {
            profile.vat_number = non_blank(payload.vat_number);
        }
        if payload.description.is_some() {
            profile.description = non_blank(payload.description);
        }

        let saved = self.store.upsert_company_profile(profile).await?;
        Ok(CompanyResponse::new(&user, saved))
    }

    pub async fn upload_logo(&self, user_id: Uuid, form: FormData) -> Result<CompanyResponse> {
        let file = form
            .file("logo")
            .ok_or_else(|| Error::BadRequest("No valid logo file provided".into()))?;
        let (user, mut profile) = self.load(user_id).await?;

        let path = self
            .uploads
            .save(UploadKind::Image, &file.file_name, &file.data)
            .await?;
        let previous = profile.logo.replace(path.clone());

        let saved = match self.store.upsert_company_profile(profile).await {
            Ok(saved) => saved,
            Err(e) => {
                self.uploads.remove(&path).await;
                return Err(e);
            }
        };
        if let Some(old) = previous {
            self.uploads.remove(&old).await;
        }
        Ok(CompanyResponse::new(&user, saved))
    }

    pub async fn delete_profile(&self, user_id: Uuid) -> Result<()> {
        let (_, profile) = self.load(user_id).await?;
        self.store.delete_company_profile(user_id).await?;
        if let Some(logo) = profile.logo {
            self.uploads.remove(&logo).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;

    fn service() -> CompanyService {
        CompanyService::new(
            Arc::new(MemoryStore::new()),
            UploadService::new(std::env::temp_dir().join("talfy-company-tests")),
        )
    }

    fn acme() -> CompanyRegisterRequest {
        CompanyRegisterRequest {
            name: " Acme S.p.A. ".into(),
            email: "HR@acme.io".into(),
            password: "s3cret!".into(),
            vat_number: Some("IT01234567890".into()),
            description: Some("  ".into()),
        }
    }

    #[tokio::test]
    async fn register_creates_company_account() {
        let service = service();
        let company = service.register(acme()).await.unwrap();

        assert_eq!(company.email, "hr@acme.io");
        assert_eq!(company.name, "Acme S.p.A.");
        assert_eq!(company.description, None);
        assert_eq!(service.get_profile(company.id).await.unwrap(), company);
    }

    #[tokio::test]
    async fn register_twice_conflicts() {
        let service = service();
        service.register(acme()).await.unwrap();
        assert!(matches!(
            service.register(acme()).await,
            Err(Error::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn blank_company_name_is_rejected_at_registration() {
        let service = service();
        let err = service
            .register(CompanyRegisterRequest {
                name: "   ".into(),
                ..acme()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "Company name is required"));
    }

    #[tokio::test]
    async fn partial_update_keeps_untouched_fields() {
        let service = service();
        let company = service.register(acme()).await.unwrap();

        let updated = service
            .update_profile(
                company.id,
                UpdateCompanyRequest {
                    description: Some("Industrial automation".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Acme S.p.A.");
        assert_eq!(updated.vat_number.as_deref(), Some("IT01234567890"));
        assert_eq!(updated.description.as_deref(), Some("Industrial automation"));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let service = service();
        let company = service.register(acme()).await.unwrap();
        let err = service
            .update_profile(
                company.id,
                UpdateCompanyRequest {
                    name: Some("   ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }
}
