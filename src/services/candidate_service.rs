use std::sync::Arc;

use uuid::Uuid;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::candidate::CandidateProfile;
use crate::services::profile_form::{candidate_from_form, FormData};
use crate::services::upload_service::{UploadKind, UploadService};

const FILE_FIELDS: [&str; 3] = ["photo", "avatar", "cv"];

#[derive(Clone)]
pub struct CandidateService {
    store: Arc<dyn Store>,
    uploads: UploadService,
}

impl CandidateService {
    pub fn new(store: Arc<dyn Store>, uploads: UploadService) -> Self {
        Self { store, uploads }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<CandidateProfile> {
        self.store
            .find_candidate_profile(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate profile not found".into()))
    }

    /// Stores every file part named in `FILE_FIELDS`, returning
    /// `(field, public path)` pairs.
    async fn store_files(&self, form: &FormData) -> Result<Vec<(&'static str, String)>> {
        let mut saved = Vec::new();
        for field in FILE_FIELDS {
            let Some(file) = form.file(field) else {
                continue;
            };
            let kind = UploadKind::for_field(field).unwrap_or(UploadKind::Image);
            match self.uploads.save(kind, &file.file_name, &file.data).await {
                Ok(path) => saved.push((field, path)),
                Err(e) => {
                    tracing::error!(field, error = ?e, "candidate upload rejected");
                    for (_, path) in &saved {
                        self.uploads.remove(path).await;
                    }
                    return Err(e);
                }
            }
        }
        Ok(saved)
    }

    /// Submits the whole candidate form. Text fields replace the stored
    /// ones; files not re-sent keep their previous value.
    pub async fn complete_profile(&self, user_id: Uuid, form: FormData) -> Result<CandidateProfile> {
        let mut profile = candidate_from_form(user_id, &form)?;
        let existing = self.store.find_candidate_profile(user_id).await?;
        if let Some(existing) = &existing {
            profile.avatar = existing.avatar.clone();
            profile.photo = existing.photo.clone();
            profile.cv = existing.cv.clone();
        }

        let stored = self.store_files(&form).await?;
        let mut replaced = Vec::new();
        for (field, path) in &stored {
            let slot = match *field {
                "photo" => &mut profile.photo,
                "avatar" => &mut profile.avatar,
                _ => &mut profile.cv,
            };
            if let Some(old) = slot.replace(path.clone()) {
                replaced.push(old);
            }
        }

        let saved = match self.store.upsert_candidate_profile(profile).await {
            Ok(saved) => saved,
            Err(e) => {
                for (_, path) in &stored {
                    self.uploads.remove(path).await;
                }
                return Err(e);
            }
        };
        for old in replaced {
            self.uploads.remove(&old).await;
        }
        tracing::info!(user_id = %user_id, "candidate profile completed");
        Ok(saved)
    }

    /// Swaps only the CV, creating an otherwise empty profile if needed.
    pub async fn replace_cv(&self, user_id: Uuid, form: FormData) -> Result<CandidateProfile> {
        let file = form
            .file("cv")
            .ok_or_else(|| Error::BadRequest("No valid CV file provided".into()))?;
        let mut profile = self
            .store
            .find_candidate_profile(user_id)
            .await?
            .unwrap_or_else(|| CandidateProfile::empty(user_id));

        let path = self
            .uploads
            .save(UploadKind::Cv, &file.file_name, &file.data)
            .await?;
        let previous = profile.cv.replace(path.clone());

        let saved = match self.store.upsert_candidate_profile(profile).await {
            Ok(saved) => saved,
            Err(e) => {
                self.uploads.remove(&path).await;
                return Err(e);
            }
        };
        if let Some(old) = previous {
            self.uploads.remove(&old).await;
        }
        Ok(saved)
    }

    pub async fn delete_profile(&self, user_id: Uuid) -> Result<()> {
        let profile = self.get_profile(user_id).await?;
        self.store.delete_candidate_profile(user_id).await?;
        for path in profile.stored_files() {
            self.uploads.remove(path).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::models::user::{NewUser, UserType};
    use crate::services::profile_form::UploadedFile;
    use bytes::Bytes;

    async fn setup() -> (CandidateService, Uuid, std::path::PathBuf) {
        let (service, _, id, root) = setup_with_store().await;
        (service, id, root)
    }

    async fn setup_with_store() -> (CandidateService, Arc<dyn Store>, Uuid, std::path::PathBuf) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let user = store
            .create_user(NewUser {
                email: "ada@talfy.io".into(),
                password_hash: "hash".into(),
                user_type: UserType::Candidate,
                job_title: None,
            })
            .await
            .unwrap();
        let root = std::env::temp_dir().join(format!("talfy-candidate-{}", Uuid::new_v4()));
        (
            CandidateService::new(store.clone(), UploadService::new(&root)),
            store,
            user.id,
            root,
        )
    }

    async fn stored_cvs(root: &std::path::Path) -> usize {
        let Ok(mut entries) = tokio::fs::read_dir(root.join("cvs")).await else {
            return 0;
        };
        let mut count = 0;
        while let Ok(Some(_)) = entries.next_entry().await {
            count += 1;
        }
        count
    }

    #[tokio::test]
    async fn failed_store_write_removes_new_files() {
        let (service, store, id, root) = setup_with_store().await;
        store.delete_user(id).await.unwrap();

        let err = service
            .replace_cv(id, FormData { fields: vec![], files: vec![pdf("a.pdf")] })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = service
            .complete_profile(
                id,
                FormData {
                    fields: vec![("firstName".into(), "Ada".into())],
                    files: vec![pdf("b.pdf")],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        assert_eq!(stored_cvs(&root).await, 0);
        let _ = tokio::fs::remove_dir_all(root).await;
    }

    fn pdf(name: &str) -> UploadedFile {
        UploadedFile {
            field: "cv".into(),
            file_name: name.into(),
            data: Bytes::from_static(b"%PDF-1.4"),
        }
    }

    #[tokio::test]
    async fn resubmission_keeps_files_and_replaces_text() {
        let (service, id, root) = setup().await;
        let first = service
            .complete_profile(
                id,
                FormData {
                    fields: vec![("firstName".into(), "Ada".into()), ("location".into(), "Turin".into())],
                    files: vec![pdf("cv.pdf")],
                },
            )
            .await
            .unwrap();
        assert!(first.cv.is_some());

        let second = service
            .complete_profile(
                id,
                FormData {
                    fields: vec![("firstName".into(), "Ada".into())],
                    files: vec![],
                },
            )
            .await
            .unwrap();

        assert_eq!(second.cv, first.cv);
        assert_eq!(second.location, None);
        let _ = tokio::fs::remove_dir_all(root).await;
    }

    #[tokio::test]
    async fn replace_cv_removes_the_old_file() {
        let (service, id, root) = setup().await;
        let first = service
            .replace_cv(id, FormData { fields: vec![], files: vec![pdf("a.pdf")] })
            .await
            .unwrap();
        let old_path = first.cv.clone().unwrap();
        let old_file = UploadService::new(&root).resolve(&old_path).unwrap();
        assert!(old_file.exists());

        let second = service
            .replace_cv(id, FormData { fields: vec![], files: vec![pdf("b.pdf")] })
            .await
            .unwrap();

        assert_ne!(second.cv, first.cv);
        assert!(!old_file.exists());
        let _ = tokio::fs::remove_dir_all(root).await;
    }

    #[tokio::test]
    async fn replace_cv_without_file_is_rejected() {
        let (service, id, _) = setup().await;
        let err = service.replace_cv(id, FormData::default()).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "No valid CV file provided"));
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let (service, id, _) = setup().await;
        assert!(matches!(
            service.get_profile(id).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            service.delete_profile(id).await,
            Err(Error::NotFound(_))
        ));
    }
}
