use std::sync::Arc;

use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::database::Store;
use crate::dto::profile_dto::UpdateProfileRequest;
use crate::error::{Error, Result};
use crate::models::{counters::Counters, user::User};
use crate::services::profile_form::{profile_from_form, FormData, AVATAR_KEY};
use crate::services::upload_service::{UploadKind, UploadService, PUBLIC_PREFIX};

/// The free-form JSON profile every account carries, plus account-level
/// operations (lookup, deletion, counters).
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn Store>,
    uploads: UploadService,
}

impl ProfileService {
    pub fn new(store: Arc<dyn Store>, uploads: UploadService) -> Self {
        Self { store, uploads }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".into()))
    }

    /// Replaces the caller's profile blob. A `userId` in the body must name
    /// the caller. The stored avatar survives the replacement.
    pub async fn update_profile(&self, caller: Uuid, payload: UpdateProfileRequest) -> Result<User> {
        let profile = payload
            .profile_data
            .filter(|p| !p.is_null())
            .ok_or_else(|| Error::BadRequest("Missing required data".into()))?;
        if let Some(target) = payload.user_id {
            if target != caller {
                return Err(Error::Forbidden(
                    "You can only update your own profile".into(),
                ));
            }
        }
        let JsonValue::Object(mut profile) = profile else {
            return Err(Error::BadRequest("profileData must be a JSON object".into()));
        };

        let current = self.get_user(caller).await?;
        profile.remove(AVATAR_KEY);
        if let Some(avatar) = avatar_of(current.profile.as_ref()) {
            profile.insert(AVATAR_KEY.into(), JsonValue::String(avatar));
        }

        let user = self
            .store
            .update_user_profile(caller, JsonValue::Object(profile))
            .await?;
        tracing::info!(user_id = %caller, "profile updated");
        Ok(user)
    }

    /// Multipart variant: text parts become profile keys and an `avatar`
    /// file is stored and referenced under `avatar`.
    pub async fn update_profile_from_form(&self, caller: Uuid, form: FormData) -> Result<User> {
        let current = self.get_user(caller).await?;
        let mut profile = profile_from_form(&form)?;
        let previous_avatar = avatar_of(current.profile.as_ref());

        let new_avatar = match form.file(AVATAR_KEY) {
            Some(file) => Some(
                self.uploads
                    .save(UploadKind::Image, &file.file_name, &file.data)
                    .await?,
            ),
            None => None,
        };

        if let (JsonValue::Object(map), Some(path)) =
            (&mut profile, new_avatar.as_ref().or(previous_avatar.as_ref()))
        {
            map.insert(AVATAR_KEY.into(), JsonValue::String(path.clone()));
        }

        let user = match self.store.update_user_profile(caller, profile).await {
            Ok(user) => user,
            Err(e) => {
                if let Some(path) = &new_avatar {
                    self.uploads.remove(path).await;
                }
                return Err(e);
            }
        };
        if let (Some(_), Some(old)) = (&new_avatar, &previous_avatar) {
            self.uploads.remove(old).await;
        }
        Ok(user)
    }

    /// Removes the account, its profiles and every file they reference.
    pub async fn delete_account(&self, caller: Uuid) -> Result<()> {
        let user = self.get_user(caller).await?;
        let mut files: Vec<String> = avatar_of(user.profile.as_ref()).into_iter().collect();
        if let Some(candidate) = self.store.find_candidate_profile(caller).await? {
            files.extend(candidate.stored_files().map(str::to_string));
        }
        if let Some(logo) = self
            .store
            .find_company_profile(caller)
            .await?
            .and_then(|c| c.logo)
        {
            files.push(logo);
        }

        self.store.delete_user(caller).await?;
        for file in files {
            self.uploads.remove(&file).await;
        }
        tracing::info!(user_id = %caller, "account deleted");
        Ok(())
    }

    pub async fn counters(&self) -> Result<Counters> {
        self.store.counters().await
    }
}

/// Avatar paths are only ever written by the server, under `photos/`.
fn avatar_of(profile: Option<&JsonValue>) -> Option<String> {
    profile?
        .get(AVATAR_KEY)?
        .as_str()
        .filter(|p| p.starts_with(&format!("{}/photos/", PUBLIC_PREFIX)))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::models::user::{NewUser, UserType};
    use serde_json::json;

    async fn setup() -> (ProfileService, Arc<dyn Store>, Uuid) {
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
        let uploads = UploadService::new(std::env::temp_dir().join("talfy-profile-tests"));
        (ProfileService::new(store.clone(), uploads), store, user.id)
    }

    #[tokio::test]
    async fn update_replaces_profile_wholesale() {
        let (service, _, id) = setup().await;
        service
            .update_profile(
                id,
                UpdateProfileRequest {
                    user_id: Some(id),
                    profile_data: Some(json!({"a": 1, "b": 2})),
                },
            )
            .await
            .unwrap();
        let user = service
            .update_profile(
                id,
                UpdateProfileRequest {
                    user_id: None,
                    profile_data: Some(json!({"c": 3})),
                },
            )
            .await
            .unwrap();
        assert_eq!(user.profile, Some(json!({"c": 3})));
    }

    #[tokio::test]
    async fn client_cannot_set_the_avatar_path() {
        let (service, _, id) = setup().await;
        let user = service
            .update_profile(
                id,
                UpdateProfileRequest {
                    user_id: None,
                    profile_data: Some(json!({"avatar": "/uploads/photos/other.png", "a": 1})),
                },
            )
            .await
            .unwrap();
        assert_eq!(user.profile, Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn update_for_someone_else_is_forbidden() {
        let (service, _, id) = setup().await;
        let err = service
            .update_profile(
                id,
                UpdateProfileRequest {
                    user_id: Some(Uuid::new_v4()),
                    profile_data: Some(json!({})),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn missing_profile_data_is_rejected() {
        let (service, _, id) = setup().await;
        let err = service
            .update_profile(
                id,
                UpdateProfileRequest {
                    user_id: Some(id),
                    profile_data: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "Missing required data"));
    }

    #[tokio::test]
    async fn delete_account_updates_counters() {
        let (service, _, id) = setup().await;
        assert_eq!(service.counters().await.unwrap().candidates, 1);
        service.delete_account(id).await.unwrap();
        assert_eq!(service.counters().await.unwrap().candidates, 0);
    }

    #[test]
    fn only_stored_uploads_count_as_avatars() {
        assert_eq!(
            avatar_of(Some(&json!({"avatar": "/uploads/photos/a.png"}))),
            Some("/uploads/photos/a.png".to_string())
        );
        assert_eq!(avatar_of(Some(&json!({"avatar": "https://cdn/x.png"}))), None);
        assert_eq!(avatar_of(Some(&json!({"avatar": "/uploads/cvs/a.pdf"}))), None);
        assert_eq!(avatar_of(None), None);
    }
}
