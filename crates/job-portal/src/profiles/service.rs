use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use super::storage::{ResumeStorageError, ResumeStore};
use crate::auth::{AuthorizationError, AuthorizationGuard};
use crate::directory::{DirectoryError, Identity, IdentityDirectory, Role, UserAccount, UserId};
use crate::error::NotFoundError;

/// Field-wise profile update; absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<BTreeSet<String>>,
    pub current_position: Option<String>,
    pub years_of_experience: Option<u32>,
    pub company_name: Option<String>,
    pub company_website: Option<String>,
}

impl ProfilePatch {
    fn apply(self, account: &mut UserAccount) {
        let profile = &mut account.profile;
        let text_fields = [
            (self.first_name, &mut profile.first_name),
            (self.last_name, &mut profile.last_name),
            (self.phone, &mut profile.phone),
            (self.location, &mut profile.location),
            (self.bio, &mut profile.bio),
            (self.current_position, &mut profile.current_position),
            (self.company_name, &mut profile.company_name),
            (self.company_website, &mut profile.company_website),
        ];
        for (value, slot) in text_fields {
            if value.is_some() {
                *slot = value;
            }
        }
        if let Some(skills) = self.skills {
            profile.skills = skills;
        }
        if let Some(years) = self.years_of_experience {
            profile.years_of_experience = Some(years);
        }
    }
}

pub struct ProfileService {
    identities: Arc<dyn IdentityDirectory>,
    resumes: Arc<dyn ResumeStore>,
}

impl ProfileService {
    pub fn new(identities: Arc<dyn IdentityDirectory>, resumes: Arc<dyn ResumeStore>) -> Self {
        Self {
            identities,
            resumes,
        }
    }

    pub fn me(&self, identity: &Identity) -> Result<UserAccount, ProfileServiceError> {
        self.get(&identity.id)
    }

    pub fn get(&self, id: &UserId) -> Result<UserAccount, ProfileServiceError> {
        Ok(self
            .identities
            .fetch(id)?
            .ok_or_else(|| NotFoundError::new("user", id))?)
    }

    /// Only the account holder, or an admin, may edit a profile.
    pub fn update(
        &self,
        id: &UserId,
        patch: ProfilePatch,
        acting: &Identity,
    ) -> Result<UserAccount, ProfileServiceError> {
        let mut account = self.get(id)?;
        if acting.role != Role::Admin && !AuthorizationGuard::owns_resource(&acting.id, &account.id) {
            warn!(user_id = %id, acting_id = %acting.id, "profile update refused");
            return Err(AuthorizationError {
                identity: acting.id.clone(),
                action: "update this profile",
            }
            .into());
        }

        patch.apply(&mut account);
        account.updated_at = Utc::now();
        Ok(self.identities.update(account)?)
    }

    pub fn list_job_seekers(&self) -> Result<Vec<UserAccount>, ProfileServiceError> {
        let mut seekers = self.identities.list_by_role(Role::JobSeeker)?;
        seekers.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(seekers)
    }

    /// Store an uploaded resume and point the profile at it.
    ///
    /// When the profile cannot be saved the freshly stored object is removed again.
    pub async fn attach_resume(
        &self,
        id: &UserId,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<UserAccount, ProfileServiceError> {
        let mut account = self.get(id)?;
        let url = self.resumes.upload(body, content_type).await?;

        account.profile.resume_url = Some(url.clone());
        account.updated_at = Utc::now();
        let stored = match self.identities.update(account) {
            Ok(stored) => stored,
            Err(err) => {
                if let Err(cleanup) = self.resumes.discard(&url).await {
                    warn!(user_id = %id, %url, error = %cleanup, "orphaned resume left in storage");
                }
                return Err(err.into());
            }
        };
        info!(user_id = %id, "resume attached to profile");
        Ok(stored)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileServiceError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Forbidden(#[from] AuthorizationError),
    #[error(transparent)]
    Upload(#[from] ResumeStorageError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}
