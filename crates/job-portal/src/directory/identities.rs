use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DirectoryError;

/// Identifier wrapper for portal accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    JobSeeker,
    Recruiter,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::JobSeeker => "job_seeker",
            Role::Recruiter => "recruiter",
            Role::Admin => "admin",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "job_seeker" | "jobseeker" => Some(Role::JobSeeker),
            "recruiter" => Some(Role::Recruiter),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Resolved principal the request layer hands to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

/// Editable profile details. Job-seeker fields feed the scoring request;
/// recruiter fields are informational.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub resume_url: Option<String>,
    #[serde(default)]
    pub skills: BTreeSet<String>,
    pub current_position: Option<String>,
    pub years_of_experience: Option<u32>,
    pub company_name: Option<String>,
    pub company_website: Option<String>,
}

/// Stored account record owned by the identity directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub active: bool,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            email: self.email.clone(),
            role: self.role,
            active: self.active,
        }
    }

    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.profile.first_name, &self.profile.last_name]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Storage abstraction for accounts.
pub trait IdentityDirectory: Send + Sync {
    fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, DirectoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DirectoryError>;
    /// Persist a new account; e-mail addresses are unique.
    fn insert(&self, account: UserAccount) -> Result<UserAccount, DirectoryError>;
    fn update(&self, account: UserAccount) -> Result<UserAccount, DirectoryError>;
    fn list_by_role(&self, role: Role) -> Result<Vec<UserAccount>, DirectoryError>;
}
