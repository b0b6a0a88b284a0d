//! In-memory directories shared by unit tests across modules.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use chrono::Utc;

use crate::directory::{
    DirectoryError, IdentityDirectory, JobDirectory, JobId, JobPosting, JobStatus, Role,
    UserAccount, UserId, UserProfile,
};

#[derive(Default)]
pub(crate) struct MemoryJobs {
    jobs: Mutex<HashMap<JobId, JobPosting>>,
}

impl JobDirectory for MemoryJobs {
    fn fetch(&self, id: &JobId) -> Result<Option<JobPosting>, DirectoryError> {
        Ok(self.jobs.lock().expect("jobs mutex poisoned").get(id).cloned())
    }

    fn insert(&self, job: JobPosting) -> Result<JobPosting, DirectoryError> {
        self.jobs
            .lock()
            .expect("jobs mutex poisoned")
            .insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn update(&self, job: JobPosting) -> Result<JobPosting, DirectoryError> {
        let mut guard = self.jobs.lock().expect("jobs mutex poisoned");
        match guard.get_mut(&job.id) {
            Some(existing) => {
                *existing = job.clone();
                Ok(job)
            }
            None => Err(DirectoryError::NotFound),
        }
    }

    fn delete(&self, id: &JobId) -> Result<(), DirectoryError> {
        self.jobs
            .lock()
            .expect("jobs mutex poisoned")
            .remove(id)
            .map(|_| ())
            .ok_or(DirectoryError::NotFound)
    }

    fn list_by_recruiter(&self, recruiter_id: &UserId) -> Result<Vec<JobPosting>, DirectoryError> {
        let guard = self.jobs.lock().expect("jobs mutex poisoned");
        Ok(guard
            .values()
            .filter(|job| &job.recruiter_id == recruiter_id)
            .cloned()
            .collect())
    }

    fn list_active(&self) -> Result<Vec<JobPosting>, DirectoryError> {
        let guard = self.jobs.lock().expect("jobs mutex poisoned");
        Ok(guard
            .values()
            .filter(|job| job.status == JobStatus::Active)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct MemoryAccounts {
    accounts: Mutex<HashMap<UserId, UserAccount>>,
}

impl IdentityDirectory for MemoryAccounts {
    fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, DirectoryError> {
        Ok(self
            .accounts
            .lock()
            .expect("accounts mutex poisoned")
            .get(id)
            .cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DirectoryError> {
        let guard = self.accounts.lock().expect("accounts mutex poisoned");
        Ok(guard.values().find(|account| account.email == email).cloned())
    }

    fn insert(&self, account: UserAccount) -> Result<UserAccount, DirectoryError> {
        let mut guard = self.accounts.lock().expect("accounts mutex poisoned");
        if guard.values().any(|existing| existing.email == account.email) {
            return Err(DirectoryError::Conflict);
        }
        guard.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    fn update(&self, account: UserAccount) -> Result<UserAccount, DirectoryError> {
        let mut guard = self.accounts.lock().expect("accounts mutex poisoned");
        match guard.get_mut(&account.id) {
            Some(existing) => {
                *existing = account.clone();
                Ok(account)
            }
            None => Err(DirectoryError::NotFound),
        }
    }

    fn list_by_role(&self, role: Role) -> Result<Vec<UserAccount>, DirectoryError> {
        let guard = self.accounts.lock().expect("accounts mutex poisoned");
        Ok(guard
            .values()
            .filter(|account| account.role == role)
            .cloned()
            .collect())
    }
}

pub(crate) fn account(id: &str, email: &str, role: Role) -> UserAccount {
    let now = Utc::now();
    UserAccount {
        id: UserId(id.to_string()),
        email: email.to_string(),
        role,
        active: true,
        profile: UserProfile::default(),
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn posting(id: &str, recruiter: &str, title: &str) -> JobPosting {
    let now = Utc::now();
    JobPosting {
        id: JobId(id.to_string()),
        recruiter_id: UserId(recruiter.to_string()),
        title: title.to_string(),
        description: format!("{title} role"),
        company_name: Some("TechCorp Inc".to_string()),
        location: None,
        employment_type: None,
        min_salary: None,
        max_salary: None,
        currency: "USD".to_string(),
        required_skills: BTreeSet::new(),
        min_years_of_experience: None,
        education_level: None,
        status: JobStatus::Active,
        created_at: now,
        updated_at: now,
        expires_at: None,
    }
}
