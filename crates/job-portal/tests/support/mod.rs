#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use chrono::Utc;
use job_portal::directory::{
    DirectoryError, IdentityDirectory, JobDirectory, JobId, JobPosting, JobStatus, Role,
    UserAccount, UserId, UserProfile,
};
use job_portal::workflows::applications::{
    Application, ApplicationId, ApplicationRepository, RepositoryError,
};

#[derive(Default)]
pub struct Store {
    accounts: Mutex<HashMap<UserId, UserAccount>>,
    jobs: Mutex<HashMap<JobId, JobPosting>>,
    applications: Mutex<Vec<Application>>,
}

impl IdentityDirectory for Store {
    fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, DirectoryError> {
        Ok(self.accounts.lock().expect("accounts").get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DirectoryError> {
        let guard = self.accounts.lock().expect("accounts");
        Ok(guard.values().find(|account| account.email == email).cloned())
    }

    fn insert(&self, account: UserAccount) -> Result<UserAccount, DirectoryError> {
        self.accounts
            .lock()
            .expect("accounts")
            .insert(account.id.clone(), account.clone());
        Ok(account)
    }

    fn update(&self, account: UserAccount) -> Result<UserAccount, DirectoryError> {
        IdentityDirectory::insert(self, account)
    }

    fn list_by_role(&self, role: Role) -> Result<Vec<UserAccount>, DirectoryError> {
        let guard = self.accounts.lock().expect("accounts");
        Ok(guard.values().filter(|account| account.role == role).cloned().collect())
    }
}

impl JobDirectory for Store {
    fn fetch(&self, id: &JobId) -> Result<Option<JobPosting>, DirectoryError> {
        Ok(self.jobs.lock().expect("jobs").get(id).cloned())
    }

    fn insert(&self, job: JobPosting) -> Result<JobPosting, DirectoryError> {
        self.jobs.lock().expect("jobs").insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn update(&self, job: JobPosting) -> Result<JobPosting, DirectoryError> {
        JobDirectory::insert(self, job)
    }

    fn delete(&self, id: &JobId) -> Result<(), DirectoryError> {
        self.jobs.lock().expect("jobs").remove(id);
        Ok(())
    }

    fn list_by_recruiter(&self, recruiter_id: &UserId) -> Result<Vec<JobPosting>, DirectoryError> {
        let guard = self.jobs.lock().expect("jobs");
        Ok(guard
            .values()
            .filter(|job| &job.recruiter_id == recruiter_id)
            .cloned()
            .collect())
    }

    fn list_active(&self) -> Result<Vec<JobPosting>, DirectoryError> {
        let guard = self.jobs.lock().expect("jobs");
        Ok(guard
            .values()
            .filter(|job| job.status == JobStatus::Active)
            .cloned()
            .collect())
    }
}

impl ApplicationRepository for Store {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.applications.lock().expect("applications");
        if guard.iter().any(|existing| {
            existing.job_id == application.job_id
                && existing.job_seeker_id == application.job_seeker_id
        }) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.applications.lock().expect("applications");
        let slot = guard
            .iter_mut()
            .find(|existing| existing.id == application.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = application.clone();
        Ok(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.applications.lock().expect("applications");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn find_by_job_and_seeker(
        &self,
        job_id: &JobId,
        job_seeker_id: &UserId,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = self.applications.lock().expect("applications");
        Ok(guard
            .iter()
            .find(|record| &record.job_id == job_id && &record.job_seeker_id == job_seeker_id)
            .cloned())
    }

    fn list_by_job(&self, job_id: &JobId) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.applications.lock().expect("applications");
        Ok(guard.iter().filter(|record| &record.job_id == job_id).cloned().collect())
    }

    fn list_by_job_seeker(
        &self,
        job_seeker_id: &UserId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.applications.lock().expect("applications");
        Ok(guard
            .iter()
            .filter(|record| &record.job_seeker_id == job_seeker_id)
            .cloned()
            .collect())
    }
}

pub fn seeded_store() -> Store {
    let store = Store::default();
    let now = Utc::now();

    IdentityDirectory::insert(
        &store,
        UserAccount {
            id: UserId("usr-seeker".to_string()),
            email: "jobseeker@demo.com".to_string(),
            role: Role::JobSeeker,
            active: true,
            profile: UserProfile {
                first_name: Some("John".to_string()),
                last_name: Some("Doe".to_string()),
                years_of_experience: Some(5),
                skills: ["Java".to_string(), "Spring Boot".to_string()]
                    .into_iter()
                    .collect(),
                ..UserProfile::default()
            },
            created_at: now,
            updated_at: now,
        },
    )
    .expect("seed seeker");

    IdentityDirectory::insert(
        &store,
        UserAccount {
            id: UserId("usr-recruiter".to_string()),
            email: "recruiter@demo.com".to_string(),
            role: Role::Recruiter,
            active: true,
            profile: UserProfile::default(),
            created_at: now,
            updated_at: now,
        },
    )
    .expect("seed recruiter");

    JobDirectory::insert(
        &store,
        JobPosting {
            id: JobId("job-backend".to_string()),
            recruiter_id: UserId("usr-recruiter".to_string()),
            title: "Senior Backend Developer".to_string(),
            description: "Java and Spring Boot microservices".to_string(),
            company_name: Some("TechCorp Inc".to_string()),
            location: Some("San Francisco, CA".to_string()),
            employment_type: Some("FULL_TIME".to_string()),
            min_salary: Some(120_000),
            max_salary: Some(180_000),
            currency: "USD".to_string(),
            required_skills: ["Java".to_string(), "Spring Boot".to_string()]
                .into_iter()
                .collect::<BTreeSet<_>>(),
            min_years_of_experience: Some(5),
            education_level: Some("Bachelor's".to_string()),
            status: JobStatus::Active,
            created_at: now,
            updated_at: now,
            expires_at: None,
        },
    )
    .expect("seed job");

    store
}
