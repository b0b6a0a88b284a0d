use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use job_portal::directory::{
    DirectoryError, IdentityDirectory, JobDirectory, JobId, JobPosting, JobStatus, Role,
    UserAccount, UserId,
};
use job_portal::workflows::applications::{
    Application, ApplicationId, ApplicationRepository, RepositoryError,
};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, String> {
    mutex.lock().map_err(|_| format!("{what} lock poisoned"))
}

#[derive(Default)]
pub(crate) struct InMemoryIdentityDirectory {
    accounts: Mutex<HashMap<UserId, UserAccount>>,
    sequence: AtomicU64,
}

impl InMemoryIdentityDirectory {
    pub(crate) fn next_id(&self) -> UserId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        UserId(format!("usr-{id:06}"))
    }

    pub(crate) fn is_empty(&self) -> bool {
        lock(&self.accounts, "identity directory")
            .map(|guard| guard.is_empty())
            .unwrap_or(true)
    }
}

impl IdentityDirectory for InMemoryIdentityDirectory {
    fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, DirectoryError> {
        let guard = lock(&self.accounts, "identity directory").map_err(DirectoryError::Unavailable)?;
        Ok(guard.get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DirectoryError> {
        let guard = lock(&self.accounts, "identity directory").map_err(DirectoryError::Unavailable)?;
        Ok(guard
            .values()
            .find(|account| account.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn insert(&self, account: UserAccount) -> Result<UserAccount, DirectoryError> {
        let mut guard =
            lock(&self.accounts, "identity directory").map_err(DirectoryError::Unavailable)?;
        let taken = guard.contains_key(&account.id)
            || guard
                .values()
                .any(|existing| existing.email.eq_ignore_ascii_case(&account.email));
        if taken {
            return Err(DirectoryError::Conflict);
        }
        guard.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    fn update(&self, account: UserAccount) -> Result<UserAccount, DirectoryError> {
        let mut guard =
            lock(&self.accounts, "identity directory").map_err(DirectoryError::Unavailable)?;
        match guard.get_mut(&account.id) {
            Some(existing) => {
                *existing = account.clone();
                Ok(account)
            }
            None => Err(DirectoryError::NotFound),
        }
    }

    fn list_by_role(&self, role: Role) -> Result<Vec<UserAccount>, DirectoryError> {
        let guard = lock(&self.accounts, "identity directory").map_err(DirectoryError::Unavailable)?;
        Ok(guard
            .values()
            .filter(|account| account.role == role)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryJobDirectory {
    jobs: Mutex<HashMap<JobId, JobPosting>>,
}

impl JobDirectory for InMemoryJobDirectory {
    fn fetch(&self, id: &JobId) -> Result<Option<JobPosting>, DirectoryError> {
        let guard = lock(&self.jobs, "job directory").map_err(DirectoryError::Unavailable)?;
        Ok(guard.get(id).cloned())
    }

    fn insert(&self, job: JobPosting) -> Result<JobPosting, DirectoryError> {
        let mut guard = lock(&self.jobs, "job directory").map_err(DirectoryError::Unavailable)?;
        if guard.contains_key(&job.id) {
            return Err(DirectoryError::Conflict);
        }
        guard.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn update(&self, job: JobPosting) -> Result<JobPosting, DirectoryError> {
        let mut guard = lock(&self.jobs, "job directory").map_err(DirectoryError::Unavailable)?;
        match guard.get_mut(&job.id) {
            Some(existing) => {
                *existing = job.clone();
                Ok(job)
            }
            None => Err(DirectoryError::NotFound),
        }
    }

    fn delete(&self, id: &JobId) -> Result<(), DirectoryError> {
        let mut guard = lock(&self.jobs, "job directory").map_err(DirectoryError::Unavailable)?;
        guard.remove(id).map(|_| ()).ok_or(DirectoryError::NotFound)
    }

    fn list_by_recruiter(&self, recruiter_id: &UserId) -> Result<Vec<JobPosting>, DirectoryError> {
        let guard = lock(&self.jobs, "job directory").map_err(DirectoryError::Unavailable)?;
        Ok(guard
            .values()
            .filter(|job| &job.recruiter_id == recruiter_id)
            .cloned()
            .collect())
    }

    fn list_active(&self) -> Result<Vec<JobPosting>, DirectoryError> {
        let guard = lock(&self.jobs, "job directory").map_err(DirectoryError::Unavailable)?;
        Ok(guard
            .values()
            .filter(|job| job.status == JobStatus::Active)
            .cloned()
            .collect())
    }
}

/// Applications keyed by id, with a (job, job seeker) index checked and
/// updated under the same lock as the insert.
#[derive(Default)]
pub(crate) struct InMemoryApplicationRepository {
    inner: Mutex<ApplicationTables>,
}

#[derive(Default)]
struct ApplicationTables {
    records: HashMap<ApplicationId, Application>,
    by_pair: HashMap<(JobId, UserId), ApplicationId>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.inner, "application repository")
            .map_err(RepositoryError::Unavailable)?;
        let pair = (application.job_id.clone(), application.job_seeker_id.clone());
        if guard.by_pair.contains_key(&pair) || guard.records.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.by_pair.insert(pair, application.id.clone());
        guard
            .records
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.inner, "application repository")
            .map_err(RepositoryError::Unavailable)?;
        match guard.records.get_mut(&application.id) {
            Some(existing) => {
                *existing = application.clone();
                Ok(application)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = lock(&self.inner, "application repository")
            .map_err(RepositoryError::Unavailable)?;
        Ok(guard.records.get(id).cloned())
    }

    fn find_by_job_and_seeker(
        &self,
        job_id: &JobId,
        job_seeker_id: &UserId,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = lock(&self.inner, "application repository")
            .map_err(RepositoryError::Unavailable)?;
        Ok(guard
            .by_pair
            .get(&(job_id.clone(), job_seeker_id.clone()))
            .and_then(|id| guard.records.get(id))
            .cloned())
    }

    fn list_by_job(&self, job_id: &JobId) -> Result<Vec<Application>, RepositoryError> {
        let guard = lock(&self.inner, "application repository")
            .map_err(RepositoryError::Unavailable)?;
        let mut records: Vec<Application> = guard
            .records
            .values()
            .filter(|record| &record.job_id == job_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(records)
    }

    fn list_by_job_seeker(
        &self,
        job_seeker_id: &UserId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let guard = lock(&self.inner, "application repository")
            .map_err(RepositoryError::Unavailable)?;
        let mut records: Vec<Application> = guard
            .records
            .values()
            .filter(|record| &record.job_seeker_id == job_seeker_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(records)
    }
}

/// Argon2id hash of an account password in PHC string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PasswordDigest(String);

impl PasswordDigest {
    pub(crate) fn new(password: &str) -> Result<Self, DirectoryError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| DirectoryError::Unavailable(format!("password hashing failed: {err}")))?;
        Ok(Self(phc.to_string()))
    }

    /// Malformed stored hashes never verify.
    pub(crate) fn verify(&self, password: &str) -> bool {
        match PasswordHash::new(&self.0) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// Encoded password hashes keyed by account id, kept apart from profile data.
#[derive(Default)]
pub(crate) struct CredentialStore {
    hashes: Mutex<HashMap<UserId, PasswordDigest>>,
}

impl CredentialStore {
    pub(crate) fn set(&self, id: &UserId, password: &str) -> Result<(), DirectoryError> {
        let digest = PasswordDigest::new(password)?;
        let mut guard = lock(&self.hashes, "credential store").map_err(DirectoryError::Unavailable)?;
        guard.insert(id.clone(), digest);
        Ok(())
    }

    /// `false` for unknown ids as well as wrong passwords.
    pub(crate) fn verify(&self, id: &UserId, password: &str) -> Result<bool, DirectoryError> {
        let guard = lock(&self.hashes, "credential store").map_err(DirectoryError::Unavailable)?;
        Ok(guard
            .get(id)
            .map(|digest| digest.verify(password))
            .unwrap_or(false))
    }
}
