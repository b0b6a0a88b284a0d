use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::auth::{Authenticator, TokenService};
use crate::config::AuthConfig;
use crate::directory::{
    IdentityDirectory, JobDirectory, JobId, JobPosting, Role, UserAccount, UserId, UserProfile,
};
pub(super) use crate::test_support::{account, posting, MemoryAccounts, MemoryJobs};
use crate::scoring::{ScoreOutcome, ScoringOracle, ScoringRequest, ScoringResponse, ScoringUnavailable};
use crate::workflows::applications::domain::{Application, ApplicationId};
use crate::workflows::applications::repository::{ApplicationRepository, RepositoryError};
use crate::workflows::applications::ApplicationWorkflow;

pub(super) const RECRUITER: &str = "usr-recruiter-1";
pub(super) const OTHER_RECRUITER: &str = "usr-recruiter-2";
pub(super) const SEEKER: &str = "usr-seeker-1";
pub(super) const JOB: &str = "job-backend";

#[derive(Default)]
pub(super) struct MemoryApplications {
    records: Mutex<HashMap<ApplicationId, Application>>,
}

impl MemoryApplications {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("applications mutex poisoned").len()
    }
}

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("applications mutex poisoned");
        let taken = guard.values().any(|existing| {
            existing.job_id == application.job_id
                && existing.job_seeker_id == application.job_seeker_id
        });
        if taken || guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("applications mutex poisoned");
        match guard.get_mut(&application.id) {
            Some(existing) => {
                *existing = application.clone();
                Ok(application)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("applications mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_job_and_seeker(
        &self,
        job_id: &JobId,
        job_seeker_id: &UserId,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("applications mutex poisoned");
        Ok(guard
            .values()
            .find(|record| &record.job_id == job_id && &record.job_seeker_id == job_seeker_id)
            .cloned())
    }

    fn list_by_job(&self, job_id: &JobId) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.records.lock().expect("applications mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.job_id == job_id)
            .cloned()
            .collect())
    }

    fn list_by_job_seeker(
        &self,
        job_seeker_id: &UserId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.records.lock().expect("applications mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.job_seeker_id == job_seeker_id)
            .cloned()
            .collect())
    }
}

/// Lookup never sees an existing record but the insert refuses, as when a
/// concurrent submission wins the race.
pub(super) struct RacingApplications;

impl ApplicationRepository for RacingApplications {
    fn insert(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::NotFound)
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(None)
    }

    fn find_by_job_and_seeker(
        &self,
        _job_id: &JobId,
        _job_seeker_id: &UserId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(None)
    }

    fn list_by_job(&self, _job_id: &JobId) -> Result<Vec<Application>, RepositoryError> {
        Ok(Vec::new())
    }

    fn list_by_job_seeker(
        &self,
        _job_seeker_id: &UserId,
    ) -> Result<Vec<Application>, RepositoryError> {
        Ok(Vec::new())
    }
}

/// Oracle answering every request with the same response and remembering
/// what it was asked.
pub(super) struct FixedOracle {
    response: ScoringResponse,
    requests: Mutex<Vec<ScoringRequest>>,
}

impl FixedOracle {
    pub(super) fn new(overall_score: f64, breakdown: &[(&str, f64)]) -> Self {
        Self {
            response: ScoringResponse {
                overall_score,
                skill_match_scores: BTreeMap::new(),
                breakdown: breakdown
                    .iter()
                    .map(|(key, value)| (key.to_string(), *value))
                    .collect(),
                extracted_skills: BTreeSet::new(),
            },
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn requests(&self) -> Vec<ScoringRequest> {
        self.requests.lock().expect("oracle mutex poisoned").clone()
    }
}

#[async_trait]
impl ScoringOracle for FixedOracle {
    async fn score(&self, request: &ScoringRequest) -> ScoreOutcome {
        self.requests
            .lock()
            .expect("oracle mutex poisoned")
            .push(request.clone());
        ScoreOutcome::from(Ok(self.response.clone()))
    }
}

pub(super) struct UnavailableOracle;

#[async_trait]
impl ScoringOracle for UnavailableOracle {
    async fn score(&self, _request: &ScoringRequest) -> ScoreOutcome {
        ScoreOutcome::Unavailable(ScoringUnavailable::Transport("connection refused".to_string()))
    }
}

pub(super) fn seeker() -> UserAccount {
    let mut account = account(SEEKER, "jobseeker@demo.com", Role::JobSeeker);
    account.profile = UserProfile {
        first_name: Some("John".to_string()),
        last_name: Some("Doe".to_string()),
        current_position: Some("Software Engineer".to_string()),
        years_of_experience: Some(4),
        skills: ["Go".to_string(), "SQL".to_string()].into_iter().collect(),
        ..UserProfile::default()
    };
    account
}

pub(super) fn job() -> JobPosting {
    let mut job = posting(JOB, RECRUITER, "Senior Backend Developer");
    job.description = "Build scalable services".to_string();
    job.location = Some("Remote".to_string());
    job.employment_type = Some("FULL_TIME".to_string());
    job.min_salary = Some(120_000);
    job.max_salary = Some(160_000);
    job.required_skills = ["Go".to_string(), "SQL".to_string()].into_iter().collect();
    job.min_years_of_experience = Some(3);
    job
}

pub(super) struct Fixture<O> {
    pub workflow: Arc<ApplicationWorkflow<MemoryApplications, O>>,
    pub repository: Arc<MemoryApplications>,
    pub accounts: Arc<MemoryAccounts>,
    pub oracle: Arc<O>,
}

pub(super) fn fixture<O: ScoringOracle + 'static>(oracle: O) -> Fixture<O> {
    let repository = Arc::new(MemoryApplications::default());
    let jobs = Arc::new(MemoryJobs::default());
    let accounts = Arc::new(MemoryAccounts::default());
    let oracle = Arc::new(oracle);

    jobs.insert(job()).expect("seed job");
    accounts.insert(seeker()).expect("seed seeker");
    accounts
        .insert(account(RECRUITER, "recruiter@demo.com", Role::Recruiter))
        .expect("seed recruiter");
    accounts
        .insert(account(OTHER_RECRUITER, "other@demo.com", Role::Recruiter))
        .expect("seed other recruiter");

    let workflow = Arc::new(ApplicationWorkflow::new(
        repository.clone(),
        jobs,
        accounts.clone(),
        oracle.clone(),
    ));

    Fixture {
        workflow,
        repository,
        accounts,
        oracle,
    }
}

pub(super) fn scored_fixture() -> Fixture<FixedOracle> {
    fixture(FixedOracle::new(82.5, &[("skills", 0.9), ("experience", 0.75)]))
}

pub(super) fn authenticator(accounts: Arc<MemoryAccounts>) -> (Arc<Authenticator>, Arc<TokenService>) {
    let tokens = Arc::new(TokenService::new(&AuthConfig {
        signing_secret: "applications-test-secret".to_string(),
        access_ttl: Duration::from_secs(600),
        refresh_ttl: Duration::from_secs(6_000),
    }));
    (
        Arc::new(Authenticator::new(tokens.clone(), accounts)),
        tokens,
    )
}

pub(super) fn id(raw: &str) -> UserId {
    UserId(raw.to_string())
}

pub(super) fn job_id() -> JobId {
    JobId(JOB.to_string())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
