use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::{AuthorizationError, AuthorizationGuard};
use crate::directory::{DirectoryError, JobDirectory, JobId, JobPosting, JobStatus, UserId};
use crate::error::NotFoundError;

/// Postings stay open this long unless a recruiter closes them first.
pub const POSTING_LIFETIME_DAYS: i64 = 90;
const DEFAULT_CURRENCY: &str = "USD";

/// Fields a recruiter supplies when opening a posting.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub min_salary: Option<u64>,
    pub max_salary: Option<u64>,
    pub currency: Option<String>,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    pub min_years_of_experience: Option<u32>,
    pub education_level: Option<String>,
}

/// Field-wise update; absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub min_salary: Option<u64>,
    pub max_salary: Option<u64>,
    pub required_skills: Option<BTreeSet<String>>,
    pub min_years_of_experience: Option<u32>,
    pub education_level: Option<String>,
    pub status: Option<JobStatus>,
}

pub struct JobService {
    jobs: Arc<dyn JobDirectory>,
}

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_job_id() -> JobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobId(format!("job-{id:06}"))
}

impl JobService {
    pub fn new(jobs: Arc<dyn JobDirectory>) -> Self {
        Self { jobs }
    }

    pub fn create(&self, draft: JobDraft, recruiter_id: &UserId) -> Result<JobPosting, JobServiceError> {
        if draft.title.trim().is_empty() {
            return Err(JobServiceError::Validation("title must not be empty".to_string()));
        }
        if draft.description.trim().is_empty() {
            return Err(JobServiceError::Validation(
                "description must not be empty".to_string(),
            ));
        }
        check_salary_range(draft.min_salary, draft.max_salary)?;

        let now = Utc::now();
        let posting = JobPosting {
            id: next_job_id(),
            recruiter_id: recruiter_id.clone(),
            title: draft.title,
            description: draft.description,
            company_name: draft.company_name,
            location: draft.location,
            employment_type: draft.employment_type,
            min_salary: draft.min_salary,
            max_salary: draft.max_salary,
            currency: draft
                .currency
                .filter(|currency| !currency.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            required_skills: draft.required_skills,
            min_years_of_experience: draft.min_years_of_experience,
            education_level: draft.education_level,
            status: JobStatus::Active,
            created_at: now,
            updated_at: now,
            expires_at: Some(now + Duration::days(POSTING_LIFETIME_DAYS)),
        };

        let stored = self.jobs.insert(posting)?;
        info!(job_id = %stored.id, %recruiter_id, "job posted");
        Ok(stored)
    }

    pub fn get(&self, id: &JobId) -> Result<JobPosting, JobServiceError> {
        Ok(self
            .jobs
            .fetch(id)?
            .ok_or_else(|| NotFoundError::new("job", id))?)
    }

    pub fn list_active(&self) -> Result<Vec<JobPosting>, JobServiceError> {
        Ok(newest_first(self.jobs.list_active()?))
    }

    pub fn search(&self, term: &str) -> Result<Vec<JobPosting>, JobServiceError> {
        Ok(newest_first(self.jobs.search_active(term)?))
    }

    pub fn list_by_recruiter(&self, recruiter_id: &UserId) -> Result<Vec<JobPosting>, JobServiceError> {
        Ok(newest_first(self.jobs.list_by_recruiter(recruiter_id)?))
    }

    pub fn update(
        &self,
        id: &JobId,
        patch: JobPatch,
        acting_recruiter_id: &UserId,
    ) -> Result<JobPosting, JobServiceError> {
        let mut job = self.owned(id, acting_recruiter_id, "update this job")?;

        if let Some(title) = patch.title {
            job.title = title;
        }
        if let Some(description) = patch.description {
            job.description = description;
        }
        if let Some(location) = patch.location {
            job.location = Some(location);
        }
        if let Some(employment_type) = patch.employment_type {
            job.employment_type = Some(employment_type);
        }
        if let Some(min_salary) = patch.min_salary {
            job.min_salary = Some(min_salary);
        }
        if let Some(max_salary) = patch.max_salary {
            job.max_salary = Some(max_salary);
        }
        if let Some(skills) = patch.required_skills {
            job.required_skills = skills;
        }
        if let Some(years) = patch.min_years_of_experience {
            job.min_years_of_experience = Some(years);
        }
        if let Some(level) = patch.education_level {
            job.education_level = Some(level);
        }
        if let Some(status) = patch.status {
            job.status = status;
        }
        check_salary_range(job.min_salary, job.max_salary)?;
        job.updated_at = Utc::now();

        Ok(self.jobs.update(job)?)
    }

    pub fn delete(&self, id: &JobId, acting_recruiter_id: &UserId) -> Result<(), JobServiceError> {
        self.owned(id, acting_recruiter_id, "delete this job")?;
        self.jobs.delete(id)?;
        info!(job_id = %id, "job deleted");
        Ok(())
    }

    fn owned(
        &self,
        id: &JobId,
        acting_recruiter_id: &UserId,
        action: &'static str,
    ) -> Result<JobPosting, JobServiceError> {
        let job = self.get(id)?;
        if !AuthorizationGuard::owns_resource(acting_recruiter_id, &job.recruiter_id) {
            warn!(job_id = %id, %acting_recruiter_id, action, "job change refused: not owner");
            return Err(AuthorizationError {
                identity: acting_recruiter_id.clone(),
                action,
            }
            .into());
        }
        Ok(job)
    }
}

fn check_salary_range(min: Option<u64>, max: Option<u64>) -> Result<(), JobServiceError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(JobServiceError::Validation(format!(
            "minSalary {min} exceeds maxSalary {max}"
        ))),
        _ => Ok(()),
    }
}

fn newest_first(mut jobs: Vec<JobPosting>) -> Vec<JobPosting> {
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    jobs
}

#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Forbidden(#[from] AuthorizationError),
    #[error("invalid job posting: {0}")]
    Validation(String),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}
