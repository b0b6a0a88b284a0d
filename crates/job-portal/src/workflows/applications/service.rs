use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use super::domain::{Application, ApplicationId, ApplicationStatus, ApplicationView, MatchBreakdown};
use super::profile_text::candidate_profile_text;
use super::repository::{ApplicationRepository, RepositoryError};
use crate::auth::{AuthorizationError, AuthorizationGuard};
use crate::directory::{DirectoryError, IdentityDirectory, JobDirectory, JobId, JobPosting, UserId};
use crate::error::NotFoundError;
use crate::scoring::{ScoreOutcome, ScoringOracle, ScoringRequest};

/// Score recorded when the oracle cannot be reached.
pub const NEUTRAL_MATCH_SCORE: f64 = 50.0;

/// Orchestrates submission, deduplication, scoring and status changes.
pub struct ApplicationWorkflow<R, O> {
    repository: Arc<R>,
    jobs: Arc<dyn JobDirectory>,
    identities: Arc<dyn IdentityDirectory>,
    oracle: Arc<O>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// `updated_at` strictly advances even when the clock has not ticked.
fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

impl<R, O> ApplicationWorkflow<R, O>
where
    R: ApplicationRepository + 'static,
    O: ScoringOracle + 'static,
{
    pub fn new(
        repository: Arc<R>,
        jobs: Arc<dyn JobDirectory>,
        identities: Arc<dyn IdentityDirectory>,
        oracle: Arc<O>,
    ) -> Self {
        Self {
            repository,
            jobs,
            identities,
            oracle,
        }
    }

    /// Submit an application for `job_seeker_id`. A scoring failure never fails
    /// the submission; the record is stored with the neutral score instead.
    pub async fn submit(
        &self,
        job_id: &JobId,
        job_seeker_id: &UserId,
        cover_letter: Option<String>,
    ) -> Result<Application, ApplicationWorkflowError> {
        if self
            .repository
            .find_by_job_and_seeker(job_id, job_seeker_id)?
            .is_some()
        {
            return Err(ApplicationWorkflowError::duplicate(job_id, job_seeker_id));
        }

        let job = self.job(job_id)?;
        let candidate = self
            .identities
            .fetch(job_seeker_id)?
            .ok_or_else(|| NotFoundError::new("job seeker", job_seeker_id))?;

        let request = ScoringRequest {
            candidate_profile_text: candidate_profile_text(&candidate),
            job_required_skills: job.required_skills.clone(),
            job_min_years_of_experience: job.min_years_of_experience,
            job_description: job.description.clone(),
        };

        let (match_score, match_breakdown) = match self.oracle.score(&request).await {
            ScoreOutcome::Scored(response) => {
                (response.overall_score, MatchBreakdown(response.breakdown))
            }
            ScoreOutcome::Unavailable(reason) => {
                warn!(%job_id, %job_seeker_id, %reason, "scoring degraded to neutral score");
                (NEUTRAL_MATCH_SCORE, MatchBreakdown::default())
            }
        };

        let now = Utc::now();
        let application = Application {
            id: next_application_id(),
            job_id: job_id.clone(),
            job_seeker_id: job_seeker_id.clone(),
            status: ApplicationStatus::Pending,
            match_score: Some(match_score),
            match_breakdown,
            cover_letter,
            applied_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(application).map_err(|err| match err {
            RepositoryError::Conflict => ApplicationWorkflowError::duplicate(job_id, job_seeker_id),
            other => other.into(),
        })?;

        info!(
            application_id = %stored.id,
            %job_id,
            %job_seeker_id,
            match_score,
            "application submitted"
        );
        Ok(stored)
    }

    /// Move an application to `new_status` on behalf of the job's recruiter.
    pub fn update_status(
        &self,
        application_id: &ApplicationId,
        new_status: ApplicationStatus,
        acting_recruiter_id: &UserId,
    ) -> Result<ApplicationView, ApplicationWorkflowError> {
        let mut application = self
            .repository
            .fetch(application_id)?
            .ok_or_else(|| NotFoundError::new("application", application_id))?;

        let job = self.job(&application.job_id)?;
        if !AuthorizationGuard::owns_resource(acting_recruiter_id, &job.recruiter_id) {
            warn!(%application_id, %acting_recruiter_id, "status update refused: not job owner");
            return Err(AuthorizationError {
                identity: acting_recruiter_id.clone(),
                action: "update applications for this job",
            }
            .into());
        }

        if !application.status.permits_transition(new_status) {
            return Err(ApplicationWorkflowError::InvalidTransition {
                from: application.status,
                to: new_status,
            });
        }

        let previous = application.status;
        application.status = new_status;
        application.updated_at = advance(application.updated_at);

        let stored = self.repository.update(application).map_err(|err| match err {
            RepositoryError::NotFound => NotFoundError::new("application", application_id).into(),
            other => ApplicationWorkflowError::from(other),
        })?;

        info!(
            %application_id,
            from = previous.label(),
            to = new_status.label(),
            "application status updated"
        );

        let mut view = stored.view().with_job(&job);
        if let Some(candidate) = self.identities.fetch(&stored.job_seeker_id)? {
            view = view.with_job_seeker(&candidate);
        }
        Ok(view)
    }

    /// Applications submitted by one job seeker, each with its job summary.
    pub fn list_by_job_seeker(
        &self,
        job_seeker_id: &UserId,
    ) -> Result<Vec<ApplicationView>, ApplicationWorkflowError> {
        let applications = self.repository.list_by_job_seeker(job_seeker_id)?;
        let mut views = Vec::with_capacity(applications.len());
        for application in applications {
            let view = application.view();
            let view = match self.jobs.fetch(&application.job_id)? {
                Some(job) => view.with_job(&job),
                None => view,
            };
            views.push(view);
        }
        Ok(views)
    }

    /// Applications for one job, visible only to the recruiter who owns it.
    pub fn list_by_job(
        &self,
        job_id: &JobId,
        acting_recruiter_id: &UserId,
    ) -> Result<Vec<ApplicationView>, ApplicationWorkflowError> {
        let job = self.job(job_id)?;
        if !AuthorizationGuard::owns_resource(acting_recruiter_id, &job.recruiter_id) {
            warn!(%job_id, %acting_recruiter_id, "application listing refused: not job owner");
            return Err(AuthorizationError {
                identity: acting_recruiter_id.clone(),
                action: "view applications for this job",
            }
            .into());
        }

        let applications = self.repository.list_by_job(job_id)?;
        let mut views = Vec::with_capacity(applications.len());
        for application in applications {
            let mut view = application.view().with_job(&job);
            if let Some(candidate) = self.identities.fetch(&application.job_seeker_id)? {
                view = view.with_job_seeker(&candidate);
            }
            views.push(view);
        }
        Ok(views)
    }

    fn job(&self, job_id: &JobId) -> Result<JobPosting, ApplicationWorkflowError> {
        Ok(self
            .jobs
            .fetch(job_id)?
            .ok_or_else(|| NotFoundError::new("job", job_id))?)
    }
}

/// Error raised by the application workflow.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationWorkflowError {
    #[error("job seeker {job_seeker_id} already applied to job {job_id}")]
    DuplicateApplication { job_id: JobId, job_seeker_id: UserId },
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Forbidden(#[from] AuthorizationError),
    #[error("cannot move an application from {} to {}", from.label(), to.label())]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl ApplicationWorkflowError {
    fn duplicate(job_id: &JobId, job_seeker_id: &UserId) -> Self {
        Self::DuplicateApplication {
            job_id: job_id.clone(),
            job_seeker_id: job_seeker_id.clone(),
        }
    }
}
