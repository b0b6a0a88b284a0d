use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::{JobId, JobPosting, JobStatus, UserAccount, UserId};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review stage of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Shortlisted,
    InterviewScheduled,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Reviewing => "REVIEWING",
            ApplicationStatus::Shortlisted => "SHORTLISTED",
            ApplicationStatus::InterviewScheduled => "INTERVIEW_SCHEDULED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Accepted => "ACCEPTED",
        }
    }

    /// Single place deciding whether a recruiter may move an application from
    /// `self` to `next`. Every pair is currently allowed, terminal states included.
    pub const fn permits_transition(self, _next: ApplicationStatus) -> bool {
        true
    }
}

/// Per-category detail accompanying a match score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchBreakdown(pub BTreeMap<String, f64>);

impl MatchBreakdown {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON text form exposed to API clients.
    pub fn serialized(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Stored application. At most one exists per (job, job seeker) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub job_seeker_id: UserId,
    pub status: ApplicationStatus,
    pub match_score: Option<f64>,
    pub match_breakdown: MatchBreakdown,
    pub cover_letter: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn view(&self) -> ApplicationView {
        ApplicationView {
            id: self.id.clone(),
            job_id: self.job_id.clone(),
            job_seeker_id: self.job_seeker_id.clone(),
            status: self.status,
            match_score: self.match_score,
            match_breakdown: self.match_breakdown.serialized(),
            cover_letter: self.cover_letter.clone(),
            applied_at: self.applied_at,
            updated_at: self.updated_at,
            job: None,
            job_seeker: None,
        }
    }
}

/// API representation, optionally enriched with job and candidate summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub job_seeker_id: UserId,
    pub status: ApplicationStatus,
    pub match_score: Option<f64>,
    pub match_breakdown: String,
    pub cover_letter: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_seeker: Option<CandidateSummary>,
}

impl ApplicationView {
    pub fn with_job(mut self, job: &JobPosting) -> Self {
        self.job = Some(JobSummary::from(job));
        self
    }

    pub fn with_job_seeker(mut self, account: &UserAccount) -> Self {
        self.job_seeker = Some(CandidateSummary::from(account));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: JobId,
    pub title: String,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub status: JobStatus,
}

impl From<&JobPosting> for JobSummary {
    fn from(job: &JobPosting) -> Self {
        Self {
            id: job.id.clone(),
            title: job.title.clone(),
            company_name: job.company_name.clone(),
            location: job.location.clone(),
            status: job.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSummary {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub current_position: Option<String>,
    pub years_of_experience: Option<u32>,
    pub skills: BTreeSet<String>,
    pub resume_url: Option<String>,
}

impl From<&UserAccount> for CandidateSummary {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.id.clone(),
            email: account.email.clone(),
            full_name: account.full_name(),
            current_position: account.profile.current_position.clone(),
            years_of_experience: account.profile.years_of_experience,
            skills: account.profile.skills.clone(),
            resume_url: account.profile.resume_url.clone(),
        }
    }
}
