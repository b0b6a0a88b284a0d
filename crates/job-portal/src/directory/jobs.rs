use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DirectoryError, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Active,
    Closed,
    Draft,
}

/// A recruiter's job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: JobId,
    pub recruiter_id: UserId,
    pub title: String,
    pub description: String,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub min_salary: Option<u64>,
    pub max_salary: Option<u64>,
    pub currency: String,
    pub required_skills: BTreeSet<String>,
    pub min_years_of_experience: Option<u32>,
    pub education_level: Option<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl JobPosting {
    /// Case-insensitive keyword match over title, description and company.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [
            Some(self.title.as_str()),
            Some(self.description.as_str()),
            self.company_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Storage abstraction for job postings.
pub trait JobDirectory: Send + Sync {
    fn fetch(&self, id: &JobId) -> Result<Option<JobPosting>, DirectoryError>;
    fn insert(&self, job: JobPosting) -> Result<JobPosting, DirectoryError>;
    fn update(&self, job: JobPosting) -> Result<JobPosting, DirectoryError>;
    fn delete(&self, id: &JobId) -> Result<(), DirectoryError>;
    fn list_by_recruiter(&self, recruiter_id: &UserId) -> Result<Vec<JobPosting>, DirectoryError>;
    fn list_active(&self) -> Result<Vec<JobPosting>, DirectoryError>;

    fn search_active(&self, term: &str) -> Result<Vec<JobPosting>, DirectoryError> {
        Ok(self
            .list_active()?
            .into_iter()
            .filter(|job| job.matches(term))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting() -> JobPosting {
        let now = Utc::now();
        JobPosting {
            id: JobId("job-000001".to_string()),
            recruiter_id: UserId("usr-000001".to_string()),
            title: "Senior Backend Developer".to_string(),
            description: "Scalable microservices in Go".to_string(),
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

    #[test]
    fn matches_title_description_and_company() {
        let job = posting();
        assert!(job.matches("backend"));
        assert!(job.matches("MICROSERVICES"));
        assert!(job.matches("techcorp"));
        assert!(!job.matches("frontend"));
        assert!(job.matches("  "));
    }
}
