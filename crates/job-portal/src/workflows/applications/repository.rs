use super::domain::{Application, ApplicationId};
use crate::directory::{JobId, UserId};

/// Storage abstraction so the workflow can be exercised in isolation.
///
/// Implementations must make `insert` atomic with respect to the
/// (job, job seeker) pair: a second record for the same pair is refused with
/// [`RepositoryError::Conflict`], even under concurrent submissions.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn update(&self, application: Application) -> Result<Application, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn find_by_job_and_seeker(
        &self,
        job_id: &JobId,
        job_seeker_id: &UserId,
    ) -> Result<Option<Application>, RepositoryError>;
    fn list_by_job(&self, job_id: &JobId) -> Result<Vec<Application>, RepositoryError>;
    fn list_by_job_seeker(&self, job_seeker_id: &UserId)
        -> Result<Vec<Application>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
