//! Contracts for the account and job-posting collaborators.
//!
//! The core only reads and writes through these traits; concrete storage lives
//! with the service binary.

mod identities;
mod jobs;

pub use identities::{Identity, IdentityDirectory, Role, UserAccount, UserId, UserProfile};
pub use jobs::{JobDirectory, JobId, JobPosting, JobStatus};

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}
