//! Job applications: submission with match scoring, recruiter review and
//! per-seeker / per-job listings.

pub mod domain;
pub mod profile_text;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationView, CandidateSummary,
    JobSummary, MatchBreakdown,
};
pub use profile_text::candidate_profile_text;
pub use repository::{ApplicationRepository, RepositoryError};
pub use router::{application_router, StatusChange, SubmitApplication};
pub use service::{ApplicationWorkflow, ApplicationWorkflowError, NEUTRAL_MATCH_SCORE};
