//! Recruiter-owned job postings.

mod router;
mod service;

pub use router::{job_router, SearchQuery};
pub use service::{JobDraft, JobPatch, JobService, JobServiceError, POSTING_LIFETIME_DAYS};
