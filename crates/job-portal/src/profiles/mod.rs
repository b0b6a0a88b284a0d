//! Account profiles and resume uploads.

mod router;
mod service;
mod storage;

pub use router::profile_router;
pub use service::{ProfilePatch, ProfileService, ProfileServiceError};
pub use storage::{ObjectStoreResumeStore, ResumeStorageError, ResumeStore, PDF_CONTENT_TYPE};
