//! Core of the job portal: bearer credentials, job postings, profiles and the
//! application workflow with external match scoring.

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod jobs;
pub mod profiles;
pub mod scoring;
pub mod telemetry;
pub mod workflows;

#[cfg(test)]
pub(crate) mod test_support;
