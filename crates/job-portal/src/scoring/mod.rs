//! Contract with the external candidate-scoring oracle.
//!
//! Callers never see a scoring failure as an error: [`ScoringOracle::score`]
//! returns a [`ScoreOutcome`] that is either `Scored` or `Unavailable`, and the
//! application workflow branches on it.

mod client;

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::{HttpScoringClient, ScoringClientError};

/// Request body for `POST /predict-score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRequest {
    #[serde(rename = "resumeText")]
    pub candidate_profile_text: String,
    pub job_required_skills: BTreeSet<String>,
    pub job_min_years_of_experience: Option<u32>,
    pub job_description: String,
}

/// Response body returned by the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResponse {
    pub overall_score: f64,
    #[serde(default)]
    pub skill_match_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub breakdown: BTreeMap<String, f64>,
    #[serde(default)]
    pub extracted_skills: BTreeSet<String>,
}

impl ScoringResponse {
    pub(crate) fn validate(self) -> Result<Self, ScoringUnavailable> {
        if !self.overall_score.is_finite() || !(0.0..=100.0).contains(&self.overall_score) {
            return Err(ScoringUnavailable::Malformed(format!(
                "overallScore {} outside 0..=100",
                self.overall_score
            )));
        }
        Ok(self)
    }
}

/// Why the oracle could not produce a score.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringUnavailable {
    #[error("scoring oracle timed out")]
    Timeout,
    #[error("scoring oracle unreachable: {0}")]
    Transport(String),
    #[error("scoring oracle answered with status {0}")]
    Status(u16),
    #[error("scoring oracle returned a malformed payload: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    Scored(ScoringResponse),
    Unavailable(ScoringUnavailable),
}

impl From<Result<ScoringResponse, ScoringUnavailable>> for ScoreOutcome {
    fn from(result: Result<ScoringResponse, ScoringUnavailable>) -> Self {
        match result.and_then(ScoringResponse::validate) {
            Ok(response) => ScoreOutcome::Scored(response),
            Err(reason) => ScoreOutcome::Unavailable(reason),
        }
    }
}

/// Anything able to score a candidate against a job.
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    async fn score(&self, request: &ScoringRequest) -> ScoreOutcome;
}
