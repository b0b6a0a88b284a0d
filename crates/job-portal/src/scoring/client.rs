use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use super::{ScoreOutcome, ScoringOracle, ScoringRequest, ScoringResponse, ScoringUnavailable};
use crate::config::ScoringConfig;

const PREDICT_PATH: &str = "predict-score";

/// HTTP client for the scoring oracle with a hard per-call timeout.
#[derive(Debug, Clone)]
pub struct HttpScoringClient {
    http: Client,
    endpoint: Url,
    timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringClientError {
    #[error("ML_SERVICE_URL '{url}' is not a valid base URL")]
    InvalidBaseUrl { url: String },
    #[error("failed to build scoring http client: {0}")]
    Build(#[from] reqwest::Error),
}

impl HttpScoringClient {
    pub fn new(config: &ScoringConfig) -> Result<Self, ScoringClientError> {
        let invalid = || ScoringClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
        };

        let mut base = Url::parse(config.base_url.trim()).map_err(|_| invalid())?;
        if base.cannot_be_a_base() {
            return Err(invalid());
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(PREDICT_PATH).map_err(|_| invalid())?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint,
            timeout: config.timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn call(&self, request: &ScoringRequest) -> Result<ScoringResponse, ScoringUnavailable> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoringUnavailable::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(classify)?;
        serde_json::from_slice::<ScoringResponse>(&body)
            .map_err(|err| ScoringUnavailable::Malformed(err.to_string()))
    }
}

fn classify(err: reqwest::Error) -> ScoringUnavailable {
    if err.is_timeout() {
        ScoringUnavailable::Timeout
    } else {
        ScoringUnavailable::Transport(err.to_string())
    }
}

#[async_trait]
impl ScoringOracle for HttpScoringClient {
    async fn score(&self, request: &ScoringRequest) -> ScoreOutcome {
        debug!(endpoint = %self.endpoint, "requesting match score");
        // reqwest's own timeout covers the transfer; this bounds everything else
        let result = match tokio::time::timeout(self.timeout, self.call(request)).await {
            Ok(result) => result,
            Err(_) => Err(ScoringUnavailable::Timeout),
        };
        ScoreOutcome::from(result)
    }
}
