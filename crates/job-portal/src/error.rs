use crate::auth::TokenError;
use crate::config::ConfigError;
use crate::directory::DirectoryError;
use crate::jobs::JobServiceError;
use crate::scoring::ScoringClientError;
use crate::telemetry::TelemetryError;
use crate::workflows::applications::ApplicationWorkflowError;
use std::fmt;

/// Process-level failure surfaced by the service binary.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Scoring(ScoringClientError),
    Storage(object_store::Error),
    Token(TokenError),
    Directory(DirectoryError),
    Jobs(JobServiceError),
    Applications(ApplicationWorkflowError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Scoring(err) => write!(f, "scoring client error: {}", err),
            AppError::Storage(err) => write!(f, "storage error: {}", err),
            AppError::Token(err) => write!(f, "credential error: {}", err),
            AppError::Directory(err) => write!(f, "directory error: {}", err),
            AppError::Jobs(err) => write!(f, "job posting error: {}", err),
            AppError::Applications(err) => write!(f, "application workflow error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Storage(err) => Some(err),
            AppError::Token(err) => Some(err),
            AppError::Directory(err) => Some(err),
            AppError::Jobs(err) => Some(err),
            AppError::Applications(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ScoringClientError> for AppError {
    fn from(value: ScoringClientError) -> Self {
        Self::Scoring(value)
    }
}

impl From<object_store::Error> for AppError {
    fn from(value: object_store::Error) -> Self {
        Self::Storage(value)
    }
}

impl From<TokenError> for AppError {
    fn from(value: TokenError) -> Self {
        Self::Token(value)
    }
}

impl From<DirectoryError> for AppError {
    fn from(value: DirectoryError) -> Self {
        Self::Directory(value)
    }
}

impl From<JobServiceError> for AppError {
    fn from(value: JobServiceError) -> Self {
        Self::Jobs(value)
    }
}

impl From<ApplicationWorkflowError> for AppError {
    fn from(value: ApplicationWorkflowError) -> Self {
        Self::Applications(value)
    }
}

/// A job, account or application that a request referred to does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

impl NotFoundError {
    pub fn new(entity: &'static str, id: impl fmt::Display) -> Self {
        Self {
            entity,
            id: id.to_string(),
        }
    }
}
