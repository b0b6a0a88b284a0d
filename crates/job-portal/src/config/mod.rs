use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEVELOPMENT_SIGNING_SECRET: &str = "job-portal-development-secret-change-me";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
///
/// Loaded once at startup and never mutated afterwards; components receive the
/// pieces they need at construction time.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
    pub scoring: ScoringConfig,
    pub storage: StorageConfig,
    pub seed_demo_data: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let signing_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingSigningSecret)
            }
            _ => DEVELOPMENT_SIGNING_SECRET.to_string(),
        };

        let auth = AuthConfig {
            signing_secret,
            access_ttl: seconds_var("JWT_ACCESS_TTL_SECS", 86_400)?,
            refresh_ttl: seconds_var("JWT_REFRESH_TTL_SECS", 604_800)?,
        };

        let scoring = ScoringConfig {
            base_url: env::var("ML_SERVICE_URL")
                .unwrap_or_else(|_| "http://ml-engine:5000".to_string()),
            timeout: seconds_var("ML_SERVICE_TIMEOUT_SECS", 5)?,
        };

        let storage = StorageConfig {
            resume_dir: env::var("RESUME_STORAGE_DIR")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            public_base_url: env::var("RESUME_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://{host}:{port}/files")),
        };

        let seed_demo_data = bool_var("APP_SEED_DEMO_DATA", true)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            auth,
            scoring,
            storage,
            seed_demo_data,
        })
    }
}

fn seconds_var(name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    let seconds = match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidDuration { name })?,
        Err(_) => default,
    };

    if seconds == 0 {
        return Err(ConfigError::InvalidDuration { name });
    }
    Ok(Duration::from_secs(seconds))
}

fn bool_var(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidFlag { name }),
        },
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Credential signing material and lifetimes.
#[derive(Clone)]
pub struct AuthConfig {
    pub signing_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Location of the external scoring oracle.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// Where uploaded resumes land and how their URLs are published.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub resume_dir: Option<PathBuf>,
    pub public_base_url: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingSigningSecret,
    InvalidDuration { name: &'static str },
    InvalidFlag { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingSigningSecret => {
                write!(f, "JWT_SECRET must be set when APP_ENV is production")
            }
            ConfigError::InvalidDuration { name } => {
                write!(f, "{name} must be a positive number of seconds")
            }
            ConfigError::InvalidFlag { name } => write!(f, "{name} must be true or false"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::MissingSigningSecret
            | ConfigError::InvalidDuration { .. }
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}
