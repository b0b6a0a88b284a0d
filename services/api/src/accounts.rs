use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use job_portal::auth::{TokenError, TokenService};
use job_portal::directory::{
    DirectoryError, IdentityDirectory, Role, UserAccount, UserProfile,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::infra::{CredentialStore, InMemoryIdentityDirectory};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterRequest {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) role: String,
    #[serde(default)]
    pub(crate) first_name: Option<String>,
    #[serde(default)]
    pub(crate) last_name: Option<String>,
    #[serde(default)]
    pub(crate) company_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest {
    pub(crate) refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthResponse {
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
    pub(crate) token_type: &'static str,
    /// Access credential lifetime in milliseconds.
    pub(crate) expires_in: u64,
    pub(crate) user: UserAccount,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: &'static str,
}

/// Registration, password login and credential refresh.
pub(crate) struct AccountService {
    identities: Arc<InMemoryIdentityDirectory>,
    credentials: Arc<CredentialStore>,
    tokens: Arc<TokenService>,
}

impl AccountService {
    pub(crate) fn new(
        identities: Arc<InMemoryIdentityDirectory>,
        credentials: Arc<CredentialStore>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            identities,
            credentials,
            tokens,
        }
    }

    pub(crate) fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AccountError> {
        let email = request.email.trim().to_string();
        if !looks_like_email(&email) {
            return Err(AccountError::InvalidEmail);
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::WeakPassword);
        }
        let role = match Role::parse(&request.role) {
            Some(role @ (Role::JobSeeker | Role::Recruiter)) => role,
            _ => return Err(AccountError::UnsupportedRole(request.role)),
        };
        if self.identities.find_by_email(&email)?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let now = Utc::now();
        let account = UserAccount {
            id: self.identities.next_id(),
            email,
            role,
            active: true,
            profile: UserProfile {
                first_name: request.first_name,
                last_name: request.last_name,
                company_name: request.company_name,
                ..UserProfile::default()
            },
            created_at: now,
            updated_at: now,
        };
        let account = self.identities.insert(account).map_err(|err| match err {
            DirectoryError::Conflict => AccountError::EmailTaken,
            other => AccountError::Directory(other),
        })?;
        self.credentials.set(&account.id, &request.password)?;

        info!(user_id = %account.id, role = role.label(), "account registered");
        self.issue(account)
    }

    pub(crate) fn login(&self, request: LoginRequest) -> Result<AuthResponse, AccountError> {
        let account = self
            .identities
            .find_by_email(request.email.trim())?
            .ok_or(AccountError::InvalidCredentials)?;
        if !self.credentials.verify(&account.id, &request.password)? {
            warn!(user_id = %account.id, "login refused: bad password");
            return Err(AccountError::InvalidCredentials);
        }
        if !account.active {
            return Err(AccountError::Inactive);
        }
        self.issue(account)
    }

    pub(crate) fn refresh(&self, request: RefreshRequest) -> Result<RefreshResponse, AccountError> {
        let credential = self.tokens.refresh(&request.refresh_token)?;
        Ok(RefreshResponse {
            access_token: credential.token,
            token_type: "Bearer",
        })
    }

    fn issue(&self, account: UserAccount) -> Result<AuthResponse, AccountError> {
        let access = self.tokens.issue_access(&account.email)?;
        let refresh = self.tokens.issue_refresh(&account.email)?;
        Ok(AuthResponse {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: "Bearer",
            expires_in: u64::try_from(self.tokens.access_ttl().as_millis()).unwrap_or(u64::MAX),
            user: account,
        })
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum AccountError {
    #[error("email must be valid")]
    InvalidEmail,
    #[error("password must be at least 6 characters")]
    WeakPassword,
    #[error("role '{0}' cannot be registered")]
    UnsupportedRole(String),
    #[error("email already exists")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("account is deactivated")]
    Inactive,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let status = match &self {
            AccountError::InvalidEmail
            | AccountError::WeakPassword
            | AccountError::UnsupportedRole(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AccountError::EmailTaken => StatusCode::CONFLICT,
            AccountError::InvalidCredentials | AccountError::Token(_) => StatusCode::UNAUTHORIZED,
            AccountError::Inactive => StatusCode::FORBIDDEN,
            AccountError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub(crate) fn account_router(service: Arc<AccountService>) -> Router {
    Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/refresh", post(refresh_handler))
        .with_state(service)
}

async fn register_handler(
    State(service): State<Arc<AccountService>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AccountError> {
    Ok((StatusCode::CREATED, Json(service.register(request)?)))
}

async fn login_handler(
    State(service): State<Arc<AccountService>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AccountError> {
    Ok(Json(service.login(request)?))
}

async fn refresh_handler(
    State(service): State<Arc<AccountService>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AccountError> {
    Ok(Json(service.refresh(request)?))
}
