//! Bearer credentials, request authentication and the ownership guard.

mod guard;
mod token;

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::json;
use tracing::debug;

pub use guard::{AuthorizationError, AuthorizationGuard};
pub use token::{Credential, CredentialClaims, CredentialKind, TokenError, TokenService};

use crate::directory::{DirectoryError, Identity, IdentityDirectory};

/// Resolves a bearer header into an active [`Identity`].
pub struct Authenticator {
    tokens: Arc<TokenService>,
    identities: Arc<dyn IdentityDirectory>,
}

impl Authenticator {
    pub fn new(tokens: Arc<TokenService>, identities: Arc<dyn IdentityDirectory>) -> Self {
        Self { tokens, identities }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let token = bearer_token(headers)?;
        let subject = self.tokens.verify_access_at(token, Utc::now())?;

        let account = self
            .identities
            .find_by_email(&subject)?
            .ok_or(AuthError::UnknownSubject)?;

        if !account.active {
            debug!(user_id = %account.id, "inactive account presented a credential");
            return Err(AuthError::Inactive);
        }
        Ok(account.identity())
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MalformedHeader)
}

/// Extractor yielding the authenticated caller. Requires an
/// `Extension<Arc<Authenticator>>` layer on the router.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity(pub Identity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(authenticator) =
            Extension::<Arc<Authenticator>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::NotConfigured)?;

        authenticator
            .authenticate(&parts.headers)
            .map(AuthenticatedIdentity)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer credential")]
    MissingCredential,
    #[error("authorization header must be `Bearer <token>`")]
    MalformedHeader,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("credential subject is not a known account")]
    UnknownSubject,
    #[error("account is deactivated")]
    Inactive,
    #[error("authentication is not configured for this route")]
    NotConfigured,
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::NotConfigured | AuthError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
