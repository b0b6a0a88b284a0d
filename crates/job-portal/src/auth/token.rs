use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AuthConfig;

/// Which purpose a credential was minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    Access,
    Refresh,
}

/// Claims carried inside every signed credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    pub sub: String,
    pub kind: CredentialKind,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly minted credential together with its decoded timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub subject: String,
    pub kind: CredentialKind,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("credential is invalid")]
    Invalid,
    #[error("credential has expired")]
    Expired,
}

/// Mints and verifies HMAC-signed bearer credentials.
///
/// The signing secret and both lifetimes are fixed at construction. There is no
/// revocation list: a credential is valid iff its signature verifies and its
/// expiry has not passed. Refresh credentials are not rotated by [`refresh`],
/// so one stays reusable until its own expiry.
///
/// [`refresh`]: TokenService::refresh
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.signing_secret.as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is checked against the caller-supplied clock in `verify_at`
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn issue_access(&self, subject: &str) -> Result<Credential, TokenError> {
        self.issue_access_at(subject, Utc::now())
    }

    pub fn issue_refresh(&self, subject: &str) -> Result<Credential, TokenError> {
        self.issue_refresh_at(subject, Utc::now())
    }

    pub fn issue_access_at(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<Credential, TokenError> {
        self.sign(subject, CredentialKind::Access, self.access_ttl, now)
    }

    pub fn issue_refresh_at(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<Credential, TokenError> {
        self.sign(subject, CredentialKind::Refresh, self.refresh_ttl, now)
    }

    /// Verify a credential of any kind and return its subject.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, Utc::now()).map(|claims| claims.sub)
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<CredentialClaims, TokenError> {
        let data = decode::<CredentialClaims>(token, &self.decoding, &self.validation).map_err(
            |err| {
                debug!(error = %err, "credential rejected");
                TokenError::Invalid
            },
        )?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }

    /// Verify an access credential presented as a bearer token.
    pub fn verify_access_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = self.verify_at(token, now)?;
        match claims.kind {
            CredentialKind::Access => Ok(claims.sub),
            CredentialKind::Refresh => Err(TokenError::Invalid),
        }
    }

    /// Mint a new access credential from a valid refresh credential. The presented
    /// refresh credential is left untouched.
    pub fn refresh(&self, refresh_token: &str) -> Result<Credential, TokenError> {
        self.refresh_at(refresh_token, Utc::now())
    }

    pub fn refresh_at(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Credential, TokenError> {
        let claims = self.verify_at(refresh_token, now)?;
        if claims.kind != CredentialKind::Refresh {
            return Err(TokenError::Invalid);
        }
        self.issue_access_at(&claims.sub, now)
    }

    fn sign(
        &self,
        subject: &str,
        kind: CredentialKind,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Credential, TokenError> {
        let iat = now.timestamp();
        let exp = iat.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));
        let claims = CredentialClaims {
            sub: subject.to_string(),
            kind,
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Invalid)?;

        Ok(Credential {
            token,
            subject: claims.sub,
            kind,
            issued_at: timestamp(iat),
            expires_at: timestamp(exp),
        })
    }
}

fn timestamp(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
