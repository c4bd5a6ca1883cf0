//! `TokenSigner` owns the signing secret and expiry policy.
//!
//! One instance is built at startup from `GlobalArgs` and shared read-only
//! across requests; issuance merges a relative TTL into an absolute `exp`
//! claim before signing.

use crate::token::{sign, verify, Algorithm, Error, TokenClaims};
use secrecy::{ExposeSecret, SecretString};
use std::time::{Duration, SystemTime};

/// Identity re-derived from a verified refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedUser {
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct TokenSigner {
    secret: SecretString,
    algorithm: Algorithm,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl TokenSigner {
    #[must_use]
    pub fn new(
        secret: SecretString,
        algorithm: Algorithm,
        access_token_ttl: Duration,
        refresh_token_ttl: Duration,
    ) -> Self {
        Self {
            secret,
            algorithm,
            access_token_ttl,
            refresh_token_ttl,
        }
    }

    /// Issue an access token for `sub`.
    ///
    /// The default TTL applies unless the caller supplies one; `extra`
    /// claims are merged into the signed payload.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue_access_token(
        &self,
        sub: &str,
        extra: serde_json::Map<String, serde_json::Value>,
        ttl: Option<Duration>,
    ) -> Result<String, Error> {
        self.issue(sub, extra, ttl.unwrap_or(self.access_token_ttl))
    }

    /// Issue a refresh token for `sub` with the refresh TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue_refresh_token(&self, sub: &str) -> Result<String, Error> {
        self.issue(sub, serde_json::Map::new(), self.refresh_token_ttl)
    }

    /// Verify a refresh token and return the subject it was issued for.
    ///
    /// # Errors
    ///
    /// Bad signature, malformed token and expiry all collapse into the same
    /// rejection for the caller; nothing distinguishes them downstream.
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshedUser, Error> {
        let claims = verify(
            token,
            self.secret.expose_secret().as_bytes(),
            self.algorithm,
            now_unix_seconds(),
        )?;

        Ok(RefreshedUser {
            username: claims.sub,
        })
    }

    fn issue(
        &self,
        sub: &str,
        extra: serde_json::Map<String, serde_json::Value>,
        ttl: Duration,
    ) -> Result<String, Error> {
        let now = now_unix_seconds();
        let ttl_seconds = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

        let claims = TokenClaims {
            sub: sub.to_string(),
            exp: now.saturating_add(ttl_seconds),
            iat: now,
            extra,
        };

        sign(self.secret.expose_secret().as_bytes(), self.algorithm, &claims)
    }
}

/// Unix seconds for token expiry claims.
fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
