//! Credential verification for the login flow.
//!
//! Two capabilities cover every identifier: the configured bootstrap
//! (administrative) account is checked in-process, everything else is
//! delegated to the user store. `AuthBackend::select` picks the path once,
//! so no other code needs to know the bootstrap account exists.

use crate::ligilo::users::{Identity, UserStore};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

/// The single administrative account configured at startup.
#[derive(Debug, Clone)]
pub struct BootstrapAccount {
    username: String,
    password: SecretString,
}

impl BootstrapAccount {
    #[must_use]
    pub fn new(username: String, password: SecretString) -> Self {
        Self { username, password }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Check a credential pair against the bootstrap account.
    ///
    /// Plain string equality; not a constant-time comparison. A mismatch is
    /// reported at warning level so repeated attempts stay visible to
    /// operators while the caller simply gets `None`.
    #[must_use]
    pub fn authenticate(&self, username: &str, password: &str) -> Option<Identity> {
        if username == self.username && password == self.password.expose_secret() {
            Some(Identity {
                id: Uuid::nil(),
                username: self.username.clone(),
                email: String::new(),
            })
        } else {
            warn!(username, "bootstrap authentication failed");

            None
        }
    }
}

/// Which verification path a login attempt takes.
#[derive(Debug)]
pub enum AuthBackend<'a, S> {
    Bootstrap(&'a BootstrapAccount),
    Service(&'a S),
}

impl<'a, S: UserStore> AuthBackend<'a, S> {
    /// Pick the path for `username`: the bootstrap account when it matches,
    /// the user store otherwise.
    pub fn select(bootstrap: &'a BootstrapAccount, store: &'a S, username: &str) -> Self {
        if username == bootstrap.username() {
            Self::Bootstrap(bootstrap)
        } else {
            Self::Service(store)
        }
    }

    /// Verify the credential pair. `None` means rejection, with no
    /// distinction between an unknown identifier and a wrong secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub async fn authenticate(
        &self,
        pool: &PgPool,
        username: &str,
        password: &str,
    ) -> Result<Option<Identity>, sqlx::Error> {
        match self {
            Self::Bootstrap(account) => Ok(account.authenticate(username, password)),
            Self::Service(store) => store.login(pool, username, password).await,
        }
    }
}
