//! User-service collaborator: registration, lockout, credential login.
//!
//! `UserStore` is the seam the login/registration flows call through;
//! `PgUserStore` is the Postgres implementation. All mutable account state
//! (records, lockout counters) lives behind this interface; the flows only
//! pass the pool handle along and never own it.

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use std::{future::Future, pin::Pin};
use tracing::{info_span, Instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Failed logins at or above this count lock the account.
const MAX_FAILED_LOGINS: i32 = 5;

/// A user record as returned to API callers. The password never leaves the
/// store.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Fields accepted when creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub type StoreResult<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, sqlx::Error>> + Send + 'a>>;

/// Asynchronous user-service interface consumed by the auth flows.
pub trait UserStore: Send + Sync {
    /// Create an account; `None` signals the username is already taken.
    fn register<'a>(
        &'a self,
        pool: &'a PgPool,
        fields: &'a NewUser,
    ) -> StoreResult<'a, Option<Identity>>;

    /// Whether the identifier is currently locked out. Pure query.
    fn is_locked<'a>(&'a self, pool: &'a PgPool, username: &'a str) -> StoreResult<'a, bool>;

    /// Verify credentials; `None` for unknown user and wrong password alike.
    fn login<'a>(
        &'a self,
        pool: &'a PgPool,
        username: &'a str,
        password: &'a str,
    ) -> StoreResult<'a, Option<Identity>>;
}

/// Postgres-backed store. Password hashing is delegated to pgcrypto, so no
/// hash material or algorithm choice exists in-process.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgUserStore;

impl UserStore for PgUserStore {
    fn register<'a>(
        &'a self,
        pool: &'a PgPool,
        fields: &'a NewUser,
    ) -> StoreResult<'a, Option<Identity>> {
        Box::pin(async move {
            let query = "INSERT INTO users (username, email, password) \
                 VALUES ($1, $2, crypt($3, gen_salt('bf'))) \
                 ON CONFLICT DO NOTHING \
                 RETURNING id, username, email";
            let span = info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "INSERT",
                db.statement = query
            );
            let row = sqlx::query(query)
                .bind(&fields.username)
                .bind(&fields.email)
                .bind(&fields.password)
                .fetch_optional(pool)
                .instrument(span)
                .await?;

            Ok(row.map(|row| Identity {
                id: row.get("id"),
                username: row.get("username"),
                email: row.get("email"),
            }))
        })
    }

    fn is_locked<'a>(&'a self, pool: &'a PgPool, username: &'a str) -> StoreResult<'a, bool> {
        Box::pin(async move {
            let query = "SELECT failed_logins >= $2 AS locked FROM users WHERE username = $1";
            let span = info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "SELECT",
                db.statement = query
            );
            let row = sqlx::query(query)
                .bind(username)
                .bind(MAX_FAILED_LOGINS)
                .fetch_optional(pool)
                .instrument(span)
                .await?;

            // Unknown identifiers are not locked; login rejects them later
            // without telling the two cases apart.
            Ok(row.map_or(false, |row| row.get("locked")))
        })
    }

    fn login<'a>(
        &'a self,
        pool: &'a PgPool,
        username: &'a str,
        password: &'a str,
    ) -> StoreResult<'a, Option<Identity>> {
        Box::pin(async move {
            let query = "SELECT id, username, email, \
                 password = crypt($2, password) AS verified \
                 FROM users WHERE username = $1";
            let span = info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "SELECT",
                db.statement = query
            );
            let row = sqlx::query(query)
                .bind(username)
                .bind(password)
                .fetch_optional(pool)
                .instrument(span)
                .await?;

            let Some(row) = row else {
                return Ok(None);
            };

            let verified: bool = row.get("verified");
            if verified {
                reset_failed_logins(pool, username).await?;

                Ok(Some(Identity {
                    id: row.get("id"),
                    username: row.get("username"),
                    email: row.get("email"),
                }))
            } else {
                record_failed_login(pool, username).await?;

                Ok(None)
            }
        })
    }
}

async fn reset_failed_logins(pool: &PgPool, username: &str) -> Result<(), sqlx::Error> {
    let query = "UPDATE users SET failed_logins = 0 WHERE username = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(username)
        .execute(pool)
        .instrument(span)
        .await?;

    Ok(())
}

async fn record_failed_login(pool: &PgPool, username: &str) -> Result<(), sqlx::Error> {
    let query = "UPDATE users SET failed_logins = failed_logins + 1 WHERE username = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(username)
        .execute(pool)
        .instrument(span)
        .await?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
    use std::time::Duration;

    /// Lazily-connected pool pointing nowhere; queries against it fail fast.
    pub(crate) fn unreachable_pool() -> PgPool {
        let options = PgConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .username("invalid")
            .database("invalid")
            .ssl_mode(PgSslMode::Disable);
        PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy_with(options)
    }

    #[tokio::test]
    async fn register_surfaces_db_failure() {
        let pool = unreachable_pool();
        let fields = NewUser {
            username: "newuser".to_string(),
            email: "new@example.com".to_string(),
            password: "Password123!".to_string(),
        };

        let result = PgUserStore.register(&pool, &fields).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn is_locked_surfaces_db_failure() {
        let pool = unreachable_pool();
        let result = PgUserStore.is_locked(&pool, "testuser").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn login_surfaces_db_failure() {
        let pool = unreachable_pool();
        let result = PgUserStore.login(&pool, "testuser", "Password123!").await;
        assert!(result.is_err());
    }

    #[test]
    fn identity_serializes_all_fields() -> Result<(), serde_json::Error> {
        let identity = Identity {
            id: Uuid::nil(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
        };
        let value = serde_json::to_value(&identity)?;
        assert_eq!(
            value,
            serde_json::json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "username": "testuser",
                "email": "test@example.com",
            })
        );
        Ok(())
    }
}
