use crate::ligilo::{
    handlers::{valid_email, valid_password, valid_username},
    users::{Identity, NewUser, PgUserStore, UserStore},
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserRegister {
    username: String,
    email: String,
    password: String,
}

#[utoipa::path(
    post,
    path= "/user/register",
    responses (
        (status = 201, description = "Registration successful", body = Identity, content_type = "application/json"),
        (status = 400, description = "Invalid payload or username already exists", body = String),
    ),
    tag= "register"
)]
#[instrument(skip(pool, payload))]
pub async fn register(
    pool: Extension<PgPool>,
    payload: Option<Json<UserRegister>>,
) -> impl IntoResponse {
    let user: UserRegister = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match register_flow(&PgUserStore, &pool, user).await {
        Ok(identity) => (StatusCode::CREATED, Json(identity)).into_response(),
        Err((status, reason)) => (status, reason).into_response(),
    }
}

/// Single-decision registration: the store either creates the account or
/// reports the username as taken by returning nothing.
async fn register_flow<S: UserStore>(
    store: &S,
    pool: &PgPool,
    user: UserRegister,
) -> Result<Identity, (StatusCode, String)> {
    let email = user.email.trim().to_lowercase();

    if !valid_username(&user.username) {
        return Err((StatusCode::BAD_REQUEST, "Invalid username".to_string()));
    }

    if !valid_email(&email) {
        return Err((StatusCode::BAD_REQUEST, "Invalid email".to_string()));
    }

    if !valid_password(&user.password) {
        return Err((StatusCode::BAD_REQUEST, "Invalid password".to_string()));
    }

    let fields = NewUser {
        username: user.username,
        email,
        password: user.password,
    };

    debug!(username = %fields.username, "registering user");

    match store.register(pool, &fields).await {
        Ok(Some(identity)) => Ok(identity),
        Ok(None) => Err((
            StatusCode::BAD_REQUEST,
            "Username already exists".to_string(),
        )),
        Err(e) => {
            error!("Error creating user: {:?}", e);

            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error creating user".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ligilo::users::{tests::unreachable_pool, StoreResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct MockStore {
        created: Option<Identity>,
        register_calls: AtomicUsize,
    }

    impl MockStore {
        fn new(created: Option<Identity>) -> Self {
            Self {
                created,
                register_calls: AtomicUsize::new(0),
            }
        }
    }

    impl UserStore for MockStore {
        fn register<'a>(
            &'a self,
            _pool: &'a PgPool,
            _fields: &'a NewUser,
        ) -> StoreResult<'a, Option<Identity>> {
            self.register_calls.fetch_add(1, Ordering::SeqCst);
            let created = self.created.clone();
            Box::pin(async move { Ok(created) })
        }

        fn is_locked<'a>(&'a self, _pool: &'a PgPool, _username: &'a str) -> StoreResult<'a, bool> {
            Box::pin(async move { Ok(false) })
        }

        fn login<'a>(
            &'a self,
            _pool: &'a PgPool,
            _username: &'a str,
            _password: &'a str,
        ) -> StoreResult<'a, Option<Identity>> {
            Box::pin(async move { Ok(None) })
        }
    }

    fn payload() -> UserRegister {
        UserRegister {
            username: "newuser".to_string(),
            email: "new@example.com".to_string(),
            password: "Password123!".to_string(),
        }
    }

    #[tokio::test]
    async fn register_returns_created_identity() {
        let identity = Identity {
            id: Uuid::nil(),
            username: "newuser".to_string(),
            email: "new@example.com".to_string(),
        };
        let store = MockStore::new(Some(identity.clone()));
        let pool = unreachable_pool();

        let created = register_flow(&store, &pool, payload()).await;
        assert!(matches!(created, Ok(created) if created == identity));
        assert_eq!(store.register_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let store = MockStore::new(None);
        let pool = unreachable_pool();

        let result = register_flow(&store, &pool, payload()).await;
        assert!(matches!(
            result,
            Err((StatusCode::BAD_REQUEST, reason)) if reason == "Username already exists"
        ));
        assert_eq!(store.register_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn register_rejects_invalid_username_before_the_store() {
        let store = MockStore::new(None);
        let pool = unreachable_pool();
        let user = UserRegister {
            username: "No Spaces Allowed".to_string(),
            ..payload()
        };

        let result = register_flow(&store, &pool, user).await;
        assert!(matches!(
            result,
            Err((StatusCode::BAD_REQUEST, reason)) if reason == "Invalid username"
        ));
        assert_eq!(store.register_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn register_rejects_invalid_email() {
        let store = MockStore::new(None);
        let pool = unreachable_pool();
        let user = UserRegister {
            email: "not-an-email".to_string(),
            ..payload()
        };

        let result = register_flow(&store, &pool, user).await;
        assert!(matches!(
            result,
            Err((StatusCode::BAD_REQUEST, reason)) if reason == "Invalid email"
        ));
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let store = MockStore::new(None);
        let pool = unreachable_pool();
        let user = UserRegister {
            password: "short".to_string(),
            ..payload()
        };

        let result = register_flow(&store, &pool, user).await;
        assert!(matches!(
            result,
            Err((StatusCode::BAD_REQUEST, reason)) if reason == "Invalid password"
        ));
    }

    #[tokio::test]
    async fn register_normalizes_email_case() {
        let identity = Identity {
            id: Uuid::nil(),
            username: "newuser".to_string(),
            email: "new@example.com".to_string(),
        };
        let store = MockStore::new(Some(identity));
        let pool = unreachable_pool();
        let user = UserRegister {
            email: "  New@Example.COM ".to_string(),
            ..payload()
        };

        let created = register_flow(&store, &pool, user).await;
        assert!(created.is_ok());
    }

    #[tokio::test]
    async fn register_maps_db_failure_to_internal_error() {
        let pool = unreachable_pool();

        let result = register_flow(&PgUserStore, &pool, payload()).await;
        assert!(matches!(
            result,
            Err((StatusCode::INTERNAL_SERVER_ERROR, _))
        ));
    }
}
