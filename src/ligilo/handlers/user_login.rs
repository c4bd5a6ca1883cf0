use crate::{
    ligilo::{
        auth::{AuthBackend, BootstrapAccount},
        users::{PgUserStore, UserStore},
    },
    token::TokenSigner,
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    username: String,
    password: String,
}

/// Bearer token pair returned on a successful login.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

#[utoipa::path(
    post,
    path= "/user/login",
    responses (
        (status = 200, description = "Login successful", body = LoginResponse, content_type = "application/json"),
        (status = 400, description = "Account locked", body = String),
        (status = 401, description = "Incorrect username or password", body = String),
    ),
    tag= "login"
)]
#[instrument(skip(pool, signer, bootstrap, payload))]
pub async fn login(
    pool: Extension<PgPool>,
    signer: Extension<Arc<TokenSigner>>,
    bootstrap: Extension<BootstrapAccount>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match login_flow(&PgUserStore, &pool, &signer, &bootstrap, request).await {
        Ok(tokens) => (StatusCode::OK, Json(tokens)).into_response(),
        Err((status, reason)) => (status, reason).into_response(),
    }
}

/// Sequential login orchestration: lock check, then credential check, then
/// token issuance. Each step short-circuits: a locked account never reaches
/// credential verification, and a failed credential never reaches issuance.
async fn login_flow<S: UserStore>(
    store: &S,
    pool: &PgPool,
    signer: &TokenSigner,
    bootstrap: &BootstrapAccount,
    request: LoginRequest,
) -> Result<LoginResponse, (StatusCode, String)> {
    let locked = store
        .is_locked(pool, &request.username)
        .await
        .map_err(|e| {
            error!("Error checking account lock: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error checking account".to_string(),
            )
        })?;

    if locked {
        debug!(username = %request.username, "login refused: account locked");
        return Err((StatusCode::BAD_REQUEST, "Account locked".to_string()));
    }

    let backend = AuthBackend::select(bootstrap, store, &request.username);
    let identity = backend
        .authenticate(pool, &request.username, &request.password)
        .await
        .map_err(|e| {
            error!("Error verifying credentials: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error verifying credentials".to_string(),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                "Incorrect username or password".to_string(),
            )
        })?;

    issue_tokens(signer, &identity.username)
}

fn issue_tokens(
    signer: &TokenSigner,
    username: &str,
) -> Result<LoginResponse, (StatusCode, String)> {
    let access_token = signer
        .issue_access_token(username, serde_json::Map::new(), None)
        .map_err(|err| {
            error!("Failed to sign access token: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to sign token".to_string(),
            )
        })?;

    let refresh_token = signer.issue_refresh_token(username).map_err(|err| {
        error!("Failed to sign refresh token: {err}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to sign token".to_string(),
        )
    })?;

    Ok(LoginResponse {
        access_token,
        refresh_token,
        token_type: "bearer".to_string(),
    })
}
