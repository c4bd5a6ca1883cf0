use crate::token::TokenSigner;
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RefreshRequest {
    refresh_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
}

#[utoipa::path(
    post,
    path= "/token/refresh",
    responses (
        (status = 200, description = "New access token", body = RefreshResponse, content_type = "application/json"),
        (status = 401, description = "Invalid refresh token", body = String),
    ),
    tag= "token"
)]
#[instrument(skip(signer, payload))]
pub async fn refresh(
    signer: Extension<Arc<TokenSigner>>,
    payload: Option<Json<RefreshRequest>>,
) -> impl IntoResponse {
    let request: RefreshRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match refresh_flow(&signer, &request.refresh_token) {
        Ok(tokens) => (StatusCode::OK, Json(tokens)).into_response(),
        Err((status, reason)) => (status, reason).into_response(),
    }
}

fn refresh_flow(signer: &TokenSigner, token: &str) -> Result<RefreshResponse, (StatusCode, String)> {
    // One opaque rejection for forged, malformed and expired tokens alike;
    // nothing is logged for it.
    let user = signer
        .verify_refresh_token(token)
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid refresh token".to_string()))?;

    let access_token = signer
        .issue_access_token(&user.username, serde_json::Map::new(), None)
        .map_err(|err| {
            error!("Failed to sign access token: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to sign token".to_string(),
            )
        })?;

    Ok(RefreshResponse {
        access_token,
        token_type: "bearer".to_string(),
    })
}
