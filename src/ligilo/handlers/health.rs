use crate::GIT_COMMIT_HASH;
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::time::{timeout, Duration};
use tracing::{debug, info_span, Instrument};
use utoipa::ToSchema;

const HEALTH_DB_TIMEOUT_SECONDS: u64 = 2;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    name: String,
    version: String,
    build: String,
    database: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Database connection is healthy", body = Health),
        (status = 503, description = "Database connection is unhealthy", body = Health),
    ),
    tag = "health",
)]
// axum handler for health
pub async fn health(pool: Extension<PgPool>) -> impl IntoResponse {
    let db_healthy = database_healthy(&pool).await;

    let health = Health {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: GIT_COMMIT_HASH.to_string(),
        database: if db_healthy { "ok" } else { "error" }.to_string(),
    };

    let short_hash = if GIT_COMMIT_HASH.len() > 7 {
        &GIT_COMMIT_HASH[0..7]
    } else {
        ""
    };

    let mut headers = HeaderMap::new();
    if let Ok(value) = format!("{}:{}:{short_hash}", health.name, health.version).parse() {
        headers.insert("X-App", value);
    }

    let status = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, headers, Json(health))
}

/// Probe database connectivity with a short timeout.
async fn database_healthy(pool: &PgPool) -> bool {
    let span = info_span!(
        "db.acquire",
        db.system = "postgresql",
        db.operation = "ACQUIRE"
    );

    match timeout(
        Duration::from_secs(HEALTH_DB_TIMEOUT_SECONDS),
        pool.acquire(),
    )
    .instrument(span)
    .await
    {
        Ok(Ok(_conn)) => true,
        Ok(Err(err)) => {
            debug!("health db probe failed: {err}");

            false
        }
        Err(_) => {
            debug!("health db probe timed out");

            false
        }
    }
}
