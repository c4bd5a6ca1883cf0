//! HTTP surface of ligilo: routes, middleware stack and OpenAPI document.

#[allow(unused_imports)]
use self::handlers::{
    health::{__path_health, health, Health},
    token_refresh::{__path_refresh, refresh, RefreshRequest, RefreshResponse},
    url_decode::{__path_decode, decode, DecodedUrl},
    url_encode::{__path_encode, encode, EncodedUrl, UrlPayload},
    user_login::{__path_login, login, LoginRequest, LoginResponse},
    user_register::{__path_register, register, UserRegister},
};
use self::{auth::BootstrapAccount, links::Link, users::Identity};
use crate::{cli::globals::GlobalArgs, token::TokenSigner};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderName, HeaderValue, Method, Request},
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod handlers;
pub mod links;
pub mod urlcodec;
pub mod users;

#[derive(OpenApi)]
#[openapi(
    paths(health, register, login, refresh, encode, decode),
    components(
        schemas(
            Health,
            Identity,
            UserRegister,
            LoginRequest,
            LoginResponse,
            RefreshRequest,
            RefreshResponse,
            UrlPayload,
            EncodedUrl,
            DecodedUrl,
            Link
        )
    ),
    tags(
        (name = "ligilo", description = "Link vault and access API"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Start the API server.
///
/// # Errors
///
/// Returns an error if the database pool cannot be created or the listener
/// fails to bind.
pub async fn new(port: u16, dsn: String, globals: GlobalArgs) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let signer = Arc::new(TokenSigner::new(
        globals.secret_key.clone(),
        globals.algorithm,
        Duration::from_secs(globals.access_token_ttl),
        Duration::from_secs(globals.refresh_token_ttl),
    ));

    let bootstrap = BootstrapAccount::new(
        globals.admin_user.clone(),
        globals.admin_password.clone(),
    );

    let cors = CorsLayer::new()
        // allow `GET` and `POST` when accessing the resource
        .allow_methods([Method::GET, Method::POST])
        // allow requests from any origin
        .allow_origin(Any);

    let app = Router::new()
        .route("/user/register", post(handlers::register))
        .route("/user/login", post(handlers::login))
        .route("/token/refresh", post(handlers::refresh))
        .route("/url", post(handlers::encode))
        .route("/url/:filename", get(handlers::decode))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(pool.clone()))
                .layer(Extension(signer))
                .layer(Extension(bootstrap))
                .layer(Extension(globals)),
        )
        .route("/health", get(handlers::health).options(handlers::health))
        .layer(Extension(pool))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi()));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, ?headers, request_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_every_route() -> Result<(), serde_json::Error> {
        let doc = openapi();
        let json = serde_json::to_value(&doc)?;
        let paths = json
            .get("paths")
            .and_then(serde_json::Value::as_object)
            .map(|paths| paths.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();

        for path in [
            "/health",
            "/user/register",
            "/user/login",
            "/token/refresh",
            "/url",
            "/url/{filename}",
        ] {
            assert!(paths.iter().any(|p| p == path), "missing path {path}");
        }
        Ok(())
    }

    #[test]
    fn make_span_uses_request_id_header() {
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "01J0000000000000000000000")
            .body(Body::empty());
        assert!(request.map(|req| make_span(&req)).is_ok());
    }
}
