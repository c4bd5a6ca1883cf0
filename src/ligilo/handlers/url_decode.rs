use crate::ligilo::urlcodec;
use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct DecodedUrl {
    pub url: String,
}

#[utoipa::path(
    get,
    path= "/url/{filename}",
    params(
        ("filename" = String, Path, description = "Encoded URL identifier")
    ),
    responses (
        (status = 200, description = "Original URL", body = DecodedUrl, content_type = "application/json"),
        (status = 400, description = "Invalid filename", body = String),
    ),
    tag= "url"
)]
#[instrument]
pub async fn decode(Path(filename): Path<String>) -> impl IntoResponse {
    match urlcodec::decode(&filename) {
        Ok(url) => (StatusCode::OK, Json(DecodedUrl { url })).into_response(),
        Err(err) => {
            debug!(%filename, "rejected filename: {err}");

            (StatusCode::BAD_REQUEST, "Invalid filename".to_string()).into_response()
        }
    }
}
