use crate::{
    cli::globals::GlobalArgs,
    ligilo::{
        links::{generate_links, Link, LinkAction},
        urlcodec,
    },
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UrlPayload {
    url: String,
}

/// Identifier and hypermedia links for an encoded URL.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct EncodedUrl {
    pub filename: String,
    pub links: Vec<Link>,
}

#[utoipa::path(
    post,
    path= "/url",
    responses (
        (status = 201, description = "URL encoded", body = EncodedUrl, content_type = "application/json"),
        (status = 400, description = "Provided URL is invalid", body = String),
    ),
    tag= "url"
)]
#[instrument(skip(globals, payload))]
pub async fn encode(
    globals: Extension<GlobalArgs>,
    payload: Option<Json<UrlPayload>>,
) -> impl IntoResponse {
    let payload: UrlPayload = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match encode_flow(&globals, &payload.url) {
        Ok(encoded) => (StatusCode::CREATED, Json(encoded)).into_response(),
        Err((status, reason)) => (status, reason).into_response(),
    }
}

fn encode_flow(globals: &GlobalArgs, url: &str) -> Result<EncodedUrl, (StatusCode, String)> {
    let filename = urlcodec::encode(url).map_err(|err| {
        debug!(url, "rejected url: {err}");
        (StatusCode::BAD_REQUEST, err.to_string())
    })?;

    let download_url = format!(
        "{}/{filename}",
        globals.download_base_url.trim_end_matches('/')
    );
    let links = generate_links(
        LinkAction::Create,
        &filename,
        &globals.api_base_url,
        &download_url,
    );

    Ok(EncodedUrl { filename, links })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Algorithm;
    use secrecy::SecretString;

    fn test_globals() -> GlobalArgs {
        GlobalArgs {
            secret_key: SecretString::from("secret".to_string()),
            algorithm: Algorithm::Hs256,
            access_token_ttl: 1800,
            refresh_token_ttl: 86400,
            admin_user: "admin".to_string(),
            admin_password: SecretString::from("swordfish".to_string()),
            api_base_url: "http://api.example.com".to_string(),
            download_base_url: "http://download.example.com".to_string(),
        }
    }

    #[test]
    fn encode_returns_identifier_and_ordered_links() -> Result<(), (StatusCode, String)> {
        let encoded = encode_flow(&test_globals(), "https://example.com")?;

        assert_eq!(encoded.filename, "aHR0cHM6Ly9leGFtcGxlLmNvbQ");
        assert_eq!(encoded.links.len(), 2);
        assert_eq!(encoded.links[0].rel, "view");
        assert_eq!(
            encoded.links[0].href,
            "http://download.example.com/aHR0cHM6Ly9leGFtcGxlLmNvbQ"
        );
        assert_eq!(encoded.links[1].rel, "delete");
        assert_eq!(
            encoded.links[1].href,
            "http://api.example.com/url/aHR0cHM6Ly9leGFtcGxlLmNvbQ"
        );
        Ok(())
    }

    #[test]
    fn encode_rejects_invalid_url_with_fixed_reason() {
        let result = encode_flow(&test_globals(), "invalid-url");
        assert!(matches!(
            result,
            Err((StatusCode::BAD_REQUEST, reason)) if reason == "Provided URL is invalid"
        ));
    }

    #[test]
    fn encode_rejects_empty_url() {
        let result = encode_flow(&test_globals(), "");
        assert!(matches!(result, Err((StatusCode::BAD_REQUEST, _))));
    }
}
