//! # Ligilo: link vault and access API
//!
//! Ligilo stores external URLs as compact, reversible URL-safe identifiers
//! and fronts them with a small authenticated HTTP API:
//!
//! - **Accounts**: registration and login against a Postgres-backed user
//!   store with failed-login lockout; one configured bootstrap
//!   (administrative) account is checked in-process.
//! - **Tokens**: HMAC-signed access and refresh tokens (`HS256`, `HS384` or
//!   `HS512`). The expiry rides inside the signed payload, so verification
//!   is stateless and needs no shared session store.
//! - **Links**: URL ⇄ filename codec (base64url, no padding) plus hypermedia
//!   "view"/"delete" links for every encoded resource.

pub mod cli;
pub mod ligilo;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
