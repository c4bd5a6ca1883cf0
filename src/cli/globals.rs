//! Process-wide configuration, collected once at startup.

use crate::token::Algorithm;
use secrecy::SecretString;

/// Everything the server needs beyond the listen address: token policy,
/// bootstrap account and link bases. Built by dispatch from the parsed
/// command line and immutable afterwards; request handlers receive it by
/// extension and never read ambient state.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub secret_key: SecretString,
    pub algorithm: Algorithm,
    /// Access-token lifetime in seconds.
    pub access_token_ttl: u64,
    /// Refresh-token lifetime in seconds.
    pub refresh_token_ttl: u64,
    pub admin_user: String,
    pub admin_password: SecretString,
    pub api_base_url: String,
    pub download_base_url: String,
}
