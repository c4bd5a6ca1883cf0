//! API handlers and shared payload validation for ligilo.

pub mod health;
pub use self::health::health;

pub mod user_register;
pub use self::user_register::register;

pub mod user_login;
pub use self::user_login::login;

pub mod token_refresh;
pub use self::token_refresh::refresh;

pub mod url_encode;
pub use self::url_encode::encode;

pub mod url_decode;
pub use self::url_decode::decode;

// common functions for the handlers
use regex::Regex;

/// Lightweight email sanity check used before consulting the store.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

/// Usernames: 3-32 characters, lowercase letters, digits, `_` or `-`.
pub fn valid_username(username: &str) -> bool {
    Regex::new(r"^[a-z0-9_-]{3,32}$").map_or(false, |re| re.is_match(username))
}

/// Passwords are free-form but must be 8-128 characters long.
pub fn valid_password(password: &str) -> bool {
    (8..=128).contains(&password.chars().count())
}
