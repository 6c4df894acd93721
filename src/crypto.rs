mod password;
mod signing_key;
mod token;

pub(crate) use password::FALLBACK_PASSWORD_HASH;
pub use password::{hash_password, verify_password, PasswordError};
pub use signing_key::SigningKey;
pub use token::{Token, TokenError, TokenResult};
