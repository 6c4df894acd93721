use actix_web::http::header::{self, HeaderMap};

use crate::crypto::{Token, TokenError, TokenResult};

const BEARER_AUTH_PREFIX: &str = "bearer ";

/// Extract the session token from the `Authorization` header.
///
/// Both the raw token and `Bearer <token>` are accepted. Returns `Ok(None)`
/// when no credential was presented at all, and an error when something was
/// presented that cannot be a token.
pub fn token_from_headers(headers: &HeaderMap) -> TokenResult<Option<Token>> {
    let header_value = match headers.get(header::AUTHORIZATION) {
        Some(value) => value.to_str().map_err(|_| TokenError::InvalidFormat)?.trim(),
        None => return Ok(None),
    };
    if header_value.is_empty() {
        return Ok(None);
    }

    let token = match header_value.get(..BEARER_AUTH_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(BEARER_AUTH_PREFIX) => {
            header_value[BEARER_AUTH_PREFIX.len()..].trim_start()
        }
        _ => header_value,
    };

    token.parse().map(Some)
}
