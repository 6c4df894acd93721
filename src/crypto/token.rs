use std::fmt;
use std::str::FromStr;

use hmac::Mac;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use chrono::{Duration, Utc};

use base64::{
    alphabet,
    engine::{self, general_purpose},
    Engine as _,
};
use regex::Regex;

lazy_static::lazy_static! {
    // URL-safe, unpadded, so tokens survive headers untouched
    static ref BASE64_ENGINE: engine::GeneralPurpose =
        engine::GeneralPurpose::new(&alphabet::URL_SAFE, general_purpose::NO_PAD);
    static ref TOKEN_REGEX: Regex = Regex::new(r"^([A-Za-z0-9_-]+)\.([A-Za-z0-9_-]+)$").unwrap();
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token signature does not match")]
    SignatureMismatch,
    #[error("Token is expired")]
    Expired,
    #[error("Token is of invalid format")]
    InvalidFormat,
    #[error("Token claims could not be read")]
    Claims(#[from] serde_json::Error),
    #[error("Token is not valid base64")]
    Encoding(#[from] base64::DecodeError),
}

pub type TokenResult<T> = Result<T, TokenError>;

/// Signed claims with a mandatory expiry, as `base64url(claims).base64url(hmac)`
#[derive(Debug, Clone, PartialEq)]
pub struct Token(String);

/// What actually gets signed: the payload and its expiry in unix seconds
#[derive(Serialize, Deserialize)]
struct Claims<T> {
    exp: i64,
    data: T,
}

impl Token {
    /// Sign `payload` so that it verifies for `ttl` from now.
    /// A negative `ttl` yields a token that is already expired
    pub fn sign<T, K>(payload: &T, ttl: Duration, key: &K) -> TokenResult<Self>
    where
        T: Serialize,
        K: Mac + Clone,
    {
        let claims = Claims {
            exp: (Utc::now() + ttl).timestamp(),
            data: payload,
        };
        let msg = serde_json::to_vec(&claims)?;
        let sig = key.clone().chain_update(&msg).finalize().into_bytes();

        Ok(Self(format!(
            "{}.{}",
            BASE64_ENGINE.encode(msg),
            BASE64_ENGINE.encode(sig)
        )))
    }

    /// Check signature and expiry, then hand back the payload
    pub fn verify<T, K>(&self, key: &K) -> TokenResult<T>
    where
        T: DeserializeOwned,
        K: Mac + Clone,
    {
        let (msg, sig) = self.split().ok_or(TokenError::InvalidFormat)?;
        let msg = BASE64_ENGINE.decode(msg)?;
        let sig = BASE64_ENGINE.decode(sig)?;

        // Constant time; nothing in `msg` is trusted before this passes
        key.clone()
            .chain_update(&msg)
            .verify_slice(&sig)
            .map_err(|_| TokenError::SignatureMismatch)?;

        let claims: Claims<T> = serde_json::from_slice(&msg)?;
        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims.data)
    }

    fn split(&self) -> Option<(&str, &str)> {
        let captures = TOKEN_REGEX.captures(&self.0)?;
        Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Token> for String {
    fn from(token: Token) -> String {
        token.0
    }
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(token: &str) -> TokenResult<Self> {
        if TOKEN_REGEX.is_match(token) {
            Ok(Self(token.to_string()))
        } else {
            Err(TokenError::InvalidFormat)
        }
    }
}
