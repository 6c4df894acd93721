use chrono::Duration;

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::crypto::{SigningKey, Token, TokenResult};
use crate::domain::Role;

/// Claims carried inside a session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
}

/// Issues and verifies session tokens with one shared key
#[derive(Clone)]
pub struct SessionKeys {
    key: SigningKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(key: SigningKey, ttl: Duration) -> Self {
        Self { key, ttl }
    }

    pub fn issue(&self, session: &Session) -> TokenResult<Token> {
        Token::sign(session, self.ttl, self.key.as_ref())
    }

    pub fn verify(&self, token: &Token) -> TokenResult<Session> {
        token.verify(self.key.as_ref())
    }
}
