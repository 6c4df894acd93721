use serde::{Deserialize, Serialize};

/// Admin-only review endpoints
pub mod admin;
/// Registration and login
pub mod auth;
/// Employee self-service endpoints
pub mod user;

/// Plain acknowledgement body, `{"message": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.into(),
        }
    }
}
