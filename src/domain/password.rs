use std::str::FromStr;

use secrecy::{ExposeSecret, Secret};

use unicode_segmentation::UnicodeSegmentation;

const MIN_LEN: usize = 4;
const MAX_LEN: usize = 128;

/// A user supplied plaintext password. Only ever held as a secret
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl Password {
    pub fn parse(value: Secret<String>) -> Result<Self, String> {
        let raw = value.expose_secret();

        if raw.trim().is_empty() {
            return Err("Password cannot be empty".into());
        }
        let len = raw.graphemes(true).count();
        if len < MIN_LEN {
            return Err("Password too short".into());
        }
        if len > MAX_LEN {
            return Err("Password too long".into());
        }

        Ok(Self(value))
    }
}

impl FromStr for Password {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(Secret::new(value.to_string()))
    }
}

impl ExposeSecret<String> for Password {
    fn expose_secret(&self) -> &String {
        self.0.expose_secret()
    }
}
