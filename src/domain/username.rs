use std::fmt;
use std::str::FromStr;

use regex::Regex;

use unicode_segmentation::UnicodeSegmentation;

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 64;

/// A user supplied login name, normalized to lowercase
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Username(String);

impl FromStr for Username {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lazy_static::lazy_static! {
            static ref USERNAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap();
        }

        let value = value.trim();

        if value.is_empty() {
            return Err("Username cannot be empty".into());
        }
        let len = value.graphemes(true).count();
        if len < MIN_LEN {
            return Err("Username too short".into());
        }
        if len > MAX_LEN {
            return Err("Username too long".into());
        }
        if !USERNAME_REGEX.is_match(value) {
            return Err("Username contains invalid characters".into());
        }

        Ok(Self(value.to_lowercase()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
