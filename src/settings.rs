use std::env;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use config::{Config, Environment, File};

use secrecy::Secret;

use serde::Deserialize;
use serde_aux::prelude::*;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

use url::Url;

/// Environment variable holding the token signing secret
pub const JWT_SECRET_VAR: &str = "JWT_SECRET";
/// Environment variable holding the database user
pub const DATABASE_USERNAME_VAR: &str = "DATABASE_USERNAME";
/// Environment variable holding the database password
pub const DATABASE_PASSWORD_VAR: &str = "DATABASE_PASSWORD";

/// Runtime environment, either `Dev` for local development, or `Prod` for release
#[derive(Debug)]
pub enum Runtime {
    Dev,
    Prod,
}

impl Runtime {
    pub fn as_str(&self) -> &str {
        match self {
            Runtime::Dev => "dev",
            Runtime::Prod => "prod",
        }
    }
}

impl TryFrom<String> for Runtime {
    type Error = anyhow::Error;

    fn try_from(s: String) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => anyhow::bail!("{} is not a valid runtime environment", other),
        }
    }
}

/// Application settings wrapper
#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: ApplicationSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub admin: AdminSettings,
}

impl Settings {
    /// Load application settings from the settings directory
    pub fn load() -> anyhow::Result<Self> {
        let path = env::current_dir()?.join("settings");
        // Get the current environment based on the `APP_ENV` environment variable, default to `Dev`
        let runtime: Runtime = env::var("APP_ENV")
            .unwrap_or_else(|_| "dev".into())
            .try_into()?;

        Self::load_from(runtime, &path)
    }

    /// Load application settings from a specified path and runtime
    pub fn load_from(runtime: Runtime, base_path: &Path) -> anyhow::Result<Self> {
        Config::builder()
            .add_source(File::from(base_path.join("base")).required(true))
            .add_source(File::from(base_path.join(runtime.as_str())).required(true))
            // Takes the form `APP_<settings category>__<setting name>`
            .add_source(
                Environment::with_prefix("app")
                    .prefix_separator("_")
                    .separator("__"),
            )
            // Well-known deployment variables win over everything else
            .set_override_option("auth.jwt_secret", env::var(JWT_SECRET_VAR).ok())?
            .set_override_option("database.username", env::var(DATABASE_USERNAME_VAR).ok())?
            .set_override_option("database.password", env::var(DATABASE_PASSWORD_VAR).ok())?
            .build()?
            .try_deserialize()
            .context("Failed to load/deserialize settings")
    }
}

#[derive(Debug, Deserialize)]
pub struct ApplicationSettings {
    host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    port: u16,
}

impl ApplicationSettings {
    /// The application address to bind to
    pub fn addr(&self) -> (&str, u16) {
        (&self.host, self.port)
    }

    /// Base URL of the REST API, as seen by clients of this instance
    pub fn base_url(&self) -> anyhow::Result<Url> {
        let host = if self.host == "0.0.0.0" {
            "127.0.0.1"
        } else {
            &self.host
        };
        Url::parse(&format!("http://{}:{}/api/", host, self.port))
            .context("Failed to build API base URL")
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    port: u16,
    host: String,
    name: String,
    username: String,
    password: Secret<String>,
    require_ssl: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    connect_timeout_seconds: u64,
}

impl DatabaseSettings {
    /// Connection options for the configured database
    pub fn with_db(&self) -> PgConnectOptions {
        use secrecy::ExposeSecret;

        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        PgConnectOptions::new()
            .port(self.port)
            .host(&self.host)
            .ssl_mode(ssl_mode)
            .username(&self.username)
            .password(self.password.expose_secret())
            .database(&self.name)
    }

    /// How long startup waits for the first connection before giving up
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    jwt_secret: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    token_ttl_minutes: i64,
}

impl AuthSettings {
    /// Secret used to sign and verify session tokens
    pub fn jwt_secret(&self) -> &Secret<String> {
        &self.jwt_secret
    }

    /// Lifetime of an issued session token
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_ttl_minutes)
    }
}

/// Administrator account that is created at startup if missing
#[derive(Debug, Deserialize)]
pub struct AdminSettings {
    pub username: String,
    pub password: Secret<String>,
}
