use std::env;
use std::net::TcpListener;
use std::sync::Arc;

use anyhow::Context;

use exitease::app;
use exitease::auth::SessionKeys;
use exitease::crypto::SigningKey;
use exitease::settings::Settings;
use exitease::store::PgStore;
use exitease::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    telemetry::set_subscriber(telemetry::create_subscriber(env_filter, std::io::stdout))?;

    let settings = Settings::load()?;

    // No database, no server
    let store = PgStore::connect(&settings.database).await?;
    store.migrate().await?;
    app::ensure_admin(&store, &settings.admin).await?;

    let signing_key = SigningKey::new(settings.auth.jwt_secret())?;
    let session_keys = SessionKeys::new(signing_key, settings.auth.token_ttl());

    let listener = TcpListener::bind(settings.app.addr())?;
    tracing::info!(base_url = %settings.app.base_url()?, "Serving exit interview API");

    app::run(listener, Arc::new(store), session_keys)?
        .await
        .context("Failed to run app")
}
