use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use anyhow::Context;

use tracing_actix_web::TracingLogger;

use crate::auth::SessionKeys;
use crate::controller::{admin, auth, user};
use crate::crypto::hash_password;
use crate::domain::{Password, Role, Username};
use crate::error::RestError;
use crate::settings::AdminSettings;
use crate::store::{NewUser, Store, StoreError};
use crate::telemetry::spawn_blocking_with_tracing;

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().finish()
}

/// Malformed JSON bodies get the same `{"error": ...}` shape as every other failure
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| RestError::ParseError(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| RestError::ParseError(err.to_string()).into())
}

/// Run the application on a specified TCP listener
pub fn run(
    listener: TcpListener,
    store: Arc<dyn Store>,
    session_keys: SessionKeys,
) -> anyhow::Result<Server> {
    // Wrap application data
    let store: web::Data<dyn Store> = web::Data::from(store);
    let session_keys = web::Data::new(session_keys);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(json_config())
            .app_data(path_config())
            .app_data(store.clone())
            .app_data(session_keys.clone())
            .service(health_check)
            .service(
                web::scope("/api")
                    .service(auth::scope())
                    .service(user::scope())
                    .service(admin::scope()),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Make sure the configured administrator account exists
#[tracing::instrument(name = "Ensure admin account", skip(store, settings), fields(username = %settings.username))]
pub async fn ensure_admin(store: &dyn Store, settings: &AdminSettings) -> anyhow::Result<()> {
    let username: Username = settings
        .username
        .parse()
        .map_err(anyhow::Error::msg)
        .context("Invalid admin username")?;

    if let Some(existing) = store.fetch_user_by_username(&username).await? {
        if existing.role != Role::Admin {
            tracing::warn!("Configured admin username belongs to a non-admin account");
        }
        return Ok(());
    }

    let password = Password::parse(settings.password.clone())
        .map_err(anyhow::Error::msg)
        .context("Invalid admin password")?;
    let password_hash = spawn_blocking_with_tracing(move || hash_password(&password))
        .await
        .context("Failed to spawn blocking task")??;

    let new_admin = NewUser {
        username,
        password_hash,
        role: Role::Admin,
    };
    match store.insert_user(&new_admin).await {
        // Another instance seeded it first
        Ok(_) | Err(StoreError::Conflict) => {
            tracing::info!("Admin account created");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
