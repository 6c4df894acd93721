use actix_web::dev::HttpServiceFactory;
use actix_web::{post, web, HttpResponse};

use anyhow::Context;

use secrecy::Secret;

use serde::{Deserialize, Serialize};

use crate::auth::{Session, SessionKeys};
use crate::crypto::{hash_password, verify_password, PasswordError, FALLBACK_PASSWORD_HASH};
use crate::domain::{Password, Role, Username};
use crate::error::{RestError, RestResult};
use crate::store::{NewUser, Store};
use crate::telemetry::spawn_blocking_with_tracing;

use super::MessageBody;

/// Username and password, as posted to both register and login
#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    username: String,
    password: Secret<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[tracing::instrument(name = "Register a new user", skip(store, body), fields(username = %body.username))]
#[post("/register")]
async fn register(
    store: web::Data<dyn Store>,
    body: web::Json<CredentialsBody>,
) -> RestResult<HttpResponse> {
    let CredentialsBody { username, password } = body.into_inner();

    let username: Username = username.parse().map_err(RestError::ParseError)?;
    let password = Password::parse(password).map_err(RestError::ParseError)?;

    let password_hash = spawn_blocking_with_tracing(move || hash_password(&password))
        .await
        .context("Failed to spawn blocking task")?
        .context("Failed to hash password")?;

    // Self-registration only ever creates employees
    let new_user = NewUser {
        username,
        password_hash,
        role: Role::Employee,
    };
    store
        .insert_user(&new_user)
        .await
        .map_err(|e| RestError::on_conflict(e, "Username already taken"))?;

    Ok(HttpResponse::Created().json(MessageBody::new("User registered successfully")))
}

#[tracing::instrument(name = "Log a user in", skip(store, keys, body), fields(username = %body.username))]
#[post("/login")]
async fn login(
    store: web::Data<dyn Store>,
    keys: web::Data<SessionKeys>,
    body: web::Json<CredentialsBody>,
) -> RestResult<web::Json<LoginResponse>> {
    let CredentialsBody { username, password } = body.into_inner();

    // A name that could never have registered cannot log in either
    let username: Username = username
        .parse()
        .map_err(|_| RestError::InvalidCredentials)?;

    let (user, password_hash) = match store.fetch_user_by_username(&username).await? {
        Some(user) => {
            let hash = user.password_hash.clone();
            (Some(user), hash)
        }
        None => (None, Secret::new(FALLBACK_PASSWORD_HASH.to_string())),
    };

    spawn_blocking_with_tracing(move || verify_password(&password, &password_hash))
        .await
        .context("Failed to spawn blocking task")?
        .map_err(|e| match e {
            PasswordError::Mismatch => RestError::InvalidCredentials,
            e => RestError::Other(e.into()),
        })?;

    let user = user.ok_or(RestError::InvalidCredentials)?;
    let token = keys
        .issue(&Session {
            user_id: user.id,
            role: user.role,
        })
        .context("Failed to sign session token")?;

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(web::Json(LoginResponse {
        token: token.into(),
    }))
}

/// Authentication API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/auth").service(register).service(login)
}
