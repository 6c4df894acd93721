use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use secrecy::{ExposeSecret, Secret};

use crate::domain::Password;

/// Verified against when the username is unknown, so both paths cost one argon2 run
pub(crate) const FALLBACK_PASSWORD_HASH: &str = "$argon2id$v=19$m=15000,t=2,p=1$\
gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password does not match")]
    Mismatch,
    #[error("Failed to process password hash: {0}")]
    Hash(String),
}

/// Hash a password into a PHC string with a fresh random salt. CPU bound
pub fn hash_password(password: &Password) -> Result<Secret<String>, PasswordError> {
    let salt = SaltString::generate(&mut rand::thread_rng());

    let hash = Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .to_string();

    Ok(Secret::new(hash))
}

/// Check a candidate password against a stored PHC string. CPU bound
pub fn verify_password(
    candidate: &Secret<String>,
    password_hash: &Secret<String>,
) -> Result<(), PasswordError> {
    let password_hash = PasswordHash::new(password_hash.expose_secret())
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Argon2::default()
        .verify_password(candidate.expose_secret().as_bytes(), &password_hash)
        .map_err(|_| PasswordError::Mismatch)
}
