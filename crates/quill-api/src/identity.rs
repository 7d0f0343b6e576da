//! Account registration, credential checks and per-request user resolution.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use quill_db::{DbConn, RequestDb};
use quill_types::api::SessionClaims;
use quill_types::models::{User, UserId};
use tracing::{info, warn};

use crate::error::BlogError;

/// Hash with Argon2id and a random salt, producing a PHC string.
pub fn hash_password(password: &str) -> Result<String, BlogError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| BlogError::Internal(format!("Password hashing failed: {}", e)))
}

/// Constant-time check of `password` against a stored PHC string.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, BlogError> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| BlogError::Internal(format!("Stored password hash is invalid: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub fn register(conn: &DbConn, username: &str, password: &str) -> Result<UserId, BlogError> {
    if username.is_empty() {
        return Err(BlogError::Validation("Username is required.".into()));
    }
    if password.is_empty() {
        return Err(BlogError::Validation("Password is required.".into()));
    }

    let taken = || BlogError::Conflict(format!("User {} is already registered.", username));

    if conn.get_user_by_username(username)?.is_some() {
        return Err(taken());
    }

    let password_hash = hash_password(password)?;

    // A concurrent registration can still win the race; the UNIQUE index catches it.
    match conn.create_user(username, &password_hash) {
        Ok(id) => {
            info!("Registered user {} ({})", username, id);
            Ok(id)
        }
        Err(e) if e.is_constraint_violation() => Err(taken()),
        Err(e) => Err(e.into()),
    }
}

/// The two failure messages differ on purpose; see DESIGN.md.
pub fn authenticate(conn: &DbConn, username: &str, password: &str) -> Result<UserId, BlogError> {
    let Some(user) = conn.get_user_by_username(username)? else {
        warn!("Login failed: unknown user {}", username);
        return Err(BlogError::Auth("Incorrect username.".into()));
    };

    if !verify_password(password, &user.password)? {
        warn!("Login failed: wrong password for {}", username);
        return Err(BlogError::Auth("Incorrect password.".into()));
    }

    Ok(user.id)
}

/// Runs once per request. Requests without a session never open a
/// connection.
pub fn resolve_current_user(
    db: &RequestDb,
    session: Option<&SessionClaims>,
) -> Result<Option<User>, BlogError> {
    let Some(session) = session else {
        return Ok(None);
    };

    let user = db.get_connection()?.get_user_by_id(session.sub)?;
    Ok(user.map(User::from))
}
