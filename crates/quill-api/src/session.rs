use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use quill_types::api::SessionClaims;
use quill_types::models::UserId;

use crate::error::BlogError;

pub const SESSION_COOKIE: &str = "session";

/// Signs and verifies the session cookie. The cookie is an HS256 JWT, so the
/// client holds the session and the server only needs the secret.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    pub fn issue(&self, user_id: UserId) -> Result<String, BlogError> {
        let expires = Utc::now()
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| BlogError::Internal("Session expiry is out of range".into()))?;
        let claims = SessionClaims {
            sub: user_id,
            exp: expires.timestamp().max(0) as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| BlogError::Internal(format!("Session token creation failed: {}", e)))
    }

    /// `None` for a missing, tampered or expired token.
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .ok()
    }

    pub fn from_jar(&self, jar: &CookieJar) -> Option<SessionClaims> {
        jar.get(SESSION_COOKIE).and_then(|c| self.verify(c.value()))
    }

    /// Start a new session for `user_id`, replacing whatever the jar held.
    pub fn login(&self, jar: CookieJar, user_id: UserId) -> Result<CookieJar, BlogError> {
        let token = self.issue(user_id)?;
        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
        Ok(jar.add(cookie))
    }
}

pub fn logout(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
