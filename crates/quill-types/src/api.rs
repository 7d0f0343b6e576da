use serde::{Deserialize, Serialize};

use crate::models::UserId;

// -- Session --

/// Claims carried by the signed session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: UserId,
    pub exp: usize,
}

// -- Auth --

/// Body of `POST /auth/register` and `POST /auth/login`.
///
/// Missing fields deserialize as empty strings so that validation, not the
/// extractor, decides what the user sees.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuthForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// -- Posts --

/// Body of `POST /create` and `POST /{id}/update`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

// -- Flash --

/// One-shot messages queued for the next rendered page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Flashes(Vec<String>);

impl Flashes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<String> for Flashes {
    fn from(message: String) -> Self {
        Self(vec![message])
    }
}
