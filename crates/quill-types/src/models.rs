use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type PostId = i64;

/// A registered account. The password hash never leaves the db crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// A post joined with its author's username, as every read path returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub created: DateTime<Utc>,
    pub author_id: UserId,
    pub author_username: String,
}

impl Post {
    pub fn is_authored_by(&self, user: &User) -> bool {
        self.author_id == user.id
    }
}
