//! Database row types. These map directly to SQLite rows and stay distinct
//! from the quill-types models so the password hash never escapes this crate
//! by accident.

use chrono::{DateTime, NaiveDateTime, Utc};
use quill_types::models::{Post, PostId, User, UserId};
use tracing::warn;

pub struct UserRow {
    pub id: UserId,
    pub username: String,
    pub password: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
        }
    }
}

pub struct PostRow {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub created: String,
    pub author_id: UserId,
    pub author_username: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        let created = parse_timestamp(&row.created).unwrap_or_else(|| {
            warn!("Corrupt created '{}' on post {}", row.created, row.id);
            DateTime::default()
        });

        Post {
            id: row.id,
            title: row.title,
            body: row.body,
            created,
            author_id: row.author_id,
            author_username: row.author_username,
        }
    }
}

/// SQLite's `CURRENT_TIMESTAMP` is "YYYY-MM-DD HH:MM:SS" in UTC without a zone.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_sqlite_timestamps() {
        let ts = parse_timestamp("2018-01-01 00:00:05").unwrap();
        assert_eq!(ts.year(), 2018);
        assert_eq!(ts.second(), 5);
    }

    #[test]
    fn corrupt_timestamp_falls_back_to_epoch() {
        let post: Post = PostRow {
            id: 1,
            title: "t".into(),
            body: String::new(),
            created: "yesterday".into(),
            author_id: 1,
            author_username: "a".into(),
        }
        .into();
        assert_eq!(post.created, DateTime::<Utc>::default());
    }
}
