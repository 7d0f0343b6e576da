use quill_types::models::{PostId, UserId};
use rusqlite::Row;

use crate::models::{PostRow, UserRow};
use crate::{DbConn, Result};

const POST_COLUMNS: &str = "SELECT p.id, p.title, p.body, p.created, p.author_id, u.username
     FROM post p
     JOIN user u ON p.author_id = u.id";

impl DbConn {
    // -- Users --

    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<UserId> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.query_row(
            "SELECT id, username, password FROM user WHERE username = ?1",
            [username],
            user_row,
        )
    }

    pub fn get_user_by_id(&self, id: UserId) -> Result<Option<UserRow>> {
        self.query_row(
            "SELECT id, username, password FROM user WHERE id = ?1",
            [id],
            user_row,
        )
    }

    // -- Posts --

    /// Every post with its author, newest first.
    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.query_map(
            &format!("{POST_COLUMNS} ORDER BY p.created DESC, p.id DESC"),
            [],
            post_row,
        )
    }

    pub fn get_post(&self, id: PostId) -> Result<Option<PostRow>> {
        self.query_row(&format!("{POST_COLUMNS} WHERE p.id = ?1"), [id], post_row)
    }

    pub fn insert_post(&self, title: &str, body: &str, author_id: UserId) -> Result<PostId> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO post (title, body, author_id) VALUES (?1, ?2, ?3)",
                rusqlite::params![title, body, author_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Overwrites title and body only; `created` and `author_id` are fixed.
    pub fn update_post(&self, id: PostId, title: &str, body: &str) -> Result<usize> {
        self.execute(
            "UPDATE post SET title = ?1, body = ?2 WHERE id = ?3",
            rusqlite::params![title, body, id],
        )
    }

    pub fn delete_post(&self, id: PostId) -> Result<usize> {
        self.execute("DELETE FROM post WHERE id = ?1", [id])
    }
}

fn user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
    })
}

fn post_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        created: row.get(3)?,
        author_id: row.get(4)?,
        author_username: row.get(5)?,
    })
}
