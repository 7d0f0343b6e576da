use rusqlite::Connection;
use tracing::info;

use crate::Result;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS user (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        username    TEXT NOT NULL UNIQUE,
        password    TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS post (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        author_id   INTEGER NOT NULL REFERENCES user(id),
        created     TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        title       TEXT NOT NULL,
        body        TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_post_created
        ON post(created);
";

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    info!("Database migrations complete");
    Ok(())
}

/// Clear existing data and create fresh tables.
pub fn reset(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        DROP TABLE IF EXISTS post;
        DROP TABLE IF EXISTS user;
        ",
    )?;

    run(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_count(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('user', 'post')",
            [],
            |r| r.get(0),
        )
        .unwrap()
    }

    #[test]
    fn run_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();
        assert_eq!(table_count(&conn), 2);
    }

    #[test]
    fn reset_clears_rows() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        conn.execute("INSERT INTO user (username, password) VALUES ('a', 'b')", [])
            .unwrap();

        reset(&conn).unwrap();

        let users: i64 = conn
            .query_row("SELECT COUNT(*) FROM user", [], |r| r.get(0))
            .unwrap();
        assert_eq!(users, 0);
        assert_eq!(table_count(&conn), 2);
    }
}
