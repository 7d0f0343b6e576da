pub mod migrations;
pub mod models;
pub mod queries;

use rusqlite::{Connection, Params, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("connection closed")]
    Closed,
    #[error("database lock poisoned: {0}")]
    Poisoned(String),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl DbError {
    /// UNIQUE / FOREIGN KEY / NOT NULL failures reported by SQLite.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DbError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Handle to the on-disk store. Holds no connection itself: every request
/// gets its own through [`Database::request`].
#[derive(Debug, Clone)]
pub struct Database {
    path: Arc<PathBuf>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            path: Arc::new(path.to_path_buf()),
        })
    }

    /// Drop every table and recreate the schema.
    pub fn init(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::reset(&conn)?;

        info!("Database initialized at {}", path.display());
        Ok(Self {
            path: Arc::new(path.to_path_buf()),
        })
    }

    /// A fresh request-scoped handle. Nothing is opened until the first
    /// [`RequestDb::get_connection`].
    pub fn request(&self) -> RequestDb {
        RequestDb {
            inner: Arc::new(RequestDbInner {
                path: Arc::clone(&self.path),
                slot: Mutex::new(Slot::Unopened),
            }),
        }
    }
}

enum Slot {
    Unopened,
    Open(DbConn),
    Closed,
}

struct RequestDbInner {
    path: Arc<PathBuf>,
    slot: Mutex<Slot>,
}

impl Drop for RequestDbInner {
    fn drop(&mut self) {
        let slot = match self.slot.get_mut() {
            Ok(slot) => std::mem::replace(slot, Slot::Closed),
            Err(poisoned) => std::mem::replace(poisoned.into_inner(), Slot::Closed),
        };
        if let Slot::Open(conn) = slot {
            let _ = conn.close();
        }
    }
}

/// Request-scoped connection cache: opens on first use, hands out the same
/// connection for the rest of the request, and refuses to reopen once closed.
#[derive(Clone)]
pub struct RequestDb {
    inner: Arc<RequestDbInner>,
}

impl RequestDb {
    pub fn get_connection(&self) -> Result<DbConn> {
        let mut slot = self
            .inner
            .slot
            .lock()
            .map_err(|e| DbError::Poisoned(e.to_string()))?;

        match &*slot {
            Slot::Open(conn) => Ok(conn.clone()),
            Slot::Closed => Err(DbError::Closed),
            Slot::Unopened => {
                let conn = Connection::open(self.inner.path.as_path())?;
                conn.pragma_update(None, "foreign_keys", "ON")?;
                debug!("Opened request connection to {}", self.inner.path.display());

                let conn = DbConn::new(conn);
                *slot = Slot::Open(conn.clone());
                Ok(conn)
            }
        }
    }

    /// Request teardown. Safe to call more than once or without a prior open.
    pub fn close_connection(&self) -> Result<()> {
        let previous = {
            let mut slot = self
                .inner
                .slot
                .lock()
                .map_err(|e| DbError::Poisoned(e.to_string()))?;
            std::mem::replace(&mut *slot, Slot::Closed)
        };

        match previous {
            Slot::Open(conn) => conn.close(),
            Slot::Unopened | Slot::Closed => Ok(()),
        }
    }
}

/// Shared handle to one SQLite connection. Clones point at the same
/// connection; once it is closed every call fails with [`DbError::Closed`].
#[derive(Clone)]
pub struct DbConn {
    inner: Arc<Mutex<Option<Connection>>>,
}

impl DbConn {
    fn new(conn: Connection) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(conn))),
        }
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let guard = self
            .inner
            .lock()
            .map_err(|e| DbError::Poisoned(e.to_string()))?;
        let conn = guard.as_ref().ok_or(DbError::Closed)?;
        f(conn)
    }

    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute(sql, params)?))
    }

    /// First row of the result, or `None` when the query matched nothing.
    pub fn query_row<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_conn(|conn| match conn.query_row(sql, params, f) {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        })
    }

    pub fn query_map<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map(params, f)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Writes autocommit, so this only has work to do inside an explicit
    /// `BEGIN`.
    pub fn commit(&self) -> Result<()> {
        self.with_conn(|conn| {
            if !conn.is_autocommit() {
                conn.execute_batch("COMMIT")?;
            }
            Ok(())
        })
    }

    pub fn same_as(&self, other: &DbConn) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().map(|conn| conn.is_none()).unwrap_or(true)
    }

    fn close(&self) -> Result<()> {
        let conn = self
            .inner
            .lock()
            .map_err(|e| DbError::Poisoned(e.to_string()))?
            .take();

        if let Some(conn) = conn {
            conn.close().map_err(|(_, e)| DbError::Sqlite(e))?;
            debug!("Closed request connection");
        }
        Ok(())
    }
}
