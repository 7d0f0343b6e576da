use std::path::PathBuf;

use quill_db::{Database, DbConn, RequestDb};

/// Database file under the temp dir, removed on drop.
pub struct TempDb {
    pub db: Database,
    req: RequestDb,
    path: PathBuf,
}

impl TempDb {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("quill-api-{}.sqlite", uuid::Uuid::new_v4()));
        let db = Database::open(&path).unwrap();
        let req = db.request();
        Self { db, req, path }
    }

    pub fn conn(&self) -> DbConn {
        self.req.get_connection().unwrap()
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}
