pub(crate) mod migrations;
pub mod queries;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use listkeeper_core::{CreateList, Deadline, List, UpdateList};

use crate::{Database, DbConfig, DbError};

/// Converts `rusqlite::Result<T>` into `Result<T, DbError>` so query code
/// can use `.to_db()?`.
pub(crate) trait SqliteResultExt<T> {
    fn to_db(self) -> Result<T, DbError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_db(self) -> Result<T, DbError> {
        self.map_err(map_sqlite_err)
    }
}

#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open(config: &DbConfig) -> Result<Self, DbError> {
        let path = config
            .sqlite_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::data_dir().join("listkeeper.db"));
        std::fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
        Self::open_path(&path)
    }

    pub fn open_path(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path).to_db()?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )
        .to_db()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().to_db()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;").to_db()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        f(&conn)
    }

    /// Like `with_conn`, but gives up if the deadline passes before or while
    /// waiting for the connection.
    pub(crate) fn with_conn_until<F, T>(&self, deadline: &Deadline, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        deadline.check()?;
        self.with_conn(|conn| {
            deadline.check()?;
            f(conn)
        })
    }

    /// Run a synchronous query on the blocking pool.
    async fn blocking<F, T>(&self, deadline: &Deadline, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&SqliteDatabase, &Deadline) -> Result<T, DbError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        let deadline = *deadline;
        tokio::task::spawn_blocking(move || f(&db, &deadline))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }

    fn run_migrations(&self) -> Result<(), DbError> {
        self.with_conn(|conn| {
            migrations::run(conn)?;
            Ok(())
        })
    }
}

/// Foreign-key refusals become `DbError::Constraint`; everything else is
/// internal.
pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> DbError {
    match e {
        rusqlite::Error::SqliteFailure(err, msg)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            DbError::Constraint(msg.unwrap_or_else(|| err.to_string()))
        }
        other => DbError::Internal(other.to_string()),
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn fetch_top_level(&self, deadline: &Deadline) -> Result<Vec<List>, DbError> {
        self.blocking(deadline, |db, deadline| db.fetch_top_level_sync(deadline))
            .await
    }

    async fn get_by_id(&self, deadline: &Deadline, id: i64) -> Result<List, DbError> {
        self.blocking(deadline, move |db, deadline| db.get_by_id_sync(deadline, id))
            .await
    }

    async fn store(&self, deadline: &Deadline, input: &CreateList) -> Result<List, DbError> {
        let input = input.clone();
        self.blocking(deadline, move |db, deadline| db.store_sync(deadline, &input))
            .await
    }

    async fn update(
        &self,
        deadline: &Deadline,
        id: i64,
        update: &UpdateList,
    ) -> Result<List, DbError> {
        let update = update.clone();
        self.blocking(deadline, move |db, deadline| {
            db.update_sync(deadline, id, &update)
        })
        .await
    }

    async fn delete(&self, deadline: &Deadline, id: i64) -> Result<(), DbError> {
        self.blocking(deadline, move |db, deadline| db.delete_sync(deadline, id))
            .await
    }

    async fn fetch_children(
        &self,
        deadline: &Deadline,
        parent_id: i64,
    ) -> Result<Vec<List>, DbError> {
        self.blocking(deadline, move |db, deadline| {
            db.fetch_children_sync(deadline, parent_id)
        })
        .await
    }

    async fn get_child(
        &self,
        deadline: &Deadline,
        parent_id: i64,
        id: i64,
    ) -> Result<List, DbError> {
        self.blocking(deadline, move |db, deadline| {
            db.get_child_sync(deadline, parent_id, id)
        })
        .await
    }

    async fn delete_child(
        &self,
        deadline: &Deadline,
        parent_id: i64,
        id: i64,
    ) -> Result<(), DbError> {
        self.blocking(deadline, move |db, deadline| {
            db.delete_child_sync(deadline, parent_id, id)
        })
        .await
    }
}
