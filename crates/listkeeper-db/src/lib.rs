#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub use postgres::PostgresDatabase;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use listkeeper_core::{CreateList, Deadline, DeadlineExceeded, List, UpdateList};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    /// The storage engine refused the write because of a foreign-key rule,
    /// e.g. deleting a list that still has sublists.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("deadline of {0:?} exceeded")]
    Timeout(Duration),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Internal(String),
}

impl From<DeadlineExceeded> for DbError {
    fn from(e: DeadlineExceeded) -> Self {
        DbError::Timeout(e.budget)
    }
}

/// Storage contract for lists and their sublists.
///
/// Every call is bounded by the caller's [`Deadline`]. Deletes are scoped
/// (top-level only, or one parent's children only) and succeed when nothing
/// matched.
#[async_trait]
pub trait Database: Send + Sync {
    /// Lists without a parent, children not loaded.
    async fn fetch_top_level(&self, deadline: &Deadline) -> Result<Vec<List>, DbError>;
    /// A single list with its children loaded.
    async fn get_by_id(&self, deadline: &Deadline, id: i64) -> Result<List, DbError>;
    async fn store(&self, deadline: &Deadline, input: &CreateList) -> Result<List, DbError>;
    /// Writes only the supplied, non-empty fields.
    async fn update(
        &self,
        deadline: &Deadline,
        id: i64,
        update: &UpdateList,
    ) -> Result<List, DbError>;
    async fn delete(&self, deadline: &Deadline, id: i64) -> Result<(), DbError>;

    async fn fetch_children(
        &self,
        deadline: &Deadline,
        parent_id: i64,
    ) -> Result<Vec<List>, DbError>;
    async fn get_child(
        &self,
        deadline: &Deadline,
        parent_id: i64,
        id: i64,
    ) -> Result<List, DbError>;
    async fn delete_child(
        &self,
        deadline: &Deadline,
        parent_id: i64,
        id: i64,
    ) -> Result<(), DbError>;
}

/// Backend selection. A `postgres://` URL wins over the SQLite path.
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    pub database_url: Option<String>,
    pub sqlite_path: Option<String>,
}

impl DbConfig {
    pub fn is_postgres(&self) -> bool {
        self.database_url.as_deref().is_some_and(|url| {
            url.starts_with("postgres://") || url.starts_with("postgresql://")
        })
    }
}

/// Open the configured backend.
pub async fn connect(config: &DbConfig) -> Result<Arc<dyn Database>, DbError> {
    if config.is_postgres() {
        #[cfg(feature = "postgres")]
        {
            let url = config.database_url.as_deref().unwrap_or_default();
            return Ok(Arc::new(PostgresDatabase::connect(url).await?));
        }
        #[cfg(not(feature = "postgres"))]
        {
            return Err(DbError::Internal(
                "postgres URL configured but the 'postgres' feature is not enabled".into(),
            ));
        }
    }

    #[cfg(feature = "sqlite")]
    {
        Ok(Arc::new(SqliteDatabase::open(config)?))
    }
    #[cfg(not(feature = "sqlite"))]
    {
        Err(DbError::Internal(
            "no database backend enabled; build with 'sqlite' or 'postgres'".into(),
        ))
    }
}

pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("listkeeper")
}
