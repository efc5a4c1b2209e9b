pub(crate) mod migrations;
pub mod queries;

use std::future::Future;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use listkeeper_core::{CreateList, Deadline, List, UpdateList};

use crate::{Database, DbError};

const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Map a sqlx::Error into a DbError. Foreign-key refusals keep their own
/// variant.
pub(crate) fn pg_err(e: sqlx::Error) -> DbError {
    let is_fk = e
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == FOREIGN_KEY_VIOLATION);
    if is_fk {
        DbError::Constraint(e.to_string())
    } else {
        DbError::Internal(e.to_string())
    }
}

/// Create a DbError::NotFound with the given entity description.
pub(crate) fn pg_not_found(entity: &str) -> DbError {
    DbError::NotFound(entity.to_string())
}

/// Run `fut` only if the deadline has not passed, and abandon it when it does.
pub(crate) async fn bounded<T, F>(deadline: &Deadline, fut: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, DbError>>,
{
    deadline.check()?;
    tokio::time::timeout_at(deadline.expires_at(), fut)
        .await
        .map_err(|_| DbError::Timeout(deadline.budget()))?
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pub(crate) pool: PgPool,
}

impl PostgresDatabase {
    /// Connect to a Postgres database and run migrations.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(pg_err)?;

        let db = Self { pool };
        migrations::run(&db.pool).await?;
        Ok(db)
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    async fn fetch_top_level(&self, deadline: &Deadline) -> Result<Vec<List>, DbError> {
        bounded(deadline, self.pg_fetch_top_level()).await
    }
    async fn get_by_id(&self, deadline: &Deadline, id: i64) -> Result<List, DbError> {
        bounded(deadline, self.pg_get_by_id(id)).await
    }
    async fn store(&self, deadline: &Deadline, input: &CreateList) -> Result<List, DbError> {
        bounded(deadline, self.pg_store(input)).await
    }
    async fn update(
        &self,
        deadline: &Deadline,
        id: i64,
        update: &UpdateList,
    ) -> Result<List, DbError> {
        bounded(deadline, self.pg_update(deadline, id, update)).await
    }
    async fn delete(&self, deadline: &Deadline, id: i64) -> Result<(), DbError> {
        bounded(deadline, self.pg_delete(id)).await
    }
    async fn fetch_children(
        &self,
        deadline: &Deadline,
        parent_id: i64,
    ) -> Result<Vec<List>, DbError> {
        bounded(deadline, self.pg_fetch_children(parent_id)).await
    }
    async fn get_child(
        &self,
        deadline: &Deadline,
        parent_id: i64,
        id: i64,
    ) -> Result<List, DbError> {
        bounded(deadline, self.pg_get_child(parent_id, id)).await
    }
    async fn delete_child(
        &self,
        deadline: &Deadline,
        parent_id: i64,
        id: i64,
    ) -> Result<(), DbError> {
        bounded(deadline, self.pg_delete_child(parent_id, id)).await
    }
}
