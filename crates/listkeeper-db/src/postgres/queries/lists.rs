use chrono::{DateTime, Utc};
use tracing::debug;

use listkeeper_core::{CreateList, Deadline, List, UpdateList};

use super::super::{pg_err, pg_not_found, PostgresDatabase};
use crate::DbError;

#[derive(sqlx::FromRow)]
struct ListRow {
    id: i64,
    parent_id: Option<i64>,
    title: String,
    description: String,
    attachment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ListRow> for List {
    fn from(r: ListRow) -> Self {
        List {
            id: r.id,
            parent_id: r.parent_id,
            title: r.title,
            description: r.description,
            attachment: r.attachment,
            created_at: r.created_at,
            updated_at: r.updated_at,
            children: Vec::new(),
        }
    }
}

impl PostgresDatabase {
    pub(crate) async fn pg_fetch_top_level(&self) -> Result<Vec<List>, DbError> {
        let rows = sqlx::query_as::<_, ListRow>(
            "SELECT * FROM lists WHERE parent_id IS NULL ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    pub(crate) async fn pg_get_by_id(&self, id: i64) -> Result<List, DbError> {
        let row = sqlx::query_as::<_, ListRow>("SELECT * FROM lists WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(pg_err)?
            .ok_or_else(|| pg_not_found(&format!("list {id}")))?;

        let mut list: List = row.into();
        list.children = self.pg_fetch_children(id).await?;
        Ok(list)
    }

    pub(crate) async fn pg_store(&self, input: &CreateList) -> Result<List, DbError> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, ListRow>(
            "INSERT INTO lists (parent_id, title, description, attachment, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(input.parent_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.attachment)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(row.into())
    }

    pub(crate) async fn pg_update(
        &self,
        deadline: &Deadline,
        id: i64,
        update: &UpdateList,
    ) -> Result<List, DbError> {
        if update.is_empty() {
            let row = sqlx::query_as::<_, ListRow>("SELECT * FROM lists WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(pg_err)?
                .ok_or_else(|| pg_not_found(&format!("list {id}")))?;
            return Ok(row.into());
        }

        let mut sets = Vec::new();
        let mut values: Vec<&str> = Vec::new();
        let mut param_idx = 1usize;

        let fields = [
            ("title", &update.title),
            ("description", &update.description),
            ("attachment", &update.attachment),
        ];
        for (column, value) in fields {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                sets.push(format!("{column} = ${param_idx}"));
                values.push(value);
                param_idx += 1;
            }
        }

        sets.push(format!("updated_at = ${param_idx}"));
        let id_param = param_idx + 1;
        let sql = format!(
            "UPDATE lists SET {} WHERE id = ${id_param} RETURNING *",
            sets.join(", ")
        );

        let mut tx = self.pool.begin().await.map_err(pg_err)?;

        let mut query = sqlx::query_as::<_, ListRow>(&sql);
        for value in values {
            query = query.bind(value);
        }
        let row = query
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(pg_err)?
            .ok_or_else(|| pg_not_found(&format!("list {id}")))?;

        // An uncommitted transaction is rolled back when dropped.
        deadline.check()?;
        tx.commit().await.map_err(pg_err)?;

        Ok(row.into())
    }

    pub(crate) async fn pg_delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1 AND parent_id IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(pg_err)?;

        if result.rows_affected() == 0 {
            debug!(id, "delete matched no top-level list");
        }
        Ok(())
    }

    pub(crate) async fn pg_fetch_children(&self, parent_id: i64) -> Result<Vec<List>, DbError> {
        let rows = sqlx::query_as::<_, ListRow>(
            "SELECT * FROM lists WHERE parent_id = $1 ORDER BY id",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    pub(crate) async fn pg_get_child(&self, parent_id: i64, id: i64) -> Result<List, DbError> {
        let row = sqlx::query_as::<_, ListRow>(
            "SELECT * FROM lists WHERE id = $1 AND parent_id = $2",
        )
        .bind(id)
        .bind(parent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(pg_err)?
        .ok_or_else(|| pg_not_found(&format!("sublist {id} of list {parent_id}")))?;

        Ok(row.into())
    }

    pub(crate) async fn pg_delete_child(&self, parent_id: i64, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1 AND parent_id = $2")
            .bind(id)
            .bind(parent_id)
            .execute(&self.pool)
            .await
            .map_err(pg_err)?;

        if result.rows_affected() == 0 {
            debug!(id, parent_id, "delete matched no sublist");
        }
        Ok(())
    }
}
