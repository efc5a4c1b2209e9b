use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::debug;

use listkeeper_core::{CreateList, Deadline, List, UpdateList};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_list(row: &Row) -> rusqlite::Result<List> {
    Ok(List {
        id: row.get("id")?,
        parent_id: row.get("parent_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        attachment: row.get("attachment")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        children: Vec::new(),
    })
}

fn query_lists(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<List>, DbError> {
    let mut stmt = conn.prepare(sql).to_db()?;
    let lists = stmt
        .query_map(params, row_to_list)
        .to_db()?
        .collect::<Result<Vec<_>, _>>()
        .to_db()?;
    Ok(lists)
}

fn select_list(conn: &Connection, id: i64) -> Result<List, DbError> {
    conn.query_row(
        "SELECT * FROM lists WHERE id = ?1",
        params![id],
        row_to_list,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("list {id}")),
        other => DbError::Internal(other.to_string()),
    })
}

/// Empty strings count as "not supplied".
fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl SqliteDatabase {
    pub fn fetch_top_level_sync(&self, deadline: &Deadline) -> Result<Vec<List>, DbError> {
        self.with_conn_until(deadline, |conn| {
            query_lists(
                conn,
                "SELECT * FROM lists WHERE parent_id IS NULL ORDER BY id",
                [],
            )
        })
    }

    pub fn get_by_id_sync(&self, deadline: &Deadline, id: i64) -> Result<List, DbError> {
        self.with_conn_until(deadline, |conn| {
            let mut list = select_list(conn, id)?;
            list.children = query_lists(
                conn,
                "SELECT * FROM lists WHERE parent_id = ?1 ORDER BY id",
                params![id],
            )?;
            Ok(list)
        })
    }

    pub fn store_sync(&self, deadline: &Deadline, input: &CreateList) -> Result<List, DbError> {
        self.with_conn_until(deadline, |conn| {
            let tx = conn.unchecked_transaction().to_db()?;
            let now = Utc::now();
            tx.execute(
                "INSERT INTO lists (parent_id, title, description, attachment, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    input.parent_id,
                    input.title,
                    input.description,
                    input.attachment,
                    now,
                    now
                ],
            )
            .to_db()?;
            let list = select_list(&tx, tx.last_insert_rowid())?;
            deadline.check()?;
            tx.commit().to_db()?;
            Ok(list)
        })
    }

    pub fn update_sync(
        &self,
        deadline: &Deadline,
        id: i64,
        update: &UpdateList,
    ) -> Result<List, DbError> {
        self.with_conn_until(deadline, |conn| {
            if update.is_empty() {
                return select_list(conn, id);
            }

            let mut sets = Vec::new();
            let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(title) = supplied(&update.title) {
                sets.push("title = ?");
                values.push(Box::new(title.to_string()));
            }
            if let Some(description) = supplied(&update.description) {
                sets.push("description = ?");
                values.push(Box::new(description.to_string()));
            }
            if let Some(attachment) = supplied(&update.attachment) {
                sets.push("attachment = ?");
                values.push(Box::new(attachment.to_string()));
            }

            sets.push("updated_at = ?");
            values.push(Box::new(Utc::now()));
            values.push(Box::new(id));

            let tx = conn.unchecked_transaction().to_db()?;
            let sql = format!("UPDATE lists SET {} WHERE id = ?", sets.join(", "));
            let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
            let changed = tx.execute(&sql, params.as_slice()).to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("list {id}")));
            }
            let list = select_list(&tx, id)?;

            // Dropping the transaction rolls the write back.
            deadline.check()?;
            tx.commit().to_db()?;
            Ok(list)
        })
    }

    pub fn delete_sync(&self, deadline: &Deadline, id: i64) -> Result<(), DbError> {
        self.with_conn_until(deadline, |conn| {
            let changed = conn
                .execute(
                    "DELETE FROM lists WHERE id = ?1 AND parent_id IS NULL",
                    params![id],
                )
                .to_db()?;
            if changed == 0 {
                debug!(id, "delete matched no top-level list");
            }
            Ok(())
        })
    }

    pub fn fetch_children_sync(
        &self,
        deadline: &Deadline,
        parent_id: i64,
    ) -> Result<Vec<List>, DbError> {
        self.with_conn_until(deadline, |conn| {
            query_lists(
                conn,
                "SELECT * FROM lists WHERE parent_id = ?1 ORDER BY id",
                params![parent_id],
            )
        })
    }

    pub fn get_child_sync(
        &self,
        deadline: &Deadline,
        parent_id: i64,
        id: i64,
    ) -> Result<List, DbError> {
        self.with_conn_until(deadline, |conn| {
            conn.query_row(
                "SELECT * FROM lists WHERE id = ?1 AND parent_id = ?2",
                params![id, parent_id],
                row_to_list,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    DbError::NotFound(format!("sublist {id} of list {parent_id}"))
                }
                other => DbError::Internal(other.to_string()),
            })
        })
    }

    pub fn delete_child_sync(
        &self,
        deadline: &Deadline,
        parent_id: i64,
        id: i64,
    ) -> Result<(), DbError> {
        self.with_conn_until(deadline, |conn| {
            let changed = conn
                .execute(
                    "DELETE FROM lists WHERE id = ?1 AND parent_id = ?2",
                    params![id, parent_id],
                )
                .to_db()?;
            if changed == 0 {
                debug!(id, parent_id, "delete matched no sublist");
            }
            Ok(())
        })
    }
}
