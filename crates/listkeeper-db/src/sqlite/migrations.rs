use rusqlite::Connection;
use tracing::info;

use super::SqliteResultExt;
use crate::DbError;

pub fn run(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )
    .to_db()?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .to_db()?;

    if current_version < 1 {
        // parent_id has no ON DELETE action: removing a list that still has
        // sublists is refused rather than cascaded.
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS lists (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                parent_id   INTEGER REFERENCES lists(id),
                title       VARCHAR(255) NOT NULL,
                description VARCHAR(1000) NOT NULL,
                attachment  VARCHAR(255),
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_lists_parent ON lists(parent_id);

            INSERT INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
            ",
        )
        .to_db()?;
        info!("applied sqlite migration v1");
    }

    Ok(())
}
