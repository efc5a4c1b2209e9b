use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};

use crate::DbError;

/// Session-level advisory lock key ("listkeep"). Held for the whole run so
/// servers starting together apply each version once.
const MIGRATION_LOCK_KEY: i64 = 0x6c69_7374_6b65_6570;

const MIGRATIONS: &[(i32, &str)] = &[(1, include_str!("sql/V1__initial.sql"))];

fn migration_err(e: sqlx::Error) -> DbError {
    DbError::Internal(format!("migration: {e}"))
}

pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    // Lock, migrate and unlock on one connection: the lock belongs to the
    // session that took it.
    let mut conn = pool.acquire().await.map_err(migration_err)?;

    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *conn)
        .await
        .map_err(migration_err)?;

    let result = apply_pending(&mut *conn).await;

    let unlocked: Result<bool, sqlx::Error> =
        sqlx::query_scalar("SELECT pg_advisory_unlock($1)")
            .bind(MIGRATION_LOCK_KEY)
            .fetch_one(&mut *conn)
            .await;
    match unlocked {
        Ok(true) => {}
        Ok(false) => warn!("migration lock was not held at unlock"),
        Err(e) => {
            // The lock dies with the session; don't hand it back to the pool.
            warn!(error = %e, "failed to release migration lock");
            conn.detach();
        }
    }

    result
}

async fn apply_pending(conn: &mut PgConnection) -> Result<(), DbError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(&mut *conn)
    .await
    .map_err(migration_err)?;

    let current: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
        .fetch_one(&mut *conn)
        .await
        .map_err(migration_err)?;

    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        sqlx::raw_sql(sql)
            .execute(&mut *conn)
            .await
            .map_err(migration_err)?;
        info!(version, "applied postgres migration");
    }

    Ok(())
}
