// Schema migrations, tracked in schema_version

use crate::queue_store::map_sqlx_error;
use nextup_core::error::Result;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// (version, description, sql) in apply order. Each file records its own
/// version row.
const MIGRATIONS: &[(i64, &str, &str)] = &[
    (
        1,
        "queue entries",
        include_str!("../migrations/001_initial_schema.sql"),
    ),
    (
        2,
        "high-water keys",
        include_str!("../migrations/002_high_water.sql"),
    ),
];

/// Bring the schema up to the latest version
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current = schema_version(pool).await?;
    debug!(current, "Schema version before migrations");

    for (version, description, sql) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
        info!(version, description, "Applying migration");
        apply(pool, sql).await?;
    }

    Ok(())
}

async fn schema_version(pool: &SqlitePool) -> Result<i64> {
    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
    )
    .fetch_one(pool)
    .await
    .map_err(map_sqlx_error)?;

    if tracked == 0 {
        return Ok(0);
    }

    let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .map_err(map_sqlx_error)?;
    Ok(version.unwrap_or(0))
}

/// One migration file, all statements in a single transaction
async fn apply(pool: &SqlitePool, sql: &str) -> Result<()> {
    let mut tx = pool.begin().await.map_err(map_sqlx_error)?;

    for statement in statements(sql) {
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
    }

    tx.commit().await.map_err(map_sqlx_error)
}

/// Split a script on `;`, dropping `--` comment lines and empty statements
///
/// Splitting happens before comments are stripped, so migration comments
/// must not contain `;`.
fn statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|chunk| {
            chunk
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|s| !s.is_empty())
        .collect()
}
