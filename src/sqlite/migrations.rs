//! Embedded schema migrations, tracked in `_gatehouse_migrations`.
//!
//! ```rust,ignore
//! let pool = sqlx::SqlitePool::connect("sqlite::memory:").await?;
//! gatehouse::sqlite::migrations::run(&pool).await?;
//! ```

use sqlx::{Executor, SqlitePool};

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250301000001_create_users_table",
        include_str!("../../migrations_sqlite/20250301000001_create_users_table.sql"),
    ),
    (
        "20250301000002_create_refresh_tokens_table",
        include_str!("../../migrations_sqlite/20250301000002_create_refresh_tokens_table.sql"),
    ),
];

/// Applies every migration not yet recorded. Safe to call on each start.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    pool.execute(
        r"
        CREATE TABLE IF NOT EXISTS _gatehouse_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        ",
    )
    .await?;

    for (name, sql) in MIGRATIONS {
        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _gatehouse_migrations WHERE name = ?)")
                .bind(*name)
                .fetch_one(pool)
                .await?;

        if applied {
            continue;
        }

        // statements are split on ';', so migrations must not contain it in literals
        for statement in sql.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                pool.execute(trimmed).await?;
            }
        }

        sqlx::query("INSERT INTO _gatehouse_migrations (name) VALUES (?)")
            .bind(*name)
            .execute(pool)
            .await?;

        log::info!(target: "gatehouse", "msg=\"migration applied\", name=\"{name}\"");
    }

    Ok(())
}
