use anyhow::{bail, Result};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::UserStore;

/// Create the `usuarios` table on a local SQLite store.
///
/// MySQL stores belong to the users service, which owns their schema.
pub async fn run_migrations(config: &Config) -> Result<()> {
    match UserStore::connect(&config.users.database_url).await? {
        UserStore::Sqlite(pool) => {
            create_user_table(&pool).await?;
            pool.close().await;
            Ok(())
        }
        UserStore::MySql(pool) => {
            pool.close().await;
            bail!("init only manages SQLite stores; the MySQL schema is owned by the users service")
        }
    }
}

async fn create_user_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS usuarios (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL,
            apellido TEXT NOT NULL,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            is_admin INTEGER NOT NULL DEFAULT 0,
            tipo TEXT NOT NULL DEFAULT 'cliente'
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
