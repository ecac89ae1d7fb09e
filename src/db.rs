use anyhow::{bail, Context, Result};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Connection to the relational user store.
///
/// The backend is picked from the URL scheme: `mysql://` for the users
/// service database, `sqlite:` for local development and tests.
pub enum UserStore {
    MySql(MySqlPool),
    Sqlite(SqlitePool),
}

impl UserStore {
    pub async fn connect(url: &str) -> Result<Self> {
        if url.starts_with("mysql:") {
            let pool = MySqlPoolOptions::new()
                .max_connections(1)
                .connect(url)
                .await
                .context("Failed to connect to MySQL user store")?;
            return Ok(UserStore::MySql(pool));
        }

        if url.starts_with("sqlite:") {
            let options = SqliteConnectOptions::from_str(url)?
                .create_if_missing(true)
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

            // Ensure parent directory exists
            let path = options.get_filename();
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await
                .context("Failed to open SQLite user store")?;
            return Ok(UserStore::Sqlite(pool));
        }

        bail!("Unsupported user store URL: '{}'", url)
    }

    pub fn backend(&self) -> &'static str {
        match self {
            UserStore::MySql(_) => "mysql",
            UserStore::Sqlite(_) => "sqlite",
        }
    }

    pub async fn close(self) {
        match self {
            UserStore::MySql(pool) => pool.close().await,
            UserStore::Sqlite(pool) => pool.close().await,
        }
    }
}
