//! Administrator account seeding.
//!
//! Writes one administrator row straight into the users table. The
//! password is stored as the hex SHA-256 digest of the plaintext, which is
//! what the users API compares at login. Re-running is safe: an existing
//! row with the same username/email keeps its id and gets the new hash,
//! the admin flag and the `admin` role.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::config::{AdminConfig, Config};
use crate::db::UserStore;

/// Row written to `usuarios`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRecord {
    pub nombre: String,
    pub apellido: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub tipo: String,
}

impl AdminRecord {
    pub fn from_config(admin: &AdminConfig) -> Self {
        Self {
            nombre: admin.nombre.clone(),
            apellido: admin.apellido.clone(),
            username: admin.username.clone(),
            email: admin.email.clone(),
            password_hash: hash_password(&admin.password),
            is_admin: true,
            tipo: "admin".to_string(),
        }
    }
}

/// Hex-encoded SHA-256 of the plaintext password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

// Both statements key on either unique column, so a row matching only the
// email is promoted in place rather than failing the insert.
const MYSQL_UPSERT: &str = r#"
    INSERT INTO usuarios (nombre, apellido, username, email, password, is_admin, tipo)
    VALUES (?, ?, ?, ?, ?, ?, ?)
    ON DUPLICATE KEY UPDATE
        password = VALUES(password),
        is_admin = VALUES(is_admin),
        tipo = VALUES(tipo)
"#;

const SQLITE_UPSERT: &str = r#"
    INSERT INTO usuarios (nombre, apellido, username, email, password, is_admin, tipo)
    VALUES (?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(username) DO UPDATE SET
        password = excluded.password,
        is_admin = excluded.is_admin,
        tipo = excluded.tipo
    ON CONFLICT(email) DO UPDATE SET
        password = excluded.password,
        is_admin = excluded.is_admin,
        tipo = excluded.tipo
"#;

impl UserStore {
    /// Insert the administrator, or update hash/flag/role if it exists.
    pub async fn upsert_admin(&self, admin: &AdminRecord) -> Result<()> {
        match self {
            UserStore::MySql(pool) => {
                sqlx::query(MYSQL_UPSERT)
                    .bind(&admin.nombre)
                    .bind(&admin.apellido)
                    .bind(&admin.username)
                    .bind(&admin.email)
                    .bind(&admin.password_hash)
                    .bind(admin.is_admin)
                    .bind(&admin.tipo)
                    .execute(pool)
                    .await?;
            }
            UserStore::Sqlite(pool) => {
                sqlx::query(SQLITE_UPSERT)
                    .bind(&admin.nombre)
                    .bind(&admin.apellido)
                    .bind(&admin.username)
                    .bind(&admin.email)
                    .bind(&admin.password_hash)
                    .bind(admin.is_admin)
                    .bind(&admin.tipo)
                    .execute(pool)
                    .await?;
            }
        }
        Ok(())
    }
}

/// Run `gymsync seed admin`.
pub async fn run_seed_admin(config: &Config) -> Result<AdminRecord> {
    let record = AdminRecord::from_config(&config.admin);

    tracing::info!(username = %record.username, email = %record.email, "creating administrator");

    let store = UserStore::connect(&config.users.database_url).await?;
    let result = store
        .upsert_admin(&record)
        .await
        .with_context(|| format!("Failed to upsert administrator '{}'", record.username));
    let backend = store.backend();
    store.close().await;
    result?;

    println!("seed admin");
    println!("  store: {}", backend);
    println!("  username: {}", record.username);
    println!("  email: {}", record.email);
    println!("  password hash: {}", record.password_hash);
    println!("ok");

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_hex_sha256() {
        assert_eq!(
            hash_password("admin123"),
            "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9"
        );
        assert_eq!(hash_password("admin123").len(), 64);
    }

    #[test]
    fn test_record_from_default_config() {
        let record = AdminRecord::from_config(&AdminConfig::default());
        assert_eq!(record.username, "admin");
        assert_eq!(record.email, "admin@gym.com");
        assert_eq!(record.tipo, "admin");
        assert!(record.is_admin);
        assert_eq!(record.password_hash, hash_password("admin123"));
    }
}
