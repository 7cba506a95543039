//! Connection setup and schema migration bootstrap.

use anyhow::{Context, Result};
use sqlx::{
    SqlitePool,
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{path::Path, str::FromStr, time::Duration};

const MIGRATION_ATTEMPTS: u32 = 20;
const MIGRATION_RETRY_DELAY: Duration = Duration::from_secs(1);
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a SQLite pool, creating the database file (and its directory) if needed.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    tracing::debug!("Connecting using raw URL => {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("parsing database URL `{}`", database_url))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    let db_path = options.get_filename();
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("connecting to `{}`", database_url))?;
    Ok(pool)
}

/// Apply every pending migration found in `dir`.
///
/// The database may still be starting up, so failed attempts are retried.
pub async fn run_migrations(db: &SqlitePool, dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Migration directory not found: {}", dir.display());
    }

    let migrator = Migrator::new(dir)
        .await
        .with_context(|| format!("loading migrations from {}", dir.display()))?;
    tracing::info!(
        "Running {} migration(s) from {}",
        migrator.iter().count(),
        dir.display()
    );

    let mut attempt = 1;
    loop {
        match migrator.run(db).await {
            Ok(()) => return Ok(()),
            Err(err) if attempt < MIGRATION_ATTEMPTS => {
                tracing::warn!(
                    "Failed to execute migration (attempt {}/{}): {}. Retrying...",
                    attempt,
                    MIGRATION_ATTEMPTS,
                    err
                );
                attempt += 1;
                tokio::time::sleep(MIGRATION_RETRY_DELAY).await;
            }
            Err(err) => {
                return Err(err).context("migration failed after multiple retries");
            }
        }
    }
}
