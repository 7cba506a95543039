#![allow(dead_code)]

use resource_store::{
    db,
    models::resource::{ContentMap, Resource},
    services::resource_service::ResourceService,
    storage::{RepositoryPolicy, ResourceRepository},
};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{path::Path, str::FromStr, sync::Arc};
use uuid::Uuid;

pub const DOCUMENT: i64 = 1;
pub const CONTENT: i64 = 2;

/// Single-connection in-memory database with the schema applied.
pub async fn test_pool() -> Arc<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    let migrations = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    db::run_migrations(&pool, &migrations).await.unwrap();
    Arc::new(pool)
}

/// File-backed database opened the way the server opens it, with the
/// schema applied. The file lives in `dir`.
pub async fn file_pool(dir: &Path) -> Arc<SqlitePool> {
    let url = format!("sqlite://{}", dir.join("resources.db").display());
    let pool = db::connect(&url).await.unwrap();

    let migrations = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    db::run_migrations(&pool, &migrations).await.unwrap();
    Arc::new(pool)
}

pub async fn test_repo() -> ResourceRepository {
    ResourceRepository::new(test_pool().await, RepositoryPolicy::default())
}

pub async fn test_service() -> ResourceService {
    ResourceService::new(test_pool().await, RepositoryPolicy::default())
}

pub fn content(location: &str, attachments: &[(Uuid, &str)]) -> ContentMap {
    let mut map = ContentMap::with_location("location", location);
    for (id, loc) in attachments {
        map.insert(id.to_string(), *loc);
    }
    map
}

pub fn resource(category: i64, content: ContentMap) -> Resource {
    Resource::new(Uuid::new_v4(), category, content)
}

pub async fn row_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM resources")
        .fetch_one(pool)
        .await
        .unwrap()
}
