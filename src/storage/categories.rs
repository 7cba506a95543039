//! Category lookup: resolves category names and ids against the
//! read-only `categories` table.

use crate::{
    models::category::Category,
    storage::error::{RepoError, RepoResult, begin, commit, rollback_with},
};
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use tracing::debug;

const SELECT_CATEGORY: &str = "SELECT id, name, description FROM categories";

#[derive(Clone)]
pub struct CategoryLookup {
    db: Arc<SqlitePool>,
}

impl CategoryLookup {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Resolve a category by its unique name.
    pub async fn get_category_by_name(&self, name: &str) -> RepoResult<Category> {
        debug!("looking up category `{}`", name);
        let mut tx = begin(&self.db).await?;
        match fetch_by_name(&mut tx, name).await {
            Ok(category) => {
                commit(tx).await?;
                Ok(category)
            }
            Err(err) => Err(rollback_with(tx, err).await),
        }
    }

    pub async fn get_category_by_id(&self, id: i64) -> RepoResult<Category> {
        debug!("looking up category {}", id);
        let mut tx = begin(&self.db).await?;
        match fetch_by_id(&mut tx, id).await {
            Ok(category) => {
                commit(tx).await?;
                Ok(category)
            }
            Err(err) => Err(rollback_with(tx, err).await),
        }
    }

    /// List every category ordered by id.
    ///
    /// An empty table is reported as `NotFound` rather than an empty list.
    pub async fn get_categories(&self) -> RepoResult<Vec<Category>> {
        let mut tx = begin(&self.db).await?;
        let result = sqlx::query_as::<_, Category>(&format!("{} ORDER BY id ASC", SELECT_CATEGORY))
            .fetch_all(&mut *tx)
            .await
            .map_err(RepoError::from)
            .and_then(|categories| {
                if categories.is_empty() {
                    Err(RepoError::NotFound("categories".into()))
                } else {
                    Ok(categories)
                }
            });

        match result {
            Ok(categories) => {
                commit(tx).await?;
                Ok(categories)
            }
            Err(err) => Err(rollback_with(tx, err).await),
        }
    }
}

/// Name lookup on an already open connection or transaction.
pub(crate) async fn fetch_by_name(conn: &mut SqliteConnection, name: &str) -> RepoResult<Category> {
    sqlx::query_as::<_, Category>(&format!("{} WHERE name = ?", SELECT_CATEGORY))
        .bind(name)
        .fetch_one(conn)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => RepoError::NotFound(format!("category `{}`", name)),
            other => RepoError::Sqlx(other),
        })
}

pub(crate) async fn fetch_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Category> {
    sqlx::query_as::<_, Category>(&format!("{} WHERE id = ?", SELECT_CATEGORY))
        .bind(id)
        .fetch_one(conn)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => RepoError::NotFound(format!("category {}", id)),
            other => RepoError::Sqlx(other),
        })
}
