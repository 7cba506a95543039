use crate::{models::resource::InvalidAttachmentKey, storage::codec::CodecError};
use sqlx::{Sqlite, Transaction};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("resource `{0}` already exists")]
    AlreadyExists(Uuid),
    #[error("resource has {count} content items, at most {max} allowed")]
    TooManyAttachments { count: usize, max: usize },
    #[error(transparent)]
    InvalidAttachmentKey(#[from] InvalidAttachmentKey),
    #[error("resource id list must not be empty")]
    EmptyIdList,
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// Begin or commit failed.
    #[error("failed to {stage} transaction: {source}")]
    Transaction {
        stage: &'static str,
        #[source]
        source: sqlx::Error,
    },
    /// Rolling back after `origin` failed as well.
    #[error("failed to rollback changes: {origin}\n{source}")]
    Rollback {
        origin: String,
        #[source]
        source: sqlx::Error,
    },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound(_))
    }

    pub(crate) fn resource_not_found(id: Uuid) -> Self {
        RepoError::NotFound(format!("resource `{}`", id))
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

pub(crate) async fn begin(db: &sqlx::SqlitePool) -> RepoResult<Transaction<'static, Sqlite>> {
    db.begin().await.map_err(|source| RepoError::Transaction {
        stage: "begin",
        source,
    })
}

/// Open a transaction that takes the database write lock up front.
///
/// A deferred transaction that reads before writing cannot wait for the
/// write lock and fails with `SQLITE_BUSY` when another writer holds it.
pub(crate) async fn begin_write(
    db: &sqlx::SqlitePool,
) -> RepoResult<Transaction<'static, Sqlite>> {
    db.begin_with("BEGIN IMMEDIATE")
        .await
        .map_err(|source| RepoError::Transaction {
            stage: "begin",
            source,
        })
}

pub(crate) async fn commit(tx: Transaction<'_, Sqlite>) -> RepoResult<()> {
    tx.commit().await.map_err(|source| RepoError::Transaction {
        stage: "commit",
        source,
    })
}

/// Roll back `tx` and hand back the error that caused it.
///
/// When the rollback itself fails both messages are kept.
pub(crate) async fn rollback_with(tx: Transaction<'_, Sqlite>, err: RepoError) -> RepoError {
    match tx.rollback().await {
        Ok(()) => err,
        Err(source) => {
            warn!("rollback after `{}` failed: {}", err, source);
            RepoError::Rollback {
                origin: err.to_string(),
                source,
            }
        }
    }
}

/// Return true if the driver reports a unique/primary key constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
