//! src/services/resource_service.rs
//!
//! ResourceService — boundary-facing orchestration over the repository.
//! Translates repository failures into the two kinds the API exposes:
//! "not found" and "internal".

use crate::{
    models::{
        category::Category,
        resource::{ContentMap, Resource},
    },
    storage::{RepoError, RepositoryPolicy, ResourceRepository},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Client-visible classification of a service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Internal,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    NotFound(RepoError),
    #[error(transparent)]
    Internal(RepoError),
    #[error("resource `{0}` is still present after delete")]
    StillPresent(Uuid),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::Internal(_) | ServiceError::StillPresent(_) => ErrorKind::Internal,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(err: RepoError) -> Self {
        if err.is_not_found() {
            ServiceError::NotFound(err)
        } else {
            ServiceError::Internal(err)
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct ResourceService {
    /// Shared SQLite pool, also used by readiness checks.
    pub db: Arc<SqlitePool>,

    repo: ResourceRepository,
}

impl ResourceService {
    pub fn new(db: Arc<SqlitePool>, policy: RepositoryPolicy) -> Self {
        Self {
            repo: ResourceRepository::new(db.clone(), policy),
            db,
        }
    }

    pub fn policy(&self) -> &RepositoryPolicy {
        self.repo.policy()
    }

    pub async fn add_resource(&self, resource: Resource) -> ServiceResult<Resource> {
        debug!("adding resource {}", resource.id);
        self.repo.add_resource(&resource).await?;
        Ok(resource)
    }

    pub async fn get_resource_by_id(&self, id: Uuid) -> ServiceResult<Resource> {
        debug!("getting resource by id");
        Ok(self.repo.get_resource_by_id(id).await?)
    }

    pub async fn get_resources_by_ids(&self, ids: &[Uuid]) -> ServiceResult<Vec<Resource>> {
        debug!("getting multiple resources by id");
        Ok(self.repo.get_resources_by_ids(ids).await?)
    }

    pub async fn get_resources_by_category(&self, category: i64) -> ServiceResult<Vec<Resource>> {
        debug!("getting multiple resources by category");
        Ok(self.repo.get_resources_by_category(category).await?)
    }

    pub async fn update_resource(&self, resource: &Resource) -> ServiceResult<()> {
        debug!("updating resource {}", resource.id);
        Ok(self.repo.update_resource(resource).await?)
    }

    /// Delete a resource and the attachments named in `content`, then
    /// confirm the resource is really gone.
    pub async fn delete_resource(&self, id: Uuid, content: &ContentMap) -> ServiceResult<()> {
        debug!("deleting resource {}", id);
        self.repo.delete_resource(id, content).await?;
        self.confirm_deleted(id).await
    }

    /// Succeed only if `id` can no longer be read back.
    pub async fn confirm_deleted(&self, id: Uuid) -> ServiceResult<()> {
        match self.repo.get_resource_by_id(id).await {
            Ok(_) => {
                warn!("resource {} still readable after delete", id);
                Err(ServiceError::StillPresent(id))
            }
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(ServiceError::Internal(err)),
        }
    }

    pub async fn get_categories(&self) -> ServiceResult<Vec<Category>> {
        debug!("getting categories");
        Ok(self.repo.categories().get_categories().await?)
    }
}
