//! src/storage/resources.rs
//!
//! ResourceRepository — transactional CRUD over the `resources` table.
//!
//! A resource's non-location content keys name attachments. Each attachment
//! is stored as its own resource row under the content category, so every
//! write touches the parent row and its children inside one transaction.

use crate::{
    models::{
        category::DEFAULT_CONTENT_CATEGORY,
        resource::{Attachment, ContentMap, DEFAULT_LOCATION_KEY, Resource},
    },
    storage::{
        categories::{self, CategoryLookup},
        codec::{self, CodecError},
        error::{
            RepoError, RepoResult, begin, begin_write, commit, is_unique_violation, rollback_with,
        },
    },
};
use sqlx::{FromRow, QueryBuilder, SqliteConnection, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const INSERT_RESOURCE: &str = "INSERT INTO resources (id, category, content) VALUES (?, ?, ?)";
const UPDATE_RESOURCE: &str = "UPDATE resources SET content = ?, category = ? WHERE id = ?";
const DELETE_RESOURCE: &str = "DELETE FROM resources WHERE id = ?";
const SELECT_RESOURCE: &str = "SELECT id, category, content FROM resources";
const NEWEST_FIRST: &str = " ORDER BY created_at DESC, rowid DESC";

/// Policy knobs applied by the repository.
#[derive(Clone, Debug)]
pub struct RepositoryPolicy {
    /// Maximum number of content entries, location included.
    pub max_content_items: usize,

    /// Reserved content key holding the payload reference.
    pub location_key: String,

    /// Name of the category assigned to attachment-derived resources.
    pub content_category: String,
}

impl Default for RepositoryPolicy {
    fn default() -> Self {
        Self {
            max_content_items: 2,
            location_key: DEFAULT_LOCATION_KEY.to_string(),
            content_category: DEFAULT_CONTENT_CATEGORY.to_string(),
        }
    }
}

#[derive(FromRow)]
struct ResourceRow {
    id: Uuid,
    category: i64,
    content: Option<Vec<u8>>,
}

impl TryFrom<ResourceRow> for Resource {
    type Error = CodecError;

    fn try_from(row: ResourceRow) -> Result<Self, Self::Error> {
        let content = codec::decode(row.content.as_deref())?;
        Ok(Resource::new(row.id, row.category, content))
    }
}

/// Owns every read and write of resource rows.
///
/// Each public call runs in its own transaction and is committed only when
/// all of its statements succeed; any failure rolls the transaction back.
#[derive(Clone)]
pub struct ResourceRepository {
    db: Arc<SqlitePool>,
    categories: CategoryLookup,
    policy: RepositoryPolicy,
}

impl ResourceRepository {
    pub fn new(db: Arc<SqlitePool>, policy: RepositoryPolicy) -> Self {
        Self {
            categories: CategoryLookup::new(db.clone()),
            db,
            policy,
        }
    }

    pub fn policy(&self) -> &RepositoryPolicy {
        &self.policy
    }

    pub fn categories(&self) -> &CategoryLookup {
        &self.categories
    }

    /// Insert a resource together with one child row per attachment.
    ///
    /// Returns `AlreadyExists` if the resource or any attachment id is taken.
    pub async fn add_resource(&self, resource: &Resource) -> RepoResult<()> {
        debug!("adding resource {}", resource.id);
        let mut tx = begin_write(&self.db).await?;
        match self.add_in_tx(&mut tx, resource).await {
            Ok(()) => commit(tx).await,
            Err(err) => Err(rollback_with(tx, err).await),
        }
    }

    async fn add_in_tx(&self, conn: &mut SqliteConnection, resource: &Resource) -> RepoResult<()> {
        let content_category =
            categories::fetch_by_name(&mut *conn, &self.policy.content_category).await?;
        self.ensure_content_size(&resource.content)?;

        for attachment in resource.content.attachments(&self.policy.location_key) {
            self.insert_attachment(&mut *conn, attachment?, content_category.id)
                .await?;
        }

        insert_resource(conn, resource).await
    }

    pub async fn get_resource_by_id(&self, id: Uuid) -> RepoResult<Resource> {
        debug!("fetching resource {}", id);
        let mut tx = begin(&self.db).await?;
        match fetch_resource(&mut tx, id).await {
            Ok(resource) => {
                commit(tx).await?;
                Ok(resource)
            }
            Err(err) => Err(rollback_with(tx, err).await),
        }
    }

    /// Batch fetch, newest first. `ids` must not be empty.
    pub async fn get_resources_by_ids(&self, ids: &[Uuid]) -> RepoResult<Vec<Resource>> {
        if ids.is_empty() {
            return Err(RepoError::EmptyIdList);
        }
        debug!("fetching {} resources by id", ids.len());

        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_RESOURCE);
        builder.push(" WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        builder.push(NEWEST_FIRST);

        let mut tx = begin(&self.db).await?;
        let result = builder
            .build_query_as::<ResourceRow>()
            .fetch_all(&mut *tx)
            .await
            .map_err(RepoError::from)
            .and_then(|rows| collect_rows(rows, "resources"));

        match result {
            Ok(resources) => {
                commit(tx).await?;
                Ok(resources)
            }
            Err(err) => Err(rollback_with(tx, err).await),
        }
    }

    /// All resources of one category, newest first.
    pub async fn get_resources_by_category(&self, category: i64) -> RepoResult<Vec<Resource>> {
        debug!("fetching resources of category {}", category);
        let mut tx = begin(&self.db).await?;
        let result = sqlx::query_as::<_, ResourceRow>(&format!(
            "{} WHERE category = ?{}",
            SELECT_RESOURCE, NEWEST_FIRST
        ))
        .bind(category)
        .fetch_all(&mut *tx)
        .await
        .map_err(RepoError::from)
        .and_then(|rows| collect_rows(rows, &format!("resources of category {}", category)));

        match result {
            Ok(resources) => {
                commit(tx).await?;
                Ok(resources)
            }
            Err(err) => Err(rollback_with(tx, err).await),
        }
    }

    /// Replace a resource's content and category.
    ///
    /// Attachments that are new relative to the stored content map get a
    /// child row. Attachments dropped from the map are left in place; they
    /// are only removed by `delete_resource`.
    pub async fn update_resource(&self, resource: &Resource) -> RepoResult<()> {
        debug!("updating resource {}", resource.id);
        let mut tx = begin_write(&self.db).await?;
        match self.update_in_tx(&mut tx, resource).await {
            Ok(()) => commit(tx).await,
            Err(err) => Err(rollback_with(tx, err).await),
        }
    }

    async fn update_in_tx(
        &self,
        conn: &mut SqliteConnection,
        resource: &Resource,
    ) -> RepoResult<()> {
        self.ensure_content_size(&resource.content)?;

        let stored = fetch_resource(&mut *conn, resource.id).await?;
        let content_category =
            categories::fetch_by_name(&mut *conn, &self.policy.content_category).await?;

        for (key, location) in resource.content.iter() {
            if key == self.policy.location_key || stored.content.contains_key(key) {
                continue;
            }
            let attachment = Attachment::parse(key, location)?;
            self.insert_attachment(&mut *conn, attachment, content_category.id)
                .await?;
        }

        let content = codec::encode(&resource.content)?;
        let result = sqlx::query(UPDATE_RESOURCE)
            .bind(content)
            .bind(resource.category)
            .bind(resource.id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::resource_not_found(resource.id));
        }
        Ok(())
    }

    /// Delete a resource and every attachment row named in `content`.
    ///
    /// `content` is not re-read from storage: attachments missing from it
    /// are left behind. A missing row for any key aborts the whole delete.
    pub async fn delete_resource(&self, id: Uuid, content: &ContentMap) -> RepoResult<()> {
        debug!("deleting resource {}", id);
        let mut tx = begin_write(&self.db).await?;
        match self.delete_in_tx(&mut tx, id, content).await {
            Ok(()) => commit(tx).await,
            Err(err) => Err(rollback_with(tx, err).await),
        }
    }

    async fn delete_in_tx(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        content: &ContentMap,
    ) -> RepoResult<()> {
        for attachment in content.attachments(&self.policy.location_key) {
            delete_row(&mut *conn, attachment?.id).await?;
        }
        delete_row(conn, id).await
    }

    fn ensure_content_size(&self, content: &ContentMap) -> RepoResult<()> {
        if content.len() > self.policy.max_content_items {
            return Err(RepoError::TooManyAttachments {
                count: content.len(),
                max: self.policy.max_content_items,
            });
        }
        Ok(())
    }

    async fn insert_attachment(
        &self,
        conn: &mut SqliteConnection,
        attachment: Attachment,
        content_category: i64,
    ) -> RepoResult<()> {
        let child = attachment.into_resource(content_category, &self.policy.location_key);
        debug!("inserting attachment resource {}", child.id);
        insert_resource(conn, &child).await
    }
}

async fn insert_resource(conn: &mut SqliteConnection, resource: &Resource) -> RepoResult<()> {
    let content = codec::encode(&resource.content)?;
    match sqlx::query(INSERT_RESOURCE)
        .bind(resource.id)
        .bind(resource.category)
        .bind(content)
        .execute(conn)
        .await
    {
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => Err(RepoError::AlreadyExists(resource.id)),
        Err(err) => Err(RepoError::Sqlx(err)),
    }
}

async fn fetch_resource(conn: &mut SqliteConnection, id: Uuid) -> RepoResult<Resource> {
    let row = sqlx::query_as::<_, ResourceRow>(&format!("{} WHERE id = ?", SELECT_RESOURCE))
        .bind(id)
        .fetch_one(conn)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => RepoError::resource_not_found(id),
            other => RepoError::Sqlx(other),
        })?;
    Ok(Resource::try_from(row)?)
}

async fn delete_row(conn: &mut SqliteConnection, id: Uuid) -> RepoResult<()> {
    let result = sqlx::query(DELETE_RESOURCE).bind(id).execute(conn).await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::resource_not_found(id));
    }
    Ok(())
}

fn collect_rows(rows: Vec<ResourceRow>, what: &str) -> RepoResult<Vec<Resource>> {
    if rows.is_empty() {
        return Err(RepoError::NotFound(what.to_string()));
    }
    rows.into_iter()
        .map(|row| Resource::try_from(row).map_err(RepoError::from))
        .collect()
}
