//! HTTP handlers for resource and category operations.
//! Binds and validates requests, then delegates to `ResourceService`.

use crate::{
    errors::AppError,
    models::{
        category::Category,
        resource::{ContentMap, Resource},
    },
    services::resource_service::ResourceService,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query for `GET /get-resource-by-id`.
#[derive(Debug, Deserialize)]
pub struct ResourceIdQuery {
    pub id: Uuid,
}

/// Query for `GET /get-resources-by-ids`: comma separated UUIDs.
#[derive(Debug, Deserialize)]
pub struct ResourceIdsQuery {
    pub ids: String,
}

/// Query for `GET /get-resources-by-category`.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: i64,
}

/// Body of `DELETE /delete-resource`. The content map must list every
/// attachment that should be removed with the resource. Clients send the
/// whole resource; fields other than these two are ignored.
#[derive(Debug, Deserialize)]
pub struct DeleteResourceReq {
    pub id: Uuid,
    #[serde(default)]
    pub content: ContentMap,
}

/// Body of `POST /api/v1/resources/{resource_id}`.
#[derive(Debug, Deserialize)]
pub struct AddResourceReq {
    pub resource: Resource,
}

#[derive(Debug, Serialize)]
pub struct ResourcesResponse {
    pub resources: Vec<Resource>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

/// `POST /add-resource`
pub async fn add_resource(
    State(service): State<ResourceService>,
    Json(resource): Json<Resource>,
) -> Result<impl IntoResponse, AppError> {
    ensure_location(&service, &resource)?;
    let stored = service.add_resource(resource).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// `GET /get-resource-by-id?id=`
pub async fn get_resource_by_id(
    State(service): State<ResourceService>,
    Query(q): Query<ResourceIdQuery>,
) -> Result<Json<Resource>, AppError> {
    Ok(Json(service.get_resource_by_id(q.id).await?))
}

/// `PATCH /update-resource`
pub async fn update_resource(
    State(service): State<ResourceService>,
    Json(resource): Json<Resource>,
) -> Result<impl IntoResponse, AppError> {
    ensure_location(&service, &resource)?;
    service.update_resource(&resource).await?;
    Ok((StatusCode::OK, "OK"))
}

/// `DELETE /delete-resource`
pub async fn delete_resource(
    State(service): State<ResourceService>,
    Json(req): Json<DeleteResourceReq>,
) -> Result<impl IntoResponse, AppError> {
    service.delete_resource(req.id, &req.content).await?;
    Ok((StatusCode::OK, "OK"))
}

/// `GET /get-categories`
pub async fn get_categories(
    State(service): State<ResourceService>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let categories = service.get_categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

/// `GET /get-resources-by-ids?ids=a,b`
pub async fn get_resources_by_ids(
    State(service): State<ResourceService>,
    Query(q): Query<ResourceIdsQuery>,
) -> Result<Json<ResourcesResponse>, AppError> {
    let ids = parse_id_list(&q.ids)?;
    let resources = service.get_resources_by_ids(&ids).await?;
    Ok(Json(ResourcesResponse { resources }))
}

/// `GET /get-resources-by-category?category=`
pub async fn get_resources_by_category(
    State(service): State<ResourceService>,
    Query(q): Query<CategoryQuery>,
) -> Result<Json<ResourcesResponse>, AppError> {
    let resources = service.get_resources_by_category(q.category).await?;
    Ok(Json(ResourcesResponse { resources }))
}

/// `GET /api/v1/resources/{resource_id}`
pub async fn get_resource(
    State(service): State<ResourceService>,
    Path(resource_id): Path<Uuid>,
) -> Result<Json<Resource>, AppError> {
    Ok(Json(service.get_resource_by_id(resource_id).await?))
}

/// `POST /api/v1/resources/{resource_id}`
pub async fn create_resource(
    State(service): State<ResourceService>,
    Path(resource_id): Path<Uuid>,
    Json(req): Json<AddResourceReq>,
) -> Result<impl IntoResponse, AppError> {
    if req.resource.id != resource_id {
        return Err(AppError::bad_request(format!(
            "path id `{}` does not match resource id `{}`",
            resource_id, req.resource.id
        )));
    }
    ensure_location(&service, &req.resource)?;
    let stored = service.add_resource(req.resource).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

fn ensure_location(service: &ResourceService, resource: &Resource) -> Result<(), AppError> {
    let key = &service.policy().location_key;
    if resource.content.contains_key(key) {
        Ok(())
    } else {
        Err(AppError::bad_request(format!(
            "resource content must contain the `{}` key",
            key
        )))
    }
}

fn parse_id_list(raw: &str) -> Result<Vec<Uuid>, AppError> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s).map_err(|_| AppError::bad_request(format!("invalid id `{}`", s)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err(AppError::bad_request("at least one id is required"));
    }
    Ok(ids)
}
