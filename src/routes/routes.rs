use crate::{
    handlers::{
        health_handlers::{healthcheck, healthz, readyz, root},
        resource_handlers::{
            add_resource, create_resource, delete_resource, get_categories, get_resource,
            get_resource_by_id, get_resources_by_category, get_resources_by_ids, update_resource,
        },
    },
    services::resource_service::ResourceService,
};
use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

/// Build and return the router for all resource routes.
///
/// The router carries shared state (`ResourceService`) to all handlers.
pub fn routes() -> Router<ResourceService> {
    let api_v1 = Router::new().route(
        "/resources/{resource_id}",
        get(get_resource).post(create_resource),
    );

    Router::new()
        // health endpoints (mounted at root)
        .route("/", get(root))
        .route("/healthcheck", get(healthcheck))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Resource routes
        .route("/add-resource", post(add_resource))
        .route("/get-resource-by-id", get(get_resource_by_id))
        .route("/update-resource", patch(update_resource))
        .route("/delete-resource", delete(delete_resource))
        .route("/get-resources-by-ids", get(get_resources_by_ids))
        .route("/get-resources-by-category", get(get_resources_by_category))
        // Category routes
        .route("/get-categories", get(get_categories))
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
}
