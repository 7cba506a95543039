mod common;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::{CONTENT, test_service};
use http_body_util::BodyExt;
use resource_store::{models::resource::Resource, routes::routes::routes};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

async fn app() -> Router {
    routes().with_state(test_service().await)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn resource_lifecycle() {
    let app = app().await;
    let id = Uuid::new_v4();
    let attachment = Uuid::new_v4();
    let attachment_key = attachment.to_string();
    let payload = json!({
        "id": id,
        "category": 1,
        "content": { "location": "loc.txt", attachment_key: "att.bin" }
    });

    let (status, _) = send(&app, Method::POST, "/add-resource", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::GET, &format!("/get-resource-by-id?id={}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Resource = serde_json::from_slice(&body).unwrap();
    assert_eq!(fetched, serde_json::from_value::<Resource>(payload.clone()).unwrap());

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/resources/{}", attachment), None).await;
    assert_eq!(status, StatusCode::OK);
    let child: Resource = serde_json::from_slice(&body).unwrap();
    assert_eq!(child.category, CONTENT);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/get-resources-by-ids?ids={},{}", id, attachment),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(listed["resources"].as_array().unwrap().len(), 2);

    let (status, _) = send(&app, Method::DELETE, "/delete-resource", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, &format!("/get-resource-by-id?id={}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["status"], 404);
}

#[tokio::test]
async fn update_unknown_resource_is_not_found() {
    let app = app().await;
    let payload = json!({
        "id": Uuid::new_v4(),
        "category": 1,
        "content": { "location": "loc.txt" }
    });

    let (status, _) = send(&app, Method::PATCH, "/update-resource", Some(payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn content_without_location_is_rejected() {
    let app = app().await;
    let payload = json!({
        "id": Uuid::new_v4(),
        "category": 1,
        "content": { "other": "loc.txt" }
    });

    let (status, _) = send(&app, Method::POST, "/add-resource", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn too_many_attachments_is_internal() {
    let app = app().await;
    let first = Uuid::new_v4().to_string();
    let second = Uuid::new_v4().to_string();
    let payload = json!({
        "id": Uuid::new_v4(),
        "category": 1,
        "content": { "location": "loc.txt", first: "a.bin", second: "b.bin" }
    });

    let (status, _) = send(&app, Method::POST, "/add-resource", Some(payload)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn empty_id_list_is_bad_request() {
    let app = app().await;

    let (status, _) = send(&app, Method::GET, "/get-resources-by-ids?ids=", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rest_create_checks_path_id() {
    let app = app().await;
    let id = Uuid::new_v4();
    let body = json!({
        "resource": { "id": id, "category": 1, "content": { "location": "loc.txt" } }
    });

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/resources/{}", Uuid::new_v4()),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, &format!("/api/v1/resources/{}", id), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn categories_and_health_checks() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/get-categories", None).await;
    assert_eq!(status, StatusCode::OK);
    let categories: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(categories["categories"].as_array().unwrap().len(), 4);

    let (status, _) = send(&app, Method::GET, "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/readyz", None).await;
    assert_eq!(status, StatusCode::OK);
    let ready: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(ready["checks"]["sqlite"]["ok"], true);
}

#[tokio::test]
async fn empty_category_table_is_not_found() {
    let service = test_service().await;
    sqlx::query("DELETE FROM categories")
        .execute(&*service.db)
        .await
        .unwrap();
    let app = routes().with_state(service);

    let (status, body) = send(&app, Method::GET, "/get-categories", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["status"], 404);
}
