mod common;

use common::{DOCUMENT, content, resource, test_service};
use resource_store::services::resource_service::{ErrorKind, ServiceError};
use uuid::Uuid;

#[tokio::test]
async fn add_returns_stored_resource() {
    let service = test_service().await;
    let res = resource(DOCUMENT, content("loc.txt", &[(Uuid::new_v4(), "a.bin")]));

    let stored = service.add_resource(res.clone()).await.unwrap();

    assert_eq!(stored, res);
    assert_eq!(service.get_resource_by_id(res.id).await.unwrap(), res);
}

#[tokio::test]
async fn missing_resource_maps_to_not_found() {
    let service = test_service().await;
    let id = Uuid::new_v4();

    let err = service.get_resource_by_id(id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = service
        .update_resource(&resource(DOCUMENT, content("loc.txt", &[])))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = service.get_resources_by_ids(&[id]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = service.get_resources_by_category(3).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn duplicate_add_is_internal() {
    let service = test_service().await;
    let res = resource(DOCUMENT, content("loc.txt", &[]));
    service.add_resource(res.clone()).await.unwrap();

    let err = service.add_resource(res).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(matches!(err, ServiceError::Internal(_)));
}

#[tokio::test]
async fn delete_confirms_absence() {
    let service = test_service().await;
    let attachment = Uuid::new_v4();
    let res = resource(DOCUMENT, content("loc.txt", &[(attachment, "a.bin")]));
    service.add_resource(res.clone()).await.unwrap();

    service.delete_resource(res.id, &res.content).await.unwrap();

    assert_eq!(
        service.get_resource_by_id(attachment).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    let err = service
        .delete_resource(res.id, &res.content)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn readable_resource_is_still_present() {
    let service = test_service().await;
    let res = resource(DOCUMENT, content("loc.txt", &[]));
    service.add_resource(res.clone()).await.unwrap();

    let err = service.confirm_deleted(res.id).await.unwrap_err();

    assert!(matches!(err, ServiceError::StillPresent(id) if id == res.id));
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(service.confirm_deleted(Uuid::new_v4()).await.is_ok());
}

#[tokio::test]
async fn lists_categories() {
    let service = test_service().await;

    let categories = service.get_categories().await.unwrap();

    assert!(categories.iter().any(|c| c.name == "Content"));
}
