//! Structurally invalid reviews are rejected before any decision is made.

use axum::http::StatusCode;
use serde_json::json;

use crate::common::fixtures::ReviewBuilder;
use crate::{authorize, default_router};

async fn assert_rejected(payload: String) {
    let reply = authorize(default_router(), payload).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(
        serde_json::from_slice::<serde_json::Value>(&reply.body).is_err(),
        "rejections carry no review"
    );
}

#[tokio::test]
async fn test_invalid_json() {
    assert_rejected("{bad json}".to_string()).await;
}

#[tokio::test]
async fn test_empty_body() {
    assert_rejected(String::new()).await;
}

#[tokio::test]
async fn test_invalid_resource_kind() {
    assert_rejected(
        ReviewBuilder::new("kubernetes-admin")
            .kind("NotASubjectAccessReview")
            .build(),
    )
    .await;
}

#[tokio::test]
async fn test_invalid_api_version() {
    assert_rejected(ReviewBuilder::new("kubernetes-admin").api_version("v0").build()).await;
}

#[tokio::test]
async fn test_empty_spec() {
    assert_rejected(
        json!({
            "kind": "SubjectAccessReview",
            "apiVersion": "authorization.k8s.io/v1",
            "spec": {},
            "status": {"allowed": false},
        })
        .to_string(),
    )
    .await;
}

#[tokio::test]
async fn test_empty_user() {
    assert_rejected(ReviewBuilder::new("").build()).await;
}

#[tokio::test]
async fn test_bad_attributes_fields() {
    assert_rejected(
        ReviewBuilder::new("kubernetes-admin")
            .raw_namespace(json!(0))
            .build(),
    )
    .await;
}

#[tokio::test]
async fn test_bad_user() {
    assert_rejected(ReviewBuilder::new("kubernetes-admin").raw_user(json!(0)).build()).await;
}
