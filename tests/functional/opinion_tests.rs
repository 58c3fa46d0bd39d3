//! Rendering of non-denied requests with and without opinion mode.

use namespace_guard::webhooks::policies::NO_OPINION_REASON;

use crate::common::fixtures::unprivileged;
use crate::{decide, router_with};

#[tokio::test]
async fn test_no_opinion_by_default() {
    let reply = decide(
        router_with(&[], false),
        unprivileged("safe-namespace", "delete", "pods"),
    )
    .await;
    assert!(!reply.denied());
    assert!(!reply.allowed());
    assert_eq!(reply.reason(), NO_OPINION_REASON);
}

#[tokio::test]
async fn test_opinion_mode_allows() {
    let reply = decide(
        router_with(&[], true),
        unprivileged("safe-namespace", "delete", "pods"),
    )
    .await;
    assert!(!reply.denied());
    assert!(reply.allowed());
    assert!(reply.json()["status"].get("reason").is_none());
}

#[tokio::test]
async fn test_opinion_mode_does_not_soften_denials() {
    let reply = decide(
        router_with(&[], true),
        unprivileged("kube-system", "delete", "pods"),
    )
    .await;
    assert!(reply.denied());
    assert!(!reply.allowed());
}

#[tokio::test]
async fn test_response_envelope() {
    let reply = decide(
        router_with(&[], false),
        unprivileged("kube-system", "get", "pods"),
    )
    .await;
    let json = reply.json();
    assert_eq!(json["apiVersion"], "authorization.k8s.io/v1");
    assert_eq!(json["kind"], "SubjectAccessReview");
}
