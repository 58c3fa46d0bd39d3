//! Test fixtures and builder patterns for SubjectAccessReview payloads.

use serde_json::{Value, json};

/// Builder for SubjectAccessReview request bodies.
///
/// # Example
/// ```
/// let body = ReviewBuilder::new("not-admin")
///     .namespace("kube-system")
///     .verb("delete")
///     .resource("pods")
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct ReviewBuilder {
    api_version: String,
    kind: String,
    user: Value,
    groups: Vec<String>,
    namespace: Value,
    verb: String,
    resource: String,
    name: String,
    non_resource_path: Option<String>,
    status_allowed: bool,
}

impl ReviewBuilder {
    /// Create a builder for a `get secrets` request in `kube-system`.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            api_version: "authorization.k8s.io/v1".to_string(),
            kind: "SubjectAccessReview".to_string(),
            user: Value::String(user.into()),
            groups: vec!["system:authenticated".to_string()],
            namespace: Value::String("kube-system".to_string()),
            verb: "get".to_string(),
            resource: "secrets".to_string(),
            name: "important-creds".to_string(),
            non_resource_path: None,
            status_allowed: false,
        }
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Replace the user with an arbitrary JSON value (for type errors).
    pub fn raw_user(mut self, user: Value) -> Self {
        self.user = user;
        self
    }

    pub fn groups(mut self, groups: &[&str]) -> Self {
        self.groups = groups.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Value::String(namespace.into());
        self
    }

    /// Replace the namespace with an arbitrary JSON value (for type errors).
    pub fn raw_namespace(mut self, namespace: Value) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn verb(mut self, verb: impl Into<String>) -> Self {
        self.verb = verb.into();
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Turn the review into a non-resource request for the given path.
    pub fn non_resource(mut self, path: impl Into<String>) -> Self {
        self.non_resource_path = Some(path.into());
        self
    }

    /// Set `status.allowed` on the incoming review.
    pub fn status_allowed(mut self, allowed: bool) -> Self {
        self.status_allowed = allowed;
        self
    }

    pub fn to_value(&self) -> Value {
        let attributes = match &self.non_resource_path {
            Some(path) => json!({ "path": path, "verb": self.verb }),
            None => json!({
                "namespace": self.namespace,
                "verb": self.verb,
                "version": "v1",
                "resource": self.resource,
                "name": self.name,
            }),
        };
        let attributes_key = if self.non_resource_path.is_some() {
            "nonResourceAttributes"
        } else {
            "resourceAttributes"
        };

        let mut spec = serde_json::Map::new();
        spec.insert(attributes_key.to_string(), attributes);
        spec.insert("user".to_string(), self.user.clone());
        spec.insert("groups".to_string(), json!(self.groups));

        json!({
            "kind": self.kind,
            "apiVersion": self.api_version,
            "spec": spec,
            "status": { "allowed": self.status_allowed },
        })
    }

    pub fn build(&self) -> String {
        self.to_value().to_string()
    }
}

/// A review from a user with no privileges.
pub fn unprivileged(namespace: &str, verb: &str, resource: &str) -> String {
    ReviewBuilder::new("not-admin")
        .groups(&["group1"])
        .namespace(namespace)
        .verb(verb)
        .resource(resource)
        .build()
}
