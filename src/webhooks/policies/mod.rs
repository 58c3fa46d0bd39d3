//! Authorization policies for SubjectAccessReview webhooks.
//!
//! A request goes through three steps:
//! - Subject classification: is the requesting identity privileged?
//! - Protected namespace policy: allow or deny based on namespace, resource and verb
//! - Decision rendering: turn the verdict into allowed/denied/no-opinion

pub mod decision;
pub mod protected_namespace;
pub mod subject;

use std::collections::BTreeSet;

pub use decision::{Decision, NO_OPINION_REASON, Outcome};
pub use protected_namespace::RequestFacts;
pub use subject::{Identity, classify};

/// Namespaces protected when none are configured
pub const DEFAULT_PROTECTED_NAMESPACES: [&str; 2] = ["kube-system", "openstack-system"];

/// Users that are always exempt, on top of any configured ones.
///
/// `kubernetes-admin` is the cluster-admin identity kubeadm issues; locking it
/// out of protected namespaces would leave the cluster unrecoverable.
pub const REQUIRED_PRIVILEGED_USERS: [&str; 1] = ["kubernetes-admin"];

/// Process-wide policy configuration, fixed at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Namespaces restricted for non-privileged subjects
    pub protected_namespaces: BTreeSet<String>,
    /// Users exempt from every restriction
    pub additional_privileged_users: BTreeSet<String>,
    /// Whether non-denied requests are explicitly allowed
    pub opinion_mode: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PROTECTED_NAMESPACES, Vec::<String>::new(), false)
    }
}

impl PolicyConfig {
    pub fn new<N, U>(protected_namespaces: N, additional_privileged_users: U, opinion_mode: bool) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        U: IntoIterator,
        U::Item: Into<String>,
    {
        Self {
            protected_namespaces: protected_namespaces.into_iter().map(Into::into).collect(),
            additional_privileged_users: additional_privileged_users
                .into_iter()
                .map(Into::into)
                .collect(),
            opinion_mode,
        }
    }
}

/// Attributes of a request against an API resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceAttributes {
    pub namespace: String,
    pub verb: String,
    pub resource: String,
    pub subresource: String,
    pub name: String,
    pub api_group: String,
    pub api_version: String,
}

impl ResourceAttributes {
    pub fn new(namespace: &str, verb: &str, resource: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            verb: verb.to_string(),
            resource: resource.to_string(),
            ..Default::default()
        }
    }
}

/// Attributes of a request against a non-resource URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NonResourceAttributes {
    pub path: String,
    pub verb: String,
}

/// A validated access request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    pub user: String,
    pub groups: Vec<String>,
    pub uid: Option<String>,
    pub resource_attributes: Option<ResourceAttributes>,
    pub non_resource_attributes: Option<NonResourceAttributes>,
}

impl AccessRequest {
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
            groups: Vec::new(),
            uid: None,
            resource_attributes: None,
            non_resource_attributes: None,
        }
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_resource(mut self, attributes: ResourceAttributes) -> Self {
        self.resource_attributes = Some(attributes);
        self
    }

    pub fn with_non_resource(mut self, attributes: NonResourceAttributes) -> Self {
        self.non_resource_attributes = Some(attributes);
        self
    }
}

/// Why a request was allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    /// User is a required or additional privileged user
    AllowListed,
    /// User is a privileged system identity or protected service account
    PrivilegedIdentity,
    /// No restriction applies to the request
    Unrestricted,
}

impl AllowReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllowReason::AllowListed => "allow_listed",
            AllowReason::PrivilegedIdentity => "privileged_identity",
            AllowReason::Unrestricted => "unrestricted",
        }
    }
}

/// Why a request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    AllNamespaces,
    AllResources,
    SecretAccess,
    Write,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::AllNamespaces => "all_namespaces",
            DenyReason::AllResources => "all_resources",
            DenyReason::SecretAccess => "secret_access",
            DenyReason::Write => "write",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::AllNamespaces => "Cannot make all namespace requests",
            DenyReason::AllResources => "Cannot make all resource requests in protected namespace",
            DenyReason::SecretAccess => "Cannot access secrets in protected namespace",
            DenyReason::Write => "Cannot write to protected namespace",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of evaluating a request against the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow(AllowReason),
    Deny(DenyReason),
}

impl Verdict {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Verdict::Allow(_))
    }

    /// Reason text; empty for allow verdicts
    pub fn reason(&self) -> String {
        match self {
            Verdict::Allow(_) => String::new(),
            Verdict::Deny(reason) => reason.to_string(),
        }
    }
}

/// Evaluates access requests against an immutable policy
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    config: PolicyConfig,
}

impl PolicyEngine {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Derive the facts the decision table runs on
    pub fn facts(&self, request: &AccessRequest) -> RequestFacts {
        let is_allow_listed = REQUIRED_PRIVILEGED_USERS.contains(&request.user.as_str())
            || self
                .config
                .additional_privileged_users
                .contains(&request.user);
        let is_privileged_identity = classify(&request.user, &self.config.protected_namespaces);

        let Some(attrs) = &request.resource_attributes else {
            return RequestFacts {
                is_allow_listed,
                is_privileged_identity,
                ..Default::default()
            };
        };

        RequestFacts {
            is_allow_listed,
            is_privileged_identity,
            is_protected_namespace: self.config.protected_namespaces.contains(&attrs.namespace),
            is_all_namespace_request: protected_namespace::ALL_NAMESPACE_VALUES
                .contains(&attrs.namespace.as_str()),
            is_secret_resource: attrs.resource == "secrets",
            is_all_resource_request: attrs.resource == "*",
            is_readonly_verb: protected_namespace::READONLY_VERBS.contains(&attrs.verb.as_str()),
        }
    }

    pub fn evaluate(&self, request: &AccessRequest) -> Verdict {
        protected_namespace::evaluate(&self.facts(request))
    }

    /// Evaluate and render in one step
    pub fn decide(&self, request: &AccessRequest) -> Decision {
        Decision::render(&self.evaluate(request), self.config.opinion_mode)
    }
}
