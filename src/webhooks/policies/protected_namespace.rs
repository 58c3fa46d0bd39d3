//! Protected namespace policy.
//!
//! Rules run top to bottom and the first match wins. Wildcard checks (all
//! namespaces, all resources) come before the exact secret and write checks so
//! a wildcard request can never slip past a rule written for a literal name.

use super::{AllowReason, DenyReason, Verdict};

/// Verbs that only read state
pub const READONLY_VERBS: [&str; 4] = ["get", "list", "watch", "proxy"];

/// Namespace values that address every namespace at once
pub const ALL_NAMESPACE_VALUES: [&str; 2] = ["", "all"];

/// Facts derived from a request and the policy config
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestFacts {
    pub is_allow_listed: bool,
    pub is_privileged_identity: bool,
    pub is_protected_namespace: bool,
    pub is_all_namespace_request: bool,
    pub is_secret_resource: bool,
    pub is_all_resource_request: bool,
    pub is_readonly_verb: bool,
}

/// Run the decision table
pub fn evaluate(facts: &RequestFacts) -> Verdict {
    if facts.is_allow_listed {
        return Verdict::Allow(AllowReason::AllowListed);
    }

    let restricted = !facts.is_privileged_identity;

    if restricted && facts.is_all_namespace_request {
        return Verdict::Deny(DenyReason::AllNamespaces);
    }

    let restricted_in_protected = restricted && facts.is_protected_namespace;

    if restricted_in_protected && facts.is_all_resource_request {
        return Verdict::Deny(DenyReason::AllResources);
    }

    if restricted_in_protected && facts.is_secret_resource {
        return Verdict::Deny(DenyReason::SecretAccess);
    }

    if restricted_in_protected && !facts.is_readonly_verb {
        return Verdict::Deny(DenyReason::Write);
    }

    if facts.is_privileged_identity {
        Verdict::Allow(AllowReason::PrivilegedIdentity)
    } else {
        Verdict::Allow(AllowReason::Unrestricted)
    }
}
