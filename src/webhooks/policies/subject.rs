//! Subject classification.
//!
//! Kubernetes identities follow naming conventions:
//! - `system:anonymous` for unauthenticated requests
//! - `system:serviceaccount:<namespace>:<name>` for service accounts
//! - `system:<component>` for control plane components, nodes and bootstrap tokens
//!
//! Parsing is total: every string maps to exactly one [`Identity`], and anything
//! that does not parse cleanly lands in a variant that is never privileged.

use std::collections::BTreeSet;

const SYSTEM_PREFIX: &str = "system:";
const ANONYMOUS_USER: &str = "system:anonymous";
const SERVICE_ACCOUNT_SEGMENT: &str = "serviceaccount";

/// The shape of a requesting identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity<'a> {
    /// `system:anonymous`
    Anonymous,
    /// `system:serviceaccount:<namespace>:<name>`
    ServiceAccount { namespace: &'a str, name: &'a str },
    /// Starts like a service account but is missing (or has extra) segments
    MalformedServiceAccount,
    /// Any other `system:<name>` identity
    System(&'a str),
    /// Everything else
    User(&'a str),
}

impl<'a> Identity<'a> {
    /// Parse a user string into its identity shape.
    pub fn parse(user: &'a str) -> Self {
        if user == ANONYMOUS_USER {
            return Identity::Anonymous;
        }

        let Some(rest) = user.strip_prefix(SYSTEM_PREFIX) else {
            return Identity::User(user);
        };

        if rest == SERVICE_ACCOUNT_SEGMENT {
            return Identity::MalformedServiceAccount;
        }

        if let Some(account) = rest
            .strip_prefix(SERVICE_ACCOUNT_SEGMENT)
            .and_then(|r| r.strip_prefix(':'))
        {
            return parse_service_account(account);
        }

        if rest.is_empty() {
            // Bare "system:" names no component
            return Identity::User(user);
        }

        Identity::System(rest)
    }

    /// Whether this identity is exempt from protected namespace restrictions.
    pub fn is_privileged(&self, protected_namespaces: &BTreeSet<String>) -> bool {
        match self {
            Identity::Anonymous => false,
            Identity::ServiceAccount { namespace, .. } => protected_namespaces.contains(*namespace),
            Identity::System(_) => true,
            Identity::MalformedServiceAccount | Identity::User(_) => false,
        }
    }

    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Identity::Anonymous => "anonymous",
            Identity::ServiceAccount { .. } => "service_account",
            Identity::MalformedServiceAccount => "malformed_service_account",
            Identity::System(_) => "system",
            Identity::User(_) => "user",
        }
    }
}

fn parse_service_account(account: &str) -> Identity<'_> {
    match account.split_once(':') {
        Some((namespace, name))
            if !namespace.is_empty() && !name.is_empty() && !name.contains(':') =>
        {
            Identity::ServiceAccount { namespace, name }
        }
        _ => Identity::MalformedServiceAccount,
    }
}

/// Classify a user as privileged (true) or restricted (false).
pub fn classify(user: &str, protected_namespaces: &BTreeSet<String>) -> bool {
    Identity::parse(user).is_privileged(protected_namespaces)
}
