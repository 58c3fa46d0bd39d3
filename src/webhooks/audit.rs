//! Decision logging.
//!
//! Every decision can be logged together with the subject and the attributes it
//! was made on. How much gets logged depends on the configured verbosity; the
//! decision itself is never affected.

use tracing::{debug, info};

use crate::webhooks::policies::{AccessRequest, Decision, Identity, Verdict};

/// How much to log per review
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Nothing per decision
    #[default]
    Silent,
    /// Denied requests
    Denials,
    /// Every decision
    Decisions,
    /// Every decision plus the raw request body
    Requests,
}

impl Verbosity {
    /// Highest supported level
    pub const MAX_LEVEL: u8 = 3;

    /// Map a numeric level, saturating at [`Verbosity::Requests`]
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Verbosity::Silent,
            1 => Verbosity::Denials,
            2 => Verbosity::Decisions,
            _ => Verbosity::Requests,
        }
    }

    pub fn logs_decision(&self, decision: &Decision) -> bool {
        match self {
            Verbosity::Silent => false,
            Verbosity::Denials => decision.denied,
            Verbosity::Decisions | Verbosity::Requests => true,
        }
    }

    pub fn logs_body(&self) -> bool {
        *self >= Verbosity::Requests
    }
}

/// Log the raw body of a review when the verbosity asks for it
pub fn log_body(verbosity: Verbosity, body: &[u8]) {
    if verbosity.logs_body() {
        debug!(body = %String::from_utf8_lossy(body), "Received SubjectAccessReview");
    }
}

/// Name of the rule that produced a verdict
fn rule_name(verdict: &Verdict) -> &'static str {
    match verdict {
        Verdict::Allow(reason) => reason.as_str(),
        Verdict::Deny(reason) => reason.as_str(),
    }
}

/// Log a decision with its subject and attributes
pub fn log_decision(verbosity: Verbosity, request: &AccessRequest, verdict: &Verdict, decision: &Decision) {
    if !verbosity.logs_decision(decision) {
        return;
    }

    let identity = Identity::parse(&request.user).kind();
    let rule = rule_name(verdict);
    let uid = request.uid.as_deref().unwrap_or_default();

    if let Some(attrs) = &request.resource_attributes {
        info!(
            uid = %uid,
            user = %request.user,
            groups = ?request.groups,
            identity,
            namespace = %attrs.namespace,
            verb = %attrs.verb,
            api_group = %attrs.api_group,
            resource = %attrs.resource,
            subresource = %attrs.subresource,
            name = %attrs.name,
            outcome = %decision.outcome(),
            rule,
            reason = %decision.reason,
            "Resource access decision"
        );
    } else if let Some(attrs) = &request.non_resource_attributes {
        info!(
            uid = %uid,
            user = %request.user,
            groups = ?request.groups,
            identity,
            path = %attrs.path,
            verb = %attrs.verb,
            outcome = %decision.outcome(),
            rule,
            reason = %decision.reason,
            "Non-resource access decision"
        );
    } else {
        info!(
            uid = %uid,
            user = %request.user,
            groups = ?request.groups,
            identity,
            outcome = %decision.outcome(),
            rule,
            reason = %decision.reason,
            "Access decision without attributes"
        );
    }
}
