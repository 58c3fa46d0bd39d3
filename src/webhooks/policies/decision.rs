//! Rendering verdicts into the externally visible decision.
//!
//! The SubjectAccessReview protocol distinguishes "allowed" (an explicit grant)
//! from "not denied" (no opinion, later authorizers decide). Opinion mode picks
//! which of the two a non-denied verdict becomes.

use k8s_openapi::api::authorization::v1::SubjectAccessReviewStatus;

use super::Verdict;

/// Reason reported when the webhook stays silent on a request it does not deny
pub const NO_OPINION_REASON: &str = "Webhook doesn't give opinion, delegated to other authorizers";

/// Outcome label for metrics and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Allowed,
    Denied,
    NoOpinion,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Allowed => "allowed",
            Outcome::Denied => "denied",
            Outcome::NoOpinion => "no_opinion",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decision returned to the API server.
///
/// `allowed` and `denied` are never both true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub denied: bool,
    pub reason: String,
}

impl Decision {
    /// Render a verdict according to the opinion mode.
    pub fn render(verdict: &Verdict, opinion_mode: bool) -> Self {
        match verdict {
            Verdict::Deny(reason) => Self {
                allowed: false,
                denied: true,
                reason: reason.to_string(),
            },
            Verdict::Allow(_) if opinion_mode => Self {
                allowed: true,
                denied: false,
                reason: String::new(),
            },
            Verdict::Allow(_) => Self {
                allowed: false,
                denied: false,
                reason: NO_OPINION_REASON.to_string(),
            },
        }
    }

    pub fn outcome(&self) -> Outcome {
        match (self.allowed, self.denied) {
            (_, true) => Outcome::Denied,
            (true, false) => Outcome::Allowed,
            (false, false) => Outcome::NoOpinion,
        }
    }

    /// Convert into the wire status, omitting an empty reason.
    pub fn into_status(self) -> SubjectAccessReviewStatus {
        SubjectAccessReviewStatus {
            allowed: self.allowed,
            denied: Some(self.denied),
            evaluation_error: None,
            reason: (!self.reason.is_empty()).then_some(self.reason),
        }
    }
}
