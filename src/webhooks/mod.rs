//! Authorization webhook.
//!
//! This module answers SubjectAccessReviews for the API server's webhook
//! authorizer:
//! - `review`: wire format and structural validation
//! - `policies`: subject classification, protected namespace policy and decision rendering
//! - `audit`: per-decision logging
//! - `server`: the HTTP endpoint

pub mod audit;
pub mod policies;
pub mod review;
mod server;

pub use audit::Verbosity;
pub use policies::{AccessRequest, Decision, PolicyConfig, PolicyEngine, Verdict};
pub use review::{ReviewError, ReviewResponse, parse_review};
pub use server::{
    AUTHORIZE_PATH, TlsPaths, WebhookError, WebhookState, create_webhook_router,
    run_webhook_server,
};
