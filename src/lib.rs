//! namespace-guard library crate
//!
//! A Kubernetes authorization webhook that restricts what non-privileged users can
//! do inside a set of protected namespaces. This module exports the decision
//! engine, the webhook and health servers, and the process configuration.

pub mod config;
pub mod health;
pub mod webhooks;

pub use config::{Config, ConfigError};
pub use health::HealthState;
pub use webhooks::policies::{
    AccessRequest, Decision, DenyReason, PolicyConfig, PolicyEngine, ResourceAttributes, Verdict,
};
pub use webhooks::{
    AUTHORIZE_PATH, ReviewError, TlsPaths, Verbosity, WebhookError, WebhookState,
    create_webhook_router, parse_review, run_webhook_server,
};
