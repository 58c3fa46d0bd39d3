//! Command line and environment configuration.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::webhooks::policies::PolicyConfig;
use crate::webhooks::{TlsPaths, Verbosity};

/// Configuration errors detected before any server starts
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("verbosity must be between 0 and {max} (got {0})", max = Verbosity::MAX_LEVEL)]
    Verbosity(u8),

    #[error("webhook and health servers cannot share port {0}")]
    PortConflict(u16),

    #[error("--tls-cert-file and --tls-key-file must be set together")]
    PartialTls,
}

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Kubernetes authorization webhook restricting access to protected namespaces"
)]
pub struct Config {
    /// Namespaces which unprivileged users have limited permissions in
    #[arg(
        long,
        env = "PROTECTED_NAMESPACES",
        value_delimiter = ',',
        default_value = "kube-system,openstack-system"
    )]
    pub protected_namespaces: Vec<String>,

    /// Users exempt from all restrictions
    #[arg(long, env = "ADDITIONAL_PRIVILEGED_USERS", value_delimiter = ',')]
    pub additional_privileged_users: Vec<String>,

    /// Explicitly allow requests that are not denied instead of deferring to other authorizers
    #[arg(long, env = "OPINION_MODE")]
    pub opinion_mode: bool,

    /// Per-decision logging: 0 none, 1 denials, 2 all decisions, 3 decisions and request bodies
    #[arg(long, env = "VERBOSITY", default_value_t = 0)]
    pub verbosity: u8,

    /// Port for the authorization endpoint
    #[arg(long, env = "WEBHOOK_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Port for health probes and metrics
    #[arg(long, env = "HEALTH_PORT", default_value_t = 8081)]
    pub health_port: u16,

    /// PEM certificate for serving over TLS
    #[arg(long, env = "TLS_CERT_FILE")]
    pub tls_cert_file: Option<PathBuf>,

    /// PEM private key for serving over TLS
    #[arg(long, env = "TLS_KEY_FILE")]
    pub tls_key_file: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.verbosity > Verbosity::MAX_LEVEL {
            return Err(ConfigError::Verbosity(self.verbosity));
        }
        if self.port == self.health_port {
            return Err(ConfigError::PortConflict(self.port));
        }
        if self.tls_cert_file.is_some() != self.tls_key_file.is_some() {
            return Err(ConfigError::PartialTls);
        }
        Ok(())
    }

    /// Policy built from the namespace and user lists; blank entries are dropped
    pub fn policy(&self) -> PolicyConfig {
        PolicyConfig::new(
            clean_list(&self.protected_namespaces),
            clean_list(&self.additional_privileged_users),
            self.opinion_mode,
        )
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_level(self.verbosity)
    }

    pub fn tls(&self) -> Option<TlsPaths> {
        match (&self.tls_cert_file, &self.tls_key_file) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.clone(),
                key: key.clone(),
            }),
            _ => None,
        }
    }
}

fn clean_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}
