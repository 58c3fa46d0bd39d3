//! SubjectAccessReview wire format.
//!
//! Decoding is strict about structure (types, apiVersion, kind, user) and lenient
//! about everything else: unknown fields and any incoming `status` are ignored.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use k8s_openapi::api::authorization::v1::{
    NonResourceAttributes as WireNonResourceAttributes, ResourceAttributes as WireResourceAttributes,
    SubjectAccessReviewSpec, SubjectAccessReviewStatus,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::webhooks::policies::{AccessRequest, Decision, NonResourceAttributes, ResourceAttributes};

/// Expected `apiVersion` of incoming reviews
pub const API_VERSION: &str = "authorization.k8s.io/v1";
/// Expected `kind` of incoming reviews
pub const KIND: &str = "SubjectAccessReview";

/// Structural problems with an incoming review
#[derive(Error, Debug)]
pub enum ReviewError {
    /// Body is not JSON or a field has the wrong type
    #[error("Invalid JSON: {0}")]
    Decode(#[from] serde_path_to_error::Error<serde_json::Error>),

    /// Body continues after the review object
    #[error("Invalid JSON: {0}")]
    TrailingData(#[from] serde_json::Error),

    #[error("Unsupported apiVersion {0:?}, expected {expected}", expected = API_VERSION)]
    UnsupportedApiVersion(String),

    #[error("Unsupported kind {0:?}, expected {expected}", expected = KIND)]
    UnsupportedKind(String),

    #[error("Missing spec.user")]
    MissingUser,
}

impl ReviewError {
    /// Label used for the rejection metric
    pub fn label(&self) -> &'static str {
        match self {
            ReviewError::Decode(_) | ReviewError::TrailingData(_) => "decode",
            ReviewError::UnsupportedApiVersion(_) => "api_version",
            ReviewError::UnsupportedKind(_) => "kind",
            ReviewError::MissingUser => "user",
        }
    }
}

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// An incoming SubjectAccessReview before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub spec: SubjectAccessReviewSpec,
}

impl ReviewRequest {
    /// Decode a request body
    pub fn decode(body: &[u8]) -> Result<Self, ReviewError> {
        let mut deserializer = serde_json::Deserializer::from_slice(body);
        let review = serde_path_to_error::deserialize(&mut deserializer)?;
        deserializer.end()?;
        Ok(review)
    }

    /// Check structural preconditions and convert into an [`AccessRequest`]
    pub fn validate(self) -> Result<AccessRequest, ReviewError> {
        if self.api_version != API_VERSION {
            return Err(ReviewError::UnsupportedApiVersion(self.api_version));
        }
        if self.kind != KIND {
            return Err(ReviewError::UnsupportedKind(self.kind));
        }

        let spec = self.spec;
        let user = match spec.user {
            Some(user) if !user.is_empty() => user,
            _ => return Err(ReviewError::MissingUser),
        };

        Ok(AccessRequest {
            user,
            groups: spec.groups.unwrap_or_default(),
            uid: spec.uid,
            resource_attributes: spec.resource_attributes.map(resource_attributes),
            non_resource_attributes: spec.non_resource_attributes.map(non_resource_attributes),
        })
    }
}

/// Decode and validate in one step
pub fn parse_review(body: &[u8]) -> Result<AccessRequest, ReviewError> {
    ReviewRequest::decode(body)?.validate()
}

fn resource_attributes(attrs: WireResourceAttributes) -> ResourceAttributes {
    ResourceAttributes {
        namespace: attrs.namespace.unwrap_or_default(),
        verb: attrs.verb.unwrap_or_default(),
        resource: attrs.resource.unwrap_or_default(),
        subresource: attrs.subresource.unwrap_or_default(),
        name: attrs.name.unwrap_or_default(),
        api_group: attrs.group.unwrap_or_default(),
        api_version: attrs.version.unwrap_or_default(),
    }
}

fn non_resource_attributes(attrs: WireNonResourceAttributes) -> NonResourceAttributes {
    NonResourceAttributes {
        path: attrs.path.unwrap_or_default(),
        verb: attrs.verb.unwrap_or_default(),
    }
}

/// The review returned to the API server
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub status: SubjectAccessReviewStatus,
}

impl From<Decision> for ReviewResponse {
    fn from(decision: Decision) -> Self {
        Self {
            api_version: API_VERSION,
            kind: KIND,
            status: decision.into_status(),
        }
    }
}
