//! Claims carried by a validated LTI launch token.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// LTI claim URI for the message type.
pub const CLAIM_MESSAGE_TYPE: &str = "https://purl.imsglobal.org/spec/lti/claim/message_type";
/// LTI claim URI for the protocol version.
pub const CLAIM_VERSION: &str = "https://purl.imsglobal.org/spec/lti/claim/version";
/// LTI claim URI for the deployment id.
pub const CLAIM_DEPLOYMENT_ID: &str = "https://purl.imsglobal.org/spec/lti/claim/deployment_id";
/// LTI claim URI for the role set.
pub const CLAIM_ROLES: &str = "https://purl.imsglobal.org/spec/lti/claim/roles";
/// LTI claim URI for the learning context.
pub const CLAIM_CONTEXT: &str = "https://purl.imsglobal.org/spec/lti/claim/context";
/// LTI claim URI for the resource link.
pub const CLAIM_RESOURCE_LINK: &str = "https://purl.imsglobal.org/spec/lti/claim/resource_link";
/// AGS claim URI carrying the grade-service endpoint and granted scopes.
pub const CLAIM_AGS_ENDPOINT: &str = "https://purl.imsglobal.org/spec/lti-ags/claim/endpoint";

/// The LTI protocol version this crate validates.
pub const LTI_VERSION: &str = "1.3.0";

/// Claims from a validated LTI launch token.
///
/// Standard OIDC claims plus the LTI claim URIs a resource-link launch
/// carries. Unrecognized claims land in `custom`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchClaims {
    /// Issuer (the platform identifier).
    #[serde(default)]
    pub iss: String,

    /// Audience (client ids this token is intended for).
    #[serde(default)]
    pub aud: Audience,

    /// Subject (the platform's user id).
    pub sub: String,

    /// Expiration time (Unix seconds).
    #[serde(default)]
    pub exp: u64,

    /// Issued at time (Unix seconds).
    #[serde(default)]
    pub iat: u64,

    /// Single-use nonce bound to the launch session.
    #[serde(default)]
    pub nonce: Option<String>,

    /// LTI message type, e.g. `LtiResourceLinkRequest`.
    #[serde(rename = "https://purl.imsglobal.org/spec/lti/claim/message_type", default)]
    pub message_type: Option<String>,

    /// LTI version, expected to be `1.3.0`.
    #[serde(rename = "https://purl.imsglobal.org/spec/lti/claim/version", default)]
    pub lti_version: Option<String>,

    /// Deployment id of this tool registration on the platform.
    #[serde(rename = "https://purl.imsglobal.org/spec/lti/claim/deployment_id", default)]
    pub deployment_id: Option<String>,

    /// Role URIs granted to the subject in the launching context.
    #[serde(rename = "https://purl.imsglobal.org/spec/lti/claim/roles", default)]
    pub roles: Vec<String>,

    /// The learning context (course) the launch originates from.
    #[serde(rename = "https://purl.imsglobal.org/spec/lti/claim/context", default)]
    pub context: Option<LaunchContext>,

    /// The resource link (placement) that was launched.
    #[serde(rename = "https://purl.imsglobal.org/spec/lti/claim/resource_link", default)]
    pub resource_link: Option<ResourceLink>,

    /// AGS endpoint claim: line-items URL plus the granted scopes.
    #[serde(rename = "https://purl.imsglobal.org/spec/lti-ags/claim/endpoint", default)]
    pub ags_endpoint: Option<AgsEndpoint>,

    /// Any other claims the platform included.
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl LaunchClaims {
    /// Check whether the token's expiry has passed.
    pub fn is_expired(&self) -> bool {
        self.exp < now_secs()
    }

    /// Role URIs as string slices.
    pub fn role_set(&self) -> Vec<&str> {
        self.roles.iter().map(|s| s.as_str()).collect()
    }
}

impl Default for LaunchClaims {
    fn default() -> Self {
        Self {
            iss: String::new(),
            aud: Audience::None,
            sub: String::new(),
            exp: 0,
            iat: 0,
            nonce: None,
            message_type: None,
            lti_version: None,
            deployment_id: None,
            roles: Vec::new(),
            context: None,
            resource_link: None,
            ags_endpoint: None,
            custom: HashMap::new(),
        }
    }
}

/// Current Unix time in seconds.
pub(crate) fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// The learning context (course/section) claim.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LaunchContext {
    /// Platform-scoped context id.
    #[serde(default)]
    pub id: String,
    /// Short label, e.g. a course code.
    #[serde(default)]
    pub label: Option<String>,
    /// Human-readable title.
    #[serde(default)]
    pub title: Option<String>,
    /// Context type URIs.
    #[serde(rename = "type", default)]
    pub types: Vec<String>,
}

/// The resource link (placement) claim.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResourceLink {
    /// Platform-scoped resource link id.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// The AGS endpoint claim: where the grade service lives and what the
/// platform granted this deployment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgsEndpoint {
    /// The line-items collection URL.
    #[serde(default)]
    pub lineitems: Option<String>,
    /// A single line-item URL, present on launches coupled to one item.
    #[serde(default)]
    pub lineitem: Option<String>,
    /// Granted AGS scope URIs.
    #[serde(default)]
    pub scope: Vec<String>,
}

/// Audience can be a single string or array of strings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Audience {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    /// Check if audience contains a specific value.
    pub fn contains(&self, value: &str) -> bool {
        match self {
            Audience::None => false,
            Audience::Single(s) => s == value,
            Audience::Multiple(v) => v.iter().any(|s| s == value),
        }
    }

    /// Get all audiences as a vector.
    pub fn as_vec(&self) -> Vec<&str> {
        match self {
            Audience::None => vec![],
            Audience::Single(s) => vec![s.as_str()],
            Audience::Multiple(v) => v.iter().map(|s| s.as_str()).collect(),
        }
    }
}
