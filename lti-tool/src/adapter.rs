//! Boundary to the host framework: validation outcome → granted roles.

use std::sync::Arc;

use crate::definition::ToolDefinition;
use crate::error::Result;
use crate::roles::{IdentityRoleMapper, RoleMapper};
use crate::session::LaunchSession;
use crate::tool::Tool;
use crate::verifier::ClaimsVerifier;

/// Baseline role every validated launch carries.
pub const ROLE_USER: &str = "USER";
/// Role granted when the subject holds a recognized learner role.
pub const ROLE_LEARNER: &str = "LEARNER";
/// Role granted when the subject holds a recognized instructor role.
pub const ROLE_INSTRUCTOR: &str = "INSTRUCTOR";

/// Extract the token from an `Authorization: Bearer …` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Sequences a launch validation and interprets it for the host
/// authorization layer. Performs no validation logic of its own: it
/// builds a [`Tool`], runs it, and converts the outcome to role labels.
/// Any validation failure propagates as an error: authentication is
/// denied, never partially granted.
pub struct LaunchAuthenticator {
    definition: ToolDefinition,
    verifier: Arc<dyn ClaimsVerifier>,
    mapper: Arc<dyn RoleMapper>,
}

impl LaunchAuthenticator {
    /// Create an authenticator with the identity role mapping.
    pub fn new(definition: ToolDefinition, verifier: Arc<dyn ClaimsVerifier>) -> Self {
        Self {
            definition,
            verifier,
            mapper: Arc::new(IdentityRoleMapper),
        }
    }

    /// Substitute the role mapper.
    pub fn with_role_mapper(mut self, mapper: Arc<dyn RoleMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    /// Validate the launch carried by `token`/`state` against the given
    /// session and derive the granted roles.
    pub async fn authenticate(
        &self,
        session: Arc<dyn LaunchSession>,
        token: &str,
        state: &str,
    ) -> Result<AuthenticatedLaunch> {
        let mut tool = Tool::new(self.definition.clone(), session, Arc::clone(&self.verifier));
        tool.validate(token, state).await?;

        let mut labels = vec![ROLE_USER.to_string()];
        if tool.is_learner() {
            labels.push(ROLE_LEARNER.to_string());
        }
        if tool.is_instructor() {
            labels.push(ROLE_INSTRUCTOR.to_string());
        }

        let granted = self.mapper.map(&labels);
        tracing::debug!(?labels, ?granted, "launch roles mapped to authorities");

        Ok(AuthenticatedLaunch { tool, granted })
    }
}

/// The handle downstream code receives once a launch authenticated:
/// granted role labels plus the validity/role/subject query surface.
pub struct AuthenticatedLaunch {
    tool: Tool,
    granted: Vec<String>,
}

impl std::fmt::Debug for AuthenticatedLaunch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedLaunch")
            .field("granted", &self.granted)
            .finish_non_exhaustive()
    }
}

impl AuthenticatedLaunch {
    /// Granted authority labels, after role mapping.
    pub fn granted_roles(&self) -> &[String] {
        &self.granted
    }

    /// The authenticated platform user id.
    pub fn subject(&self) -> Option<&str> {
        self.tool.subject()
    }

    pub fn is_valid(&self) -> bool {
        self.tool.is_valid()
    }

    pub fn is_learner(&self) -> bool {
        self.tool.is_learner()
    }

    pub fn is_instructor(&self) -> bool {
        self.tool.is_instructor()
    }

    /// The underlying validated launch, for claims access.
    pub fn tool(&self) -> &Tool {
        &self.tool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic dXNlcg=="), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
    }
}
