//! The launch validator: one `Tool` instance per inbound launch request.

use std::sync::Arc;

use crate::claims::{LaunchClaims, LTI_VERSION};
use crate::definition::ToolDefinition;
use crate::error::{LtiError, Result};
use crate::roles::{has_instructor_role, has_learner_role};
use crate::session::LaunchSession;
use crate::verifier::ClaimsVerifier;

/// Outcome of a launch validation. Terminal once set: a `Tool` validates
/// at most one token in its lifetime.
enum LaunchOutcome {
    Pending,
    Valid(LaunchClaims),
    Invalid(LtiError),
}

/// Validates one LTI launch against a tool registration.
///
/// Wraps the registration, the per-attempt [`LaunchSession`] and a
/// [`ClaimsVerifier`], and runs the handshake checks in protocol order.
/// Constructed per request and discarded with it.
///
/// ```rust,ignore
/// let mut tool = Tool::new(definition, session, verifier);
/// tool.validate(token, state).await?;
/// if tool.is_instructor() { /* ... */ }
/// ```
pub struct Tool {
    definition: ToolDefinition,
    session: Arc<dyn LaunchSession>,
    verifier: Arc<dyn ClaimsVerifier>,
    outcome: LaunchOutcome,
}

impl Tool {
    /// Create a validator for one launch attempt.
    pub fn new(
        definition: ToolDefinition,
        session: Arc<dyn LaunchSession>,
        verifier: Arc<dyn ClaimsVerifier>,
    ) -> Self {
        Self {
            definition,
            session,
            verifier,
            outcome: LaunchOutcome::Pending,
        }
    }

    /// Run the launch handshake on the inbound token and `state` parameter.
    ///
    /// Checks run in order, each with its own failure kind: session state,
    /// token signature, audience, nonce, expiry, deployment, message
    /// consistency. The session nonce is consumed up front, so it is
    /// spent exactly once no matter where validation stops.
    ///
    /// The outcome is terminal. Calling `validate` again returns the
    /// prior result without touching the session or the network.
    pub async fn validate(&mut self, token: &str, state: &str) -> Result<()> {
        match &self.outcome {
            LaunchOutcome::Valid(_) => return Ok(()),
            LaunchOutcome::Invalid(err) => return Err(err.clone()),
            LaunchOutcome::Pending => {}
        }

        match self.run_checks(token, state).await {
            Ok(claims) => {
                tracing::debug!(sub = %claims.sub, "launch validated");
                self.outcome = LaunchOutcome::Valid(claims);
                Ok(())
            }
            Err(err) => {
                tracing::debug!(error = %err, "launch rejected");
                self.outcome = LaunchOutcome::Invalid(err.clone());
                Err(err)
            }
        }
    }

    async fn run_checks(&self, token: &str, state: &str) -> Result<LaunchClaims> {
        if self.session.is_expired() {
            return Err(LtiError::SessionExpired);
        }

        if state != self.session.state() {
            return Err(LtiError::StateMismatch);
        }

        // Taken before any comparison: a nonce is spent by the attempt,
        // not by its success.
        let issued_nonce = self.session.consume_nonce();

        let claims = self.verifier.verify(token).await?;

        if !claims.aud.contains(&self.definition.client_id) {
            return Err(LtiError::AudienceMismatch {
                expected: self.definition.client_id.clone(),
                actual: claims.aud.as_vec().iter().map(|s| s.to_string()).collect(),
            });
        }

        let token_nonce = claims
            .nonce
            .as_deref()
            .ok_or_else(|| LtiError::MalformedToken("missing nonce claim".into()))?;
        match issued_nonce {
            Some(nonce) if nonce == token_nonce => {}
            _ => return Err(LtiError::NonceReplay),
        }

        if claims.is_expired() {
            return Err(LtiError::TokenExpired);
        }

        let deployment_id = claims.deployment_id.as_deref().unwrap_or("");
        if deployment_id != self.definition.deployment_id {
            return Err(LtiError::DeploymentMismatch {
                expected: self.definition.deployment_id.clone(),
                actual: deployment_id.to_string(),
            });
        }

        match claims.message_type.as_deref() {
            Some(message_type) if !message_type.is_empty() => {}
            _ => return Err(LtiError::MalformedToken("missing message type claim".into())),
        }
        if claims.lti_version.as_deref() != Some(LTI_VERSION) {
            return Err(LtiError::MalformedToken(format!(
                "unsupported LTI version: {:?}",
                claims.lti_version
            )));
        }

        Ok(claims)
    }

    /// Whether validation ran and succeeded.
    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, LaunchOutcome::Valid(_))
    }

    /// Whether the validated subject holds a recognized learner role.
    pub fn is_learner(&self) -> bool {
        self.claims()
            .map(|c| has_learner_role(c.role_set()))
            .unwrap_or(false)
    }

    /// Whether the validated subject holds a recognized instructor role.
    pub fn is_instructor(&self) -> bool {
        self.claims()
            .map(|c| has_instructor_role(c.role_set()))
            .unwrap_or(false)
    }

    /// The authenticated platform user id, once valid.
    pub fn subject(&self) -> Option<&str> {
        self.claims().map(|c| c.sub.as_str())
    }

    /// Validated claims, once valid.
    pub fn claims(&self) -> Option<&LaunchClaims> {
        match &self.outcome {
            LaunchOutcome::Valid(claims) => Some(claims),
            _ => None,
        }
    }

    /// The retained failure reason, once invalid.
    pub fn error(&self) -> Option<&LtiError> {
        match &self.outcome {
            LaunchOutcome::Invalid(err) => Some(err),
            _ => None,
        }
    }

    /// The registration this launch validates against.
    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }
}
