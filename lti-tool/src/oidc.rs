//! OIDC login initiation: the redirect that starts a launch.

use url::Url;

use crate::definition::ToolDefinition;
use crate::error::{LtiError, Result};
use crate::session::LaunchSession;

/// Builds the authorization redirect that sends the browser to the
/// platform at the start of a launch.
///
/// The `state` and `nonce` come from a freshly begun
/// [`LaunchSession`]; the platform echoes them back in the
/// authentication response where the launch validator checks them.
pub struct LoginInitiation<'a> {
    definition: &'a ToolDefinition,
    redirect_uri: String,
    login_hint: String,
    message_hint: Option<String>,
}

impl<'a> LoginInitiation<'a> {
    /// Start building a login initiation for this tool registration.
    ///
    /// `redirect_uri` is the tool's launch endpoint; `login_hint` is the
    /// opaque value the platform sent with its login-initiation request.
    pub fn new(
        definition: &'a ToolDefinition,
        redirect_uri: impl Into<String>,
        login_hint: impl Into<String>,
    ) -> Self {
        Self {
            definition,
            redirect_uri: redirect_uri.into(),
            login_hint: login_hint.into(),
            message_hint: None,
        }
    }

    /// Pass through the platform's `lti_message_hint`, if it sent one.
    pub fn message_hint(mut self, hint: impl Into<String>) -> Self {
        self.message_hint = Some(hint.into());
        self
    }

    /// Build the authorization URL for the given launch session.
    pub fn authorize_url(&self, session: &dyn LaunchSession) -> Result<Url> {
        let mut url = Url::parse(&self.definition.oidc_auth_url).map_err(|e| {
            LtiError::Configuration(format!("invalid oidc_auth_url: {e}"))
        })?;

        url.query_pairs_mut()
            .append_pair("scope", "openid")
            .append_pair("response_type", "id_token")
            .append_pair("response_mode", "form_post")
            .append_pair("prompt", "none")
            .append_pair("client_id", &self.definition.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("login_hint", &self.login_hint)
            .append_pair("state", session.state())
            .append_pair("nonce", session.nonce());

        if let Some(hint) = &self.message_hint {
            url.query_pairs_mut().append_pair("lti_message_hint", hint);
        }

        Ok(url)
    }
}
