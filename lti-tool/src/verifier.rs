//! Claims verifier trait and JWKS-backed implementation.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::claims::LaunchClaims;
use crate::error::{LtiError, Result};
use crate::jwks::{JwksKeySet, KeyCache};

/// Trait for verifying a signed launch token and surfacing its claims.
///
/// The launch validator only depends on this seam, so tests can inject a
/// verifier that returns fixed claims without any key material.
#[async_trait]
pub trait ClaimsVerifier: Send + Sync {
    /// Verify the token's signature and structure, returning its claims.
    async fn verify(&self, token: &str) -> Result<LaunchClaims>;

    /// The platform issuer this verifier accepts.
    fn issuer(&self) -> &str;
}

/// Verifier backed by the platform's published key set.
///
/// Checks signature and issuer. Audience, nonce, expiry and deployment are
/// the launch validator's job: they depend on per-launch session state and
/// must fail in a defined order.
pub struct JwksClaimsVerifier {
    issuer: String,
    key_set: JwksKeySet,
    algorithms: Vec<jsonwebtoken::Algorithm>,
}

impl std::fmt::Debug for JwksClaimsVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksClaimsVerifier")
            .field("issuer", &self.issuer)
            .field("algorithms", &self.algorithms)
            .finish_non_exhaustive()
    }
}

impl JwksClaimsVerifier {
    /// Create a new builder.
    pub fn builder() -> JwksClaimsVerifierBuilder {
        JwksClaimsVerifierBuilder::default()
    }

    /// Drop the cached key set, forcing a refetch on the next launch.
    pub fn invalidate_keys(&self) {
        self.key_set.invalidate();
    }

    fn validation(&self) -> jsonwebtoken::Validation {
        let mut validation = jsonwebtoken::Validation::new(
            self.algorithms
                .first()
                .copied()
                .unwrap_or(jsonwebtoken::Algorithm::RS256),
        );
        validation.algorithms = self.algorithms.clone();
        validation.set_issuer(&[&self.issuer]);
        // Expiry and audience are checked by the launch validator in
        // handshake order, each with its own failure kind.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = Default::default();
        validation
    }
}

#[async_trait]
impl ClaimsVerifier for JwksClaimsVerifier {
    async fn verify(&self, token: &str) -> Result<LaunchClaims> {
        let header = jsonwebtoken::decode_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| LtiError::MalformedToken("missing 'kid' header".into()))?;

        let key = self.key_set.decoding_key(&kid).await?;

        let validation = self.validation();
        let token_data = jsonwebtoken::decode::<LaunchClaims>(token, &key, &validation)?;

        Ok(token_data.claims)
    }

    fn issuer(&self) -> &str {
        &self.issuer
    }
}

/// Builder for [`JwksClaimsVerifier`].
#[derive(Default)]
pub struct JwksClaimsVerifierBuilder {
    issuer: Option<String>,
    key_set_url: Option<String>,
    cache: Option<Arc<dyn KeyCache>>,
    refresh_interval: Option<Duration>,
    fetch_timeout: Option<Duration>,
    algorithms: Vec<jsonwebtoken::Algorithm>,
}

impl JwksClaimsVerifierBuilder {
    /// Set the expected platform issuer.
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set the platform's key-set URL.
    pub fn key_set_url(mut self, url: impl Into<String>) -> Self {
        self.key_set_url = Some(url.into());
        self
    }

    /// Substitute the key cache (e.g. [`NoopKeyCache`](crate::jwks::NoopKeyCache)).
    pub fn key_cache(mut self, cache: Arc<dyn KeyCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the key-set refresh interval.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    /// Bound key-set fetches with this timeout.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Add an allowed signing algorithm.
    pub fn algorithm(mut self, alg: jsonwebtoken::Algorithm) -> Self {
        self.algorithms.push(alg);
        self
    }

    /// Build the verifier.
    pub fn build(self) -> Result<JwksClaimsVerifier> {
        let issuer = self
            .issuer
            .ok_or_else(|| LtiError::Configuration("issuer is required".into()))?;
        let key_set_url = self
            .key_set_url
            .ok_or_else(|| LtiError::Configuration("key_set_url is required".into()))?;

        let mut key_set = match self.cache {
            Some(cache) => JwksKeySet::with_cache(key_set_url, cache)?,
            None => JwksKeySet::new(key_set_url)?,
        };
        if let Some(interval) = self.refresh_interval {
            key_set = key_set.with_refresh_interval(interval);
        }
        if let Some(timeout) = self.fetch_timeout {
            key_set = key_set.with_timeout(timeout)?;
        }

        let algorithms = if self.algorithms.is_empty() {
            vec![jsonwebtoken::Algorithm::RS256]
        } else {
            self.algorithms
        };

        Ok(JwksClaimsVerifier {
            issuer,
            key_set,
            algorithms,
        })
    }
}
