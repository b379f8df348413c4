//! LTI 1.3 launch validation for Rust tools.
//!
//! Establishes that an inbound HTTP request originates from a trusted
//! learning platform, derives the caller's identity and roles, and hands
//! the host framework a validated launch handle. The handshake is the
//! OIDC login initiation plus signed-token verification with replay and
//! CSRF protection:
//!
//! 1. [`MemoryLaunchSession::begin`](session::MemoryLaunchSession::begin)
//!    issues a single-use `state`/`nonce` pair and
//!    [`LoginInitiation`](oidc::LoginInitiation) builds the platform
//!    redirect carrying them.
//! 2. The platform posts back a signed id token; a
//!    [`Tool`](tool::Tool) validates it: signature against the
//!    platform's key set, then audience, nonce, expiry, deployment and
//!    message consistency, in that order.
//! 3. [`LaunchAuthenticator`](adapter::LaunchAuthenticator) converts the
//!    outcome into granted role labels for the host authorization layer.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lti_tool::{LaunchAuthenticator, MemoryLaunchSession, ToolDefinition};
//!
//! let definition = ToolDefinition::builder()
//!     .name("My Tool")
//!     .client_id("client-1")
//!     .platform("https://platform.example.edu")
//!     .deployment_id("dep-1")
//!     .key_set_url("https://platform.example.edu/.well-known/jwks.json")
//!     .access_token_url("https://platform.example.edu/token")
//!     .oidc_auth_url("https://platform.example.edu/auth")
//!     .private_key(private_pem)
//!     .public_key(public_pem)
//!     .build()?;
//!
//! let verifier = Arc::new(definition.claims_verifier()?);
//! let authenticator = LaunchAuthenticator::new(definition, verifier);
//!
//! // The host session store holds the MemoryLaunchSession issued when the
//! // login initiation redirected to the platform.
//! let session: Arc<dyn lti_tool::LaunchSession> = Arc::new(MemoryLaunchSession::begin());
//! let launch = authenticator.authenticate(session, token, state).await?;
//! assert!(launch.is_valid());
//! ```

pub mod adapter;
pub mod claims;
pub mod definition;
pub mod error;
pub mod jwks;
pub mod oidc;
pub mod roles;
pub mod session;
pub mod tool;
pub mod verifier;

pub use adapter::{AuthenticatedLaunch, LaunchAuthenticator, bearer_token};
pub use claims::{AgsEndpoint, Audience, LaunchClaims, LaunchContext, ResourceLink};
pub use definition::{ToolDefinition, ToolDefinitionBuilder};
pub use error::{LtiError, Result};
pub use jwks::{JwksKeySet, KeyCache, MemoryKeyCache, NoopKeyCache};
pub use oidc::LoginInitiation;
pub use roles::{IdentityRoleMapper, RoleMapper};
pub use session::{LaunchSession, MemoryLaunchSession};
pub use tool::Tool;
pub use verifier::{ClaimsVerifier, JwksClaimsVerifier, JwksClaimsVerifierBuilder};
