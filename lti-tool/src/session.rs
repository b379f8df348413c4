//! Per-attempt launch session state: the `state`/`nonce` pair.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Default lifetime of a launch session.
///
/// A browser that hasn't come back from the platform redirect within this
/// window has to start the login over.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(300);

/// Volatile state for one OIDC login attempt.
///
/// Issued before redirecting to the platform; consumed by exactly one
/// launch validation. The nonce is single-use: [`consume_nonce`] hands it
/// out at most once, even to concurrent callers.
///
/// [`consume_nonce`]: LaunchSession::consume_nonce
pub trait LaunchSession: Send + Sync {
    /// The `state` value issued for this attempt.
    fn state(&self) -> &str;

    /// The nonce issued for this attempt, for building the login redirect.
    /// Peeking does not consume it.
    fn nonce(&self) -> &str;

    /// Take the nonce. Returns `None` if it was already taken or the
    /// session expired. Atomic: two racing callers get it at most once.
    fn consume_nonce(&self) -> Option<String>;

    /// Whether the session outlived its time-to-live.
    fn is_expired(&self) -> bool;

    /// Invalidate the session regardless of age.
    fn expire(&self);
}

/// In-memory launch session with generated `state`/`nonce` and a TTL.
///
/// The backing store (cookie session, server-side session map) is the host
/// framework's concern; this is the value it holds per attempt.
pub struct MemoryLaunchSession {
    state: String,
    nonce: String,
    pending_nonce: Mutex<Option<String>>,
    issued_at: Instant,
    ttl: Duration,
}

impl MemoryLaunchSession {
    /// Begin a new login attempt with fresh `state` and `nonce` values.
    pub fn begin() -> Self {
        let state = Uuid::new_v4().to_string();
        let nonce = Uuid::new_v4().to_string();
        Self {
            state,
            pending_nonce: Mutex::new(Some(nonce.clone())),
            nonce,
            issued_at: Instant::now(),
            ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Set the session time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Rebuild a session from persisted `state`/`nonce` values (e.g. read
    /// back from a cookie-backed store). The TTL window restarts.
    pub fn restore(state: impl Into<String>, nonce: impl Into<String>) -> Self {
        let nonce = nonce.into();
        Self {
            state: state.into(),
            pending_nonce: Mutex::new(Some(nonce.clone())),
            nonce,
            issued_at: Instant::now(),
            ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl LaunchSession for MemoryLaunchSession {
    fn state(&self) -> &str {
        &self.state
    }

    fn nonce(&self) -> &str {
        &self.nonce
    }

    fn consume_nonce(&self) -> Option<String> {
        if self.is_expired() {
            return None;
        }
        self.pending_nonce
            .lock()
            .ok()
            .and_then(|mut pending| pending.take())
    }

    fn is_expired(&self) -> bool {
        self.issued_at.elapsed() > self.ttl
    }

    fn expire(&self) {
        if let Ok(mut pending) = self.pending_nonce.lock() {
            pending.take();
        }
    }
}
