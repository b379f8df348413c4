//! Platform key-set (JWKS) fetching and caching.

use dashmap::DashMap;
use jsonwebtoken::DecodingKey;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::claims::now_secs;
use crate::error::{LtiError, Result};

/// Default bound on key-set HTTP round trips.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default interval between key-set refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3600);

/// Storage for decoding keys by key id.
///
/// Explicit so tests (and callers rotating tool registrations) can
/// substitute their own policy; `NoopKeyCache` forces a fetch per lookup.
pub trait KeyCache: Send + Sync {
    fn get(&self, kid: &str) -> Option<DecodingKey>;
    fn put(&self, kid: String, key: DecodingKey);
    fn invalidate(&self);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Concurrent in-memory key cache.
#[derive(Default)]
pub struct MemoryKeyCache {
    keys: DashMap<String, DecodingKey>,
}

impl MemoryKeyCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyCache for MemoryKeyCache {
    fn get(&self, kid: &str) -> Option<DecodingKey> {
        self.keys.get(kid).map(|k| k.clone())
    }

    fn put(&self, kid: String, key: DecodingKey) {
        self.keys.insert(kid, key);
    }

    fn invalidate(&self) {
        self.keys.clear();
    }

    fn len(&self) -> usize {
        self.keys.len()
    }
}

/// A cache that stores nothing. Every lookup fetches the key set.
pub struct NoopKeyCache;

impl KeyCache for NoopKeyCache {
    fn get(&self, _kid: &str) -> Option<DecodingKey> {
        None
    }

    fn put(&self, _kid: String, _key: DecodingKey) {}

    fn invalidate(&self) {}

    fn len(&self) -> usize {
        0
    }
}

/// A platform's published key set, fetched over HTTP and cached by key id.
///
/// Refreshes when a requested key id is absent (key rotation), with a
/// half-interval floor so concurrent misses don't turn into a refresh
/// storm. One instance per key-set URL: a tool registration change means
/// building a new instance (or calling [`invalidate`](Self::invalidate)),
/// so a stale cache is never shared across registrations.
pub struct JwksKeySet {
    key_set_url: String,
    cache: Arc<dyn KeyCache>,
    last_refresh: AtomicU64,
    refresh_interval: Duration,
    client: reqwest::Client,
}

impl JwksKeySet {
    /// Create a key set for the given JWKS URL with in-memory caching.
    pub fn new(key_set_url: impl Into<String>) -> Result<Self> {
        Self::with_cache(key_set_url, Arc::new(MemoryKeyCache::new()))
    }

    /// Create a key set with a caller-supplied cache.
    pub fn with_cache(key_set_url: impl Into<String>, cache: Arc<dyn KeyCache>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_FETCH_TIMEOUT)
            .build()
            .map_err(|e| LtiError::KeySetUnavailable(e.to_string()))?;

        Ok(Self {
            key_set_url: key_set_url.into(),
            cache,
            last_refresh: AtomicU64::new(0),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            client,
        })
    }

    /// Set the refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set the HTTP timeout for key-set fetches.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LtiError::KeySetUnavailable(e.to_string()))?;
        Ok(self)
    }

    /// Drop all cached keys. Call when the tool registration changes.
    pub fn invalidate(&self) {
        self.cache.invalidate();
        self.last_refresh.store(0, Ordering::Relaxed);
    }

    /// Get the decoding key for a key id, fetching the key set on a miss.
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey> {
        if let Some(key) = self.cache.get(kid) {
            return Ok(key);
        }

        // Refresh floor: a kid that survived a recent fetch is genuinely
        // unknown, don't hammer the platform for it.
        let now = now_secs();
        let last = self.last_refresh.load(Ordering::Relaxed);
        if !self.cache.is_empty()
            && last > 0
            && now.saturating_sub(last) < self.refresh_interval.as_secs() / 2
        {
            return Err(LtiError::KeyNotFound(kid.to_string()));
        }

        let keys = self.fetch().await?;
        self.last_refresh.store(now, Ordering::Relaxed);

        self.cache.invalidate();
        let mut found = None;
        for (key_id, key) in keys {
            if key_id == kid {
                found = Some(key.clone());
            }
            self.cache.put(key_id, key);
        }

        found.ok_or_else(|| LtiError::KeyNotFound(kid.to_string()))
    }

    /// Fetch and parse the key set.
    async fn fetch(&self) -> Result<Vec<(String, DecodingKey)>> {
        tracing::debug!("Fetching JWKS from {}", self.key_set_url);

        let response = self
            .client
            .get(&self.key_set_url)
            .send()
            .await
            .map_err(|e| LtiError::KeySetUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| LtiError::KeySetUnavailable(e.to_string()))?;

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| LtiError::KeySetUnavailable(format!("unparseable key set: {e}")))?;

        let mut keys = Vec::new();
        for key in jwks.keys {
            let Some(kid) = key.kid.clone() else {
                continue;
            };
            match key.to_decoding_key() {
                Ok(decoding_key) => keys.push((kid, decoding_key)),
                Err(e) => tracing::warn!("Skipping unusable JWK kid={kid}: {e}"),
            }
        }

        if keys.is_empty() {
            return Err(LtiError::KeySetUnavailable(
                "key set contains no usable keys".into(),
            ));
        }

        tracing::debug!("Key set fetched with {} usable keys", keys.len());
        Ok(keys)
    }
}

/// JWKS response structure.
#[derive(Debug, serde::Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

/// Individual JWK (JSON Web Key).
#[derive(Debug, serde::Deserialize)]
#[allow(dead_code)]
struct Jwk {
    /// Key type (RSA, EC, etc.)
    kty: String,
    /// Key ID
    kid: Option<String>,
    /// Algorithm
    alg: Option<String>,
    /// Key use (sig, enc)
    #[serde(rename = "use")]
    use_: Option<String>,
    /// RSA modulus
    n: Option<String>,
    /// RSA exponent
    e: Option<String>,
    /// EC x coordinate
    x: Option<String>,
    /// EC y coordinate
    y: Option<String>,
    /// EC curve
    crv: Option<String>,
}

impl Jwk {
    fn to_decoding_key(&self) -> Result<DecodingKey> {
        match self.kty.as_str() {
            "RSA" => {
                let n = self
                    .n
                    .as_ref()
                    .ok_or_else(|| LtiError::KeySetUnavailable("Missing 'n' in RSA key".into()))?;
                let e = self
                    .e
                    .as_ref()
                    .ok_or_else(|| LtiError::KeySetUnavailable("Missing 'e' in RSA key".into()))?;
                DecodingKey::from_rsa_components(n, e)
                    .map_err(|e| LtiError::KeySetUnavailable(e.to_string()))
            }
            "EC" => {
                let x = self
                    .x
                    .as_ref()
                    .ok_or_else(|| LtiError::KeySetUnavailable("Missing 'x' in EC key".into()))?;
                let y = self
                    .y
                    .as_ref()
                    .ok_or_else(|| LtiError::KeySetUnavailable("Missing 'y' in EC key".into()))?;
                DecodingKey::from_ec_components(x, y)
                    .map_err(|e| LtiError::KeySetUnavailable(e.to_string()))
            }
            other => Err(LtiError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RSA modulus/exponent from RFC 7517 appendix A.1.
    const RFC7517_N: &str = "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw";

    #[test]
    fn test_rsa_jwk_converts() {
        let jwk = Jwk {
            kty: "RSA".into(),
            kid: Some("2011-04-29".into()),
            alg: Some("RS256".into()),
            use_: Some("sig".into()),
            n: Some(RFC7517_N.into()),
            e: Some("AQAB".into()),
            x: None,
            y: None,
            crv: None,
        };
        assert!(jwk.to_decoding_key().is_ok());
    }

    #[test]
    fn test_rsa_jwk_missing_modulus_rejected() {
        let jwk = Jwk {
            kty: "RSA".into(),
            kid: Some("k1".into()),
            alg: None,
            use_: None,
            n: None,
            e: Some("AQAB".into()),
            x: None,
            y: None,
            crv: None,
        };
        assert!(matches!(
            jwk.to_decoding_key(),
            Err(LtiError::KeySetUnavailable(_))
        ));
    }

    #[test]
    fn test_unknown_key_type_rejected() {
        let jwk = Jwk {
            kty: "OKP".into(),
            kid: Some("k1".into()),
            alg: None,
            use_: None,
            n: None,
            e: None,
            x: None,
            y: None,
            crv: None,
        };
        assert!(matches!(
            jwk.to_decoding_key(),
            Err(LtiError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_memory_cache_roundtrip_and_invalidate() {
        let cache = MemoryKeyCache::new();
        let key = DecodingKey::from_rsa_components(RFC7517_N, "AQAB").unwrap();
        cache.put("k1".into(), key);
        assert!(cache.get("k1").is_some());
        assert_eq!(cache.len(), 1);

        cache.invalidate();
        assert!(cache.get("k1").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_noop_cache_never_stores() {
        let cache = NoopKeyCache;
        let key = DecodingKey::from_rsa_components(RFC7517_N, "AQAB").unwrap();
        cache.put("k1".into(), key);
        assert!(cache.get("k1").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_key_set_is_unavailable() {
        // Nothing listens on the discard port; the fetch must surface as
        // KeySetUnavailable, not hang (client timeout bounds it).
        let key_set = JwksKeySet::new("http://127.0.0.1:9/jwks.json")
            .unwrap()
            .with_timeout(Duration::from_millis(500))
            .unwrap();
        let err = key_set.decoding_key("kid-1").await.unwrap_err();
        assert!(matches!(err, LtiError::KeySetUnavailable(_)));
    }
}
