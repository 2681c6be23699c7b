//! Demand-driven credential cache keyed by canonical scope-set.
//!
//! Nothing is fetched ahead of demand and nothing is refreshed in the
//! background: a credential is minted when a lookup finds no live entry and
//! replaced only when the next lookup after its expiry arrives.

use aliri_clock::{Clock, System, UnixTime};
use dashmap::DashMap;
use tracing::debug;

use crate::error::Error;
use crate::issuer::TokenIssuer;
use crate::scope::ScopeSet;
use crate::secret::SecretString;

/// An access token paired with the expiry instant of the assertion that
/// produced it.
#[derive(Clone, Debug)]
pub struct CachedCredential {
    access_token: SecretString,
    expires_at: UnixTime,
}

impl CachedCredential {
    pub(crate) fn new(access_token: SecretString, expires_at: UnixTime) -> Self {
        Self {
            access_token,
            expires_at,
        }
    }

    /// The bearer token. `Display`/`Debug` on the returned handle redact it.
    #[must_use]
    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    /// Instant after which the credential is no longer served from cache.
    #[must_use]
    pub fn expires_at(&self) -> UnixTime {
        self.expires_at
    }
}

/// Concurrent map from canonical scope-set key to its live credential.
///
/// Lookups are lock-free reads; a miss mints outside the map and then
/// substitutes the entry atomically. Two tasks that miss on the same key
/// concurrently may both mint; the later insert wins and both tokens are
/// valid, so the race costs one redundant exchange and nothing else.
pub struct CredentialCache<C: Clock = System> {
    issuer: TokenIssuer<C>,
    clock: C,
    entries: DashMap<String, CachedCredential>,
}

impl<C: Clock> CredentialCache<C> {
    /// Build an empty cache that mints through `issuer`.
    #[must_use]
    pub fn new(issuer: TokenIssuer<C>, clock: C) -> Self {
        Self {
            issuer,
            clock,
            entries: DashMap::new(),
        }
    }

    /// Return a live credential for exactly `scopes`, minting one if the
    /// cache has none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty scope-set and propagates
    /// [`Error::Authentication`] from a failed mint. A failed mint leaves
    /// the cache untouched, so the next lookup retries from scratch.
    pub async fn token_for(&self, scopes: &ScopeSet) -> Result<CachedCredential, Error> {
        if scopes.is_empty() {
            return Err(Error::Config("scope set must not be empty".into()));
        }

        let key = scopes.cache_key();
        let now = self.clock.now();

        // Guard must drop before the mint await below.
        if let Some(entry) = self.entries.get(&key) {
            if now < entry.expires_at() {
                debug!(scope = %key, "credential cache hit");
                return Ok(entry.clone());
            }
            debug!(scope = %key, "cached credential expired");
        }

        let credential = self.issuer.mint(scopes).await?;
        self.entries.insert(key, credential.clone());
        Ok(credential)
    }
}
