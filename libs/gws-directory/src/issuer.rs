//! Signed-assertion minting and exchange.
//!
//! One grant type only: the `OAuth2` JWT-bearer exchange for a service
//! identity with an impersonated subject. The issuer builds the RS256
//! assertion, POSTs it to the token endpoint, and pairs the returned access
//! token with the expiry instant of the *request's own* `exp` claim — never
//! with a server-reported lifetime, so the cache can never claim a longer
//! validity window than was requested.

use std::sync::Arc;

use aliri_clock::{Clock, DurationSecs, System, UnixTime};
use jsonwebtoken::{Algorithm, Header};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::CachedCredential;
use crate::error::Error;
use crate::identity::ServiceIdentity;
use crate::scope::ScopeSet;
use crate::secret::SecretString;
use crate::transport::Transport;
use url::Url;

/// Grant type URN for the signed-assertion bearer exchange (RFC 7523).
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion lifetime requested in the `exp` claim.
const ASSERTION_LIFETIME: DurationSecs = DurationSecs(60 * 60);

/// Assertion claim set. Field names and the one-hour lifetime are part of
/// the contract with the authorization server.
#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    scope: String,
    aud: &'a str,
    exp: u64,
    iat: u64,
}

/// Mints bearer credentials for a scope-set by signed-assertion exchange.
pub struct TokenIssuer<C: Clock = System> {
    identity: ServiceIdentity,
    transport: Arc<dyn Transport>,
    token_url: Url,
    clock: C,
}

impl<C: Clock> TokenIssuer<C> {
    /// Build an issuer that signs as `identity` and exchanges at
    /// `token_url`.
    pub fn new(
        identity: ServiceIdentity,
        transport: Arc<dyn Transport>,
        token_url: Url,
        clock: C,
    ) -> Self {
        Self {
            identity,
            transport,
            token_url,
            clock,
        }
    }

    /// Exchange a freshly signed assertion for a bearer credential scoped to
    /// exactly `scopes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] on signing failure, transport
    /// failure, non-success status, or a response body without
    /// `access_token`. Never retried here.
    pub async fn mint(&self, scopes: &ScopeSet) -> Result<CachedCredential, Error> {
        let iat = self.clock.now();
        let exp = UnixTime(iat.0 + ASSERTION_LIFETIME.0);

        let claims = AssertionClaims {
            iss: self.identity.issuer(),
            sub: self.identity.subject(),
            scope: scopes.cache_key(),
            aud: self.token_url.as_str(),
            exp: exp.0,
            iat: iat.0,
        };

        let assertion = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            self.identity.signing_key(),
        )
        .map_err(|e| Error::Authentication(format!("failed to sign assertion: {e}")))?;

        let fields = [
            ("assertion", assertion.as_str()),
            ("grant_type", JWT_BEARER_GRANT_TYPE),
        ];
        let (status, body) = self
            .transport
            .post_form(&self.token_url, &fields)
            .await
            .map_err(|e| Error::Authentication(format!("token endpoint: {e}")))?;

        if !status.is_success() {
            warn!(scope = %claims.scope, status = %status, "token exchange rejected");
            return Err(Error::Authentication(format!(
                "token endpoint returned HTTP {status}"
            )));
        }

        let response: crate::types::TokenResponse = serde_json::from_slice(&body)
            .map_err(|e| Error::Authentication(format!("token response parse failed: {e}")))?;

        debug!(scope = %claims.scope, expires_at = exp.0, "minted access token");

        Ok(CachedCredential::new(
            SecretString::new(response.access_token),
            exp,
        ))
    }
}
