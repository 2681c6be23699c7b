//! Directory query surface.
//!
//! Two read operations against the admin directory API, each acquiring its
//! bearer credential from the per-scope-set cache: group memberships for a
//! user, and organization roles resolved for a user.

use std::collections::HashMap;
use std::sync::Arc;

use aliri_clock::{Clock, System};
use http::{HeaderMap, HeaderValue, header};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::cache::{CachedCredential, CredentialCache};
use crate::error::Error;
use crate::identity::ServiceIdentity;
use crate::issuer::TokenIssuer;
use crate::scope::{SCOPE_GROUP_READONLY, SCOPE_ROLE_MANAGEMENT_READONLY, ScopeSet};
use crate::transport::Transport;
use crate::types::{
    GroupsResponse, OrgRole, OrgRolesResponse, ResolvedRole, RoleAssignmentsResponse,
};

/// Production API root. Tests point [`DirectoryClient::with_base_and_clock`]
/// at a local mock instead.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com";

const TOKEN_PATH: &str = "/oauth2/v3/token";

/// Client for directory reads on behalf of an impersonated admin user.
pub struct DirectoryClient<C: Clock = System> {
    cache: CredentialCache<C>,
    transport: Arc<dyn Transport>,
    api_base: Url,
}

impl DirectoryClient<System> {
    /// Build a client against the production API root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token endpoint URL cannot be formed.
    pub fn new(identity: ServiceIdentity, transport: Arc<dyn Transport>) -> Result<Self, Error> {
        let api_base = Url::parse(DEFAULT_API_BASE)
            .map_err(|e| Error::Config(format!("invalid API base: {e}")))?;
        Self::with_base_and_clock(identity, transport, api_base, System)
    }
}

impl<C: Clock + Clone> DirectoryClient<C> {
    /// Build a client against an explicit API base with an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token endpoint URL cannot be formed
    /// from `api_base`.
    pub fn with_base_and_clock(
        identity: ServiceIdentity,
        transport: Arc<dyn Transport>,
        api_base: Url,
        clock: C,
    ) -> Result<Self, Error> {
        let token_url = api_base
            .join(TOKEN_PATH)
            .map_err(|e| Error::Config(format!("invalid token endpoint URL: {e}")))?;
        let issuer = TokenIssuer::new(identity, Arc::clone(&transport), token_url, clock.clone());
        Ok(Self {
            cache: CredentialCache::new(issuer, clock),
            transport,
            api_base,
        })
    }

    /// List the email addresses of the groups `email` belongs to.
    ///
    /// A user with no memberships yields an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// Propagates credential errors, [`Error::Upstream`] for transport or
    /// non-success HTTP outcomes, and [`Error::ResponseShape`] for an
    /// undecodable body.
    pub async fn groups_for(&self, email: &str) -> Result<Vec<String>, Error> {
        let scopes = ScopeSet::new([SCOPE_GROUP_READONLY]);
        let credential = self.cache.token_for(&scopes).await?;

        let path = format!(
            "/admin/directory/v1/groups?userKey={}",
            urlencoding::encode(email)
        );
        let response: GroupsResponse = self.get_json(&path, &credential).await?;

        debug!(user = %email, count = response.groups.len(), "listed group memberships");
        Ok(response.groups.into_iter().map(|g| g.email).collect())
    }

    /// Resolve the organization roles assigned to `email` within customer
    /// `customer_id`.
    ///
    /// Fetches the customer's role catalog and the user's assignments
    /// concurrently under one credential, then joins assignments to
    /// definitions by role id. Assignments referencing an unknown role id
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Propagates credential errors, [`Error::Upstream`] for transport or
    /// non-success HTTP outcomes, and [`Error::ResponseShape`] when either
    /// response lacks its `items` array or fails to decode.
    pub async fn roles_for(
        &self,
        email: &str,
        customer_id: &str,
    ) -> Result<Vec<ResolvedRole>, Error> {
        let scopes = ScopeSet::new([SCOPE_ROLE_MANAGEMENT_READONLY]);
        let credential = self.cache.token_for(&scopes).await?;

        let customer = urlencoding::encode(customer_id);
        let roles_path = format!("/admin/directory/v1/customer/{customer}/roles");
        let assignments_path = format!(
            "/admin/directory/v1/customer/{customer}/roleassignments?userKey={}",
            urlencoding::encode(email)
        );

        let (roles, assignments) = tokio::join!(
            self.get_json::<OrgRolesResponse>(&roles_path, &credential),
            self.get_json::<RoleAssignmentsResponse>(&assignments_path, &credential),
        );

        let roles = roles?
            .items
            .ok_or_else(|| Error::ResponseShape("roles response missing `items`".into()))?;
        let assignments = assignments?.items.ok_or_else(|| {
            Error::ResponseShape("role assignments response missing `items`".into())
        })?;

        let by_id: HashMap<&str, &OrgRole> =
            roles.iter().map(|r| (r.role_id.as_str(), r)).collect();

        let resolved: Vec<ResolvedRole> = assignments
            .iter()
            .filter_map(|a| by_id.get(a.role_id.as_str()))
            .map(|r| ResolvedRole {
                role_id: r.role_id.clone(),
                role_name: r.role_name.clone(),
                role_description: r.role_description.clone(),
            })
            .collect();

        debug!(
            user = %email,
            assignments = assignments.len(),
            resolved = resolved.len(),
            "resolved organization roles"
        );
        Ok(resolved)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path_and_query: &str,
        credential: &CachedCredential,
    ) -> Result<T, Error> {
        let url = self
            .api_base
            .join(path_and_query)
            .map_err(|e| Error::Config(format!("invalid request URL: {e}")))?;

        let mut headers = HeaderMap::new();
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", credential.access_token().expose()))
                .map_err(|e| Error::Config(format!("invalid bearer header: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, bearer);

        let (status, body) = self
            .transport
            .get(&url, headers)
            .await
            .map_err(|e| Error::Upstream(format!("GET {}: {e}", url.path())))?;

        if !status.is_success() {
            warn!(path = url.path(), status = %status, "directory request failed");
            return Err(Error::Upstream(format!(
                "GET {} returned HTTP {status}",
                url.path()
            )));
        }

        serde_json::from_slice(&body)
            .map_err(|e| Error::ResponseShape(format!("GET {}: {e}", url.path())))
    }
}
