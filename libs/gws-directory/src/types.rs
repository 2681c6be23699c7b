//! Wire and domain types for the token and directory endpoints.

use serde::Deserialize;

/// Token endpoint response.
///
/// **Intentionally `Deserialize`-only** so access tokens cannot be
/// serialized into logs. Only `access_token` is read: the cache's validity
/// window comes from the locally requested `exp` claim, so a server-reported
/// `expires_in` is deliberately ignored.
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

/// One group a user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectoryGroup {
    /// Group email address.
    pub email: String,
}

/// Response of the groups-listing endpoint. An absent `groups` array means
/// the user has no groups; that is an empty result by contract, not an
/// error.
#[derive(Deserialize)]
pub(crate) struct GroupsResponse {
    #[serde(default)]
    pub groups: Vec<DirectoryGroup>,
}

/// Organization-wide admin role definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgRole {
    /// Stable role identifier.
    pub role_id: String,
    /// Human-readable role name.
    pub role_name: String,
    /// Free-text description.
    pub role_description: String,
}

#[derive(Deserialize)]
pub(crate) struct OrgRolesResponse {
    pub items: Option<Vec<OrgRole>>,
}

/// A role assignment linking the user to an [`OrgRole`] by id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    /// Id of the assigned role.
    pub role_id: String,
}

#[derive(Deserialize)]
pub(crate) struct RoleAssignmentsResponse {
    pub items: Option<Vec<RoleAssignment>>,
}

/// Join result of a [`RoleAssignment`] with its [`OrgRole`] definition.
///
/// Assignments whose `roleId` has no matching org role are dropped during
/// the join, so every `ResolvedRole` is backed by a real definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRole {
    /// Stable role identifier.
    pub role_id: String,
    /// Human-readable role name.
    pub role_name: String,
    /// Free-text description.
    pub role_description: String,
}
