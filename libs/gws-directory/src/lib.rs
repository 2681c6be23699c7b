#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Server-to-server client for the Google Workspace Admin Directory API.
//!
//! The client authenticates as a service account acting on behalf of a
//! workspace user (domain-wide delegation): it signs a short-lived RS256
//! assertion, exchanges it for a bearer token via the `OAuth2` JWT-bearer
//! grant, and caches tokens per scope-set with transparent re-mint on
//! expiry.
//!
//! Two read operations are exposed:
//! - [`DirectoryClient::groups_for`] — group memberships of a user
//! - [`DirectoryClient::roles_for`] — admin role assignments of a user,
//!   joined with the organization's role definitions
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gws_directory::{DirectoryClient, ServiceIdentity, TlsTransport, TransportSecurity};
//!
//! let identity = ServiceIdentity::new(
//!     "svc@project.iam.gserviceaccount.com",
//!     &std::fs::read_to_string("key.pem")?,
//!     "admin@example.com",
//! )?;
//! let transport = Arc::new(TlsTransport::new(TransportSecurity::HttpsOnly)?);
//! let client = DirectoryClient::new(identity, transport)?;
//!
//! let groups = client.groups_for("user@example.com").await?;
//! let roles = client.roles_for("user@example.com", "C01234abc").await?;
//! ```
//!
//! Retry, timeout, and cancellation policy are deliberately out of scope:
//! they belong to the [`Transport`] collaborator or to the caller.

mod cache;
mod client;
mod error;
mod identity;
mod issuer;
mod scope;
mod secret;
mod transport;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CachedCredential, CredentialCache};
pub use client::{DEFAULT_API_BASE, DirectoryClient};
pub use error::Error;
pub use identity::ServiceIdentity;
pub use issuer::{JWT_BEARER_GRANT_TYPE, TokenIssuer};
pub use scope::{SCOPE_GROUP_READONLY, SCOPE_ROLE_MANAGEMENT_READONLY, ScopeSet};
pub use secret::SecretString;
pub use transport::{TlsTransport, Transport, TransportError, TransportSecurity};
pub use types::{DirectoryGroup, OrgRole, ResolvedRole, RoleAssignment};
