//! Scope-set canonicalization.
//!
//! A scope-set is the unit of credential granularity: every distinct
//! canonical set occupies its own cache entry. Overlapping but non-identical
//! sets are deliberately kept apart — no subset sharing, no automatic
//! merging.

/// Read-only scope for listing a user's group memberships.
pub const SCOPE_GROUP_READONLY: &str =
    "https://www.googleapis.com/auth/admin.directory.group.readonly";

/// Read-only scope for listing organization roles and role assignments.
pub const SCOPE_ROLE_MANAGEMENT_READONLY: &str =
    "https://www.googleapis.com/auth/admin.directory.rolemanagement.readonly";

/// Canonicalized set of permission-scope URIs.
///
/// Scopes are sorted and deduplicated at construction, so two sets with the
/// same members in any order derive the same [`cache_key`](Self::cache_key).
/// The canonical space-joined form doubles as the `scope` claim value in the
/// signed assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSet {
    scopes: Vec<String>,
}

impl ScopeSet {
    /// Build a canonical scope-set from any collection of scope URIs.
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut scopes: Vec<String> = scopes.into_iter().map(Into::into).collect();
        scopes.sort_unstable();
        scopes.dedup();
        Self { scopes }
    }

    /// True when the set holds no scopes. Empty sets are rejected by the
    /// credential cache.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Canonical space-joined form: the cache lookup key and the assertion's
    /// `scope` claim.
    #[must_use]
    pub fn cache_key(&self) -> String {
        self.scopes.join(" ")
    }

    /// The canonicalized scope URIs, sorted and deduplicated.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.scopes
    }
}
