use std::fmt;

use zeroize::Zeroizing;

/// Opaque holder for a bearer access token.
///
/// `Debug` and `Display` print `[REDACTED]`; the backing buffer is zeroed
/// when the last clone is dropped out of scope. Call [`expose`](Self::expose)
/// only at the point where the `Authorization` header is written.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
    /// Wrap a plain value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Read-only access to the underlying secret. Do not log or persist the
    /// returned slice.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
