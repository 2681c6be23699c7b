use thiserror::Error;

/// Errors surfaced by the directory client.
///
/// Messages never contain key material, access tokens, or response bodies —
/// only status codes and parse diagnostics, so variants are safe to log
/// as-is.
///
/// No variant is retried internally; retry policy, if desired, is the
/// caller's responsibility.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Service identity key material could not be parsed. Fatal at
    /// construction.
    #[error("invalid signing key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    /// The client configuration cannot express the request (bad base URL,
    /// empty scope set).
    #[error("config error: {0}")]
    Config(String),

    /// Token endpoint failure: transport error, non-success status,
    /// unparseable body, or a body without `access_token`. The credential
    /// cache stores nothing when this is returned.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Directory endpoint failure: transport error or non-success status.
    /// The operation aborts without partial results.
    #[error("directory request failed: {0}")]
    Upstream(String),

    /// A directory response could not be decoded into the expected shape.
    /// Propagates exactly like [`Error::Upstream`].
    #[error("unexpected response shape: {0}")]
    ResponseShape(String),
}
