//! HTTP transport collaborator.
//!
//! The directory client and token issuer depend only on the [`Transport`]
//! trait: a request in, a status code and raw body out. Timeout, retry, and
//! cancellation policy live behind this seam, not in the client.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use thiserror::Error;
use url::Url;

/// Transport-level failures. HTTP status outcomes are not errors at this
/// layer; they are returned to the caller for classification.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// Request building failed.
    #[error("failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    /// Form body encoding failed.
    #[error("form encoding failed: {0}")]
    FormEncode(#[from] serde_urlencoded::ser::Error),

    /// TLS initialization error.
    #[error("TLS error: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Network or connection error.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<hyper::Error> for TransportError {
    fn from(err: hyper::Error) -> Self {
        TransportError::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for TransportError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        TransportError::Transport(Box::new(err))
    }
}

/// Whether plain `http://` targets are permitted.
///
/// Production traffic is HTTPS-only; the insecure variant exists for tests
/// against local mock servers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportSecurity {
    /// Reject non-HTTPS URLs at connection time.
    #[default]
    HttpsOnly,
    /// Permit `http://` targets (tests only).
    AllowInsecureHttp,
}

/// External HTTP collaborator.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET and return the response status and raw body.
    ///
    /// # Errors
    ///
    /// Fails only on transport-level problems; HTTP error statuses are
    /// returned in the `Ok` variant.
    async fn get(
        &self,
        url: &Url,
        headers: HeaderMap,
    ) -> Result<(StatusCode, Bytes), TransportError>;

    /// Issue a form-encoded POST and return the response status and raw body.
    ///
    /// # Errors
    ///
    /// Fails only on transport-level problems; HTTP error statuses are
    /// returned in the `Ok` variant.
    async fn post_form(
        &self,
        url: &Url,
        fields: &[(&str, &str)],
    ) -> Result<(StatusCode, Bytes), TransportError>;
}

type HyperClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Default [`Transport`] on the hyper stack with rustls and webpki roots.
///
/// `Clone` is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct TlsTransport {
    client: HyperClient,
}

impl TlsTransport {
    /// Build a transport with the given security posture.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Tls`] if the TLS client configuration
    /// cannot be constructed.
    pub fn new(security: TransportSecurity) -> Result<Self, TransportError> {
        // Reuse a globally installed crypto provider when one exists;
        // otherwise fall back to aws-lc-rs without installing it.
        let provider = rustls::crypto::CryptoProvider::get_default()
            .cloned()
            .unwrap_or_else(|| std::sync::Arc::new(rustls::crypto::aws_lc_rs::default_provider()));

        let builder = hyper_rustls::HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(provider)
            .map_err(|e| TransportError::Tls(Box::new(e)))?;

        let connector = match security {
            TransportSecurity::HttpsOnly => builder.https_only().enable_all_versions().build(),
            TransportSecurity::AllowInsecureHttp => {
                builder.https_or_http().enable_all_versions().build()
            }
        };

        let client = Client::builder(TokioExecutor::new()).build::<_, Full<Bytes>>(connector);
        Ok(Self { client })
    }

    async fn send(&self, req: Request<Full<Bytes>>) -> Result<(StatusCode, Bytes), TransportError> {
        let response = self.client.request(req).await?;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();
        Ok((status, body))
    }
}

#[async_trait]
impl Transport for TlsTransport {
    async fn get(
        &self,
        url: &Url,
        headers: HeaderMap,
    ) -> Result<(StatusCode, Bytes), TransportError> {
        let mut req = Request::builder()
            .method(Method::GET)
            .uri(url.as_str())
            .body(Full::default())?;
        req.headers_mut().extend(headers);
        self.send(req).await
    }

    async fn post_form(
        &self,
        url: &Url,
        fields: &[(&str, &str)],
    ) -> Result<(StatusCode, Bytes), TransportError> {
        let body = serde_urlencoded::to_string(fields)?;
        let req = Request::builder()
            .method(Method::POST)
            .uri(url.as_str())
            .header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(Full::new(Bytes::from(body)))?;
        self.send(req).await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn mock_url(server: &MockServer, path: &str) -> Url {
        Url::parse(&format!("http://localhost:{}{path}", server.port())).unwrap()
    }

    #[tokio::test]
    async fn get_returns_status_and_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/ping");
            then.status(200).body("pong");
        });

        let transport = TlsTransport::new(TransportSecurity::AllowInsecureHttp).unwrap();
        let (status, body) = transport
            .get(&mock_url(&server, "/ping"), HeaderMap::new())
            .await
            .unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"pong");
        mock.assert();
    }

    #[tokio::test]
    async fn get_passes_headers_through() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/authed")
                .header("authorization", "Bearer tok-123");
            then.status(200).body("{}");
        });

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            http::HeaderValue::from_static("Bearer tok-123"),
        );

        let transport = TlsTransport::new(TransportSecurity::AllowInsecureHttp).unwrap();
        transport
            .get(&mock_url(&server, "/authed"), headers)
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn post_form_encodes_fields() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/token")
                .header("content-type", "application/x-www-form-urlencoded")
                .body_includes("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer")
                .body_includes("assertion=abc.def.ghi");
            then.status(200).body(r#"{"access_token":"tok"}"#);
        });

        let transport = TlsTransport::new(TransportSecurity::AllowInsecureHttp).unwrap();
        let fields = [
            ("assertion", "abc.def.ghi"),
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
        ];
        let (status, _) = transport
            .post_form(&mock_url(&server, "/token"), &fields)
            .await
            .unwrap();

        assert_eq!(status, StatusCode::OK);
        mock.assert();
    }

    #[tokio::test]
    async fn non_success_status_is_not_a_transport_error() {
        let server = MockServer::start();
        let _mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("not found");
        });

        let transport = TlsTransport::new(TransportSecurity::AllowInsecureHttp).unwrap();
        let (status, body) = transport
            .get(&mock_url(&server, "/missing"), HeaderMap::new())
            .await
            .unwrap();

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(&body[..], b"not found");
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        // Port 9 (discard) is almost certainly not listening.
        let url = Url::parse("http://localhost:9/unreachable").unwrap();
        let transport = TlsTransport::new(TransportSecurity::AllowInsecureHttp).unwrap();
        let err = transport.get(&url, HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, TransportError::Transport(_)), "got: {err}");
    }
}
