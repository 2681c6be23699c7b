//! In-process [`Transport`] double for unit tests.
//!
//! Serves canned responses by request path and records everything it sees,
//! so tests can assert on mint counts, request paths, and bearer headers
//! without a socket.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode, header};
use url::Url;

use crate::transport::{Transport, TransportError};

/// Fake transport: a route table for GETs and a scripted token endpoint for
/// POSTs. Each successful POST yields a distinct token (`tok-1`, `tok-2`,
/// ...) so tests can tell credentials apart.
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<String, (StatusCode, String)>>,
    token_response: Mutex<Option<(StatusCode, String)>>,
    mints: AtomicUsize,
    get_log: Mutex<Vec<String>>,
    auth_log: Mutex<Vec<String>>,
    post_log: Mutex<Vec<Vec<(String, String)>>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            token_response: Mutex::new(None),
            mints: AtomicUsize::new(0),
            get_log: Mutex::new(Vec::new()),
            auth_log: Mutex::new(Vec::new()),
            post_log: Mutex::new(Vec::new()),
        }
    }

    /// Register a GET route by `path?query` string.
    pub(crate) fn route(&self, path_and_query: &str, status: StatusCode, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(path_and_query.to_owned(), (status, body.to_owned()));
    }

    /// Make the token endpoint answer with a fixed status and body instead
    /// of minting.
    pub(crate) fn fail_token_endpoint(&self, status: StatusCode, body: &str) {
        *self.token_response.lock().unwrap() = Some((status, body.to_owned()));
    }

    /// Same as [`fail_token_endpoint`](Self::fail_token_endpoint) with a
    /// 200 status, for malformed-body cases.
    pub(crate) fn set_token_response(&self, body: &str) {
        self.fail_token_endpoint(StatusCode::OK, body);
    }

    /// Restore per-POST token minting.
    pub(crate) fn heal_token_endpoint(&self) {
        *self.token_response.lock().unwrap() = None;
    }

    /// Number of POSTs the token endpoint has received.
    pub(crate) fn mint_count(&self) -> usize {
        self.mints.load(Ordering::SeqCst)
    }

    /// `path?query` of every GET, in order.
    pub(crate) fn get_requests(&self) -> Vec<String> {
        self.get_log.lock().unwrap().clone()
    }

    /// `authorization` header value of every GET, in order.
    pub(crate) fn auth_headers(&self) -> Vec<String> {
        self.auth_log.lock().unwrap().clone()
    }

    /// Decoded form fields of every POST, in order.
    pub(crate) fn posted_forms(&self) -> Vec<Vec<(String, String)>> {
        self.post_log.lock().unwrap().clone()
    }
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{q}", url.path()),
        None => url.path().to_owned(),
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(
        &self,
        url: &Url,
        headers: HeaderMap,
    ) -> Result<(StatusCode, Bytes), TransportError> {
        let key = path_and_query(url);
        self.get_log.lock().unwrap().push(key.clone());
        if let Some(auth) = headers.get(header::AUTHORIZATION) {
            self.auth_log
                .lock()
                .unwrap()
                .push(auth.to_str().unwrap_or("<non-utf8>").to_owned());
        }

        let routes = self.routes.lock().unwrap();
        let (status, body) = routes
            .get(&key)
            .cloned()
            .unwrap_or((StatusCode::NOT_FOUND, format!("no route for {key}")));
        Ok((status, Bytes::from(body)))
    }

    async fn post_form(
        &self,
        _url: &Url,
        fields: &[(&str, &str)],
    ) -> Result<(StatusCode, Bytes), TransportError> {
        let n = self.mints.fetch_add(1, Ordering::SeqCst) + 1;
        self.post_log.lock().unwrap().push(
            fields
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        );

        let (status, body) = self
            .token_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or((StatusCode::OK, format!(r#"{{"access_token":"tok-{n}"}}"#)));
        Ok((status, Bytes::from(body)))
    }
}
