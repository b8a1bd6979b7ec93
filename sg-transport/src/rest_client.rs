//! Verb helpers bound to one base URL

use crate::{HttpRequest, HttpResponse, HttpSender, TransportError};
use safeguard_protocol::{Headers, Method};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// REST client for one backend (STS, core, appliance or notification).
///
/// Cloning is cheap; clones share the underlying sender, which carries no
/// session state.
#[derive(Clone)]
pub struct RestClient {
    base_url: String,
    sender: Arc<dyn HttpSender>,
}

impl RestClient {
    /// Create a client for `base_url`
    pub fn new(base_url: impl Into<String>, sender: Arc<dyn HttpSender>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, sender }
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The sender this client dispatches through
    pub fn sender(&self) -> Arc<dyn HttpSender> {
        Arc::clone(&self.sender)
    }

    /// Build a request for a path relative to the base URL
    pub fn build_request(
        &self,
        method: Method,
        relative_url: &str,
        query: &[(String, String)],
        headers: &Headers,
        body: Option<&str>,
    ) -> HttpRequest {
        let mut request = HttpRequest::new(method, self.absolute_url(relative_url));
        request.query = query.to_vec();
        request.headers = headers.clone();
        request.body = body.map(str::to_string);
        request
    }

    /// Join a relative path onto the base URL
    pub fn absolute_url(&self, relative_url: &str) -> String {
        format!("{}/{}", self.base_url, relative_url.trim_start_matches('/'))
    }

    /// Send a prepared request
    pub async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        trace!(method = %request.method, url = %request.url, "Sending request");
        self.sender.send(request).await
    }

    /// GET `relative_url`
    pub async fn exec_get(
        &self,
        relative_url: &str,
        query: &[(String, String)],
        headers: &Headers,
    ) -> Result<HttpResponse, TransportError> {
        let request = self.build_request(Method::Get, relative_url, query, headers, None);
        self.execute(&request).await
    }

    /// POST `body` to `relative_url`
    pub async fn exec_post(
        &self,
        relative_url: &str,
        query: &[(String, String)],
        headers: &Headers,
        body: Option<&str>,
    ) -> Result<HttpResponse, TransportError> {
        let request = self.build_request(Method::Post, relative_url, query, headers, body);
        self.execute(&request).await
    }

    /// PUT `body` to `relative_url`
    pub async fn exec_put(
        &self,
        relative_url: &str,
        query: &[(String, String)],
        headers: &Headers,
        body: Option<&str>,
    ) -> Result<HttpResponse, TransportError> {
        let request = self.build_request(Method::Put, relative_url, query, headers, body);
        self.execute(&request).await
    }

    /// DELETE `relative_url`
    pub async fn exec_delete(
        &self,
        relative_url: &str,
        query: &[(String, String)],
        headers: &Headers,
    ) -> Result<HttpResponse, TransportError> {
        let request = self.build_request(Method::Delete, relative_url, query, headers, None);
        self.execute(&request).await
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "rest_client_tests.rs"]
mod rest_client_tests;
