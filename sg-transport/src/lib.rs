//! HTTP transport for the Safeguard session client
//!
//! The session layer never talks to the network directly. It builds an
//! [`HttpRequest`] through a [`RestClient`] bound to one base URL, and the
//! request goes out through an [`HttpSender`]. [`ReqwestSender`] is the
//! default sender; tests plug in scripted ones.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use safeguard_protocol::{ConnectionConfig, Headers};
//! use safeguard_transport::{ReqwestSender, RestClient, TlsPolicy};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConnectionConfig::new("sg.example.com");
//! let sender = Arc::new(ReqwestSender::new(&TlsPolicy::from_config(&config))?);
//! let notification = RestClient::new(config.service_url(safeguard_protocol::Service::Notification), sender);
//!
//! let response = notification.exec_get("Status", &[], &Headers::new()).await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod http;
pub mod rest_client;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

use async_trait::async_trait;
use safeguard_protocol::{FullResponse, Headers, Method};
use std::fmt;
use thiserror::Error as ThisError;
use zeroize::Zeroize;

pub use config::{ClientIdentity, TlsPolicy};
pub use http::ReqwestSender;
pub use rest_client::RestClient;

#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("Transport configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// An outgoing request.
///
/// Headers and body are zero-filled when the request is dropped, since they
/// carry bearer tokens and passwords.
pub struct HttpRequest {
    /// HTTP verb
    pub method: Method,
    /// Absolute URL without query string
    pub url: String,
    /// Query parameters in the order they are sent
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: Headers,
    /// Request body text
    pub body: Option<String>,
}

impl HttpRequest {
    /// Create a request without query, headers or body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Absolute URL with the query parameters appended
    pub fn full_url(&self) -> Result<url::Url, TransportError> {
        let mut url = url::Url::parse(&self.url)
            .map_err(|e| TransportError::Config(format!("Invalid URL {}: {e}", self.url)))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(
                self.query
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            );
        }
        Ok(url)
    }

    /// Query parameter names in order
    pub fn query_keys(&self) -> Vec<String> {
        self.query.iter().map(|(key, _)| key.clone()).collect()
    }
}

impl Drop for HttpRequest {
    fn drop(&mut self) {
        self.headers.wipe();
        if let Some(body) = self.body.as_mut() {
            body.zeroize();
        }
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("query_keys", &self.query_keys())
            .field("headers", &self.headers)
            .field("body_size", &self.body.as_ref().map(String::len))
            .finish()
    }
}

/// A response as seen by the session layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body text
    pub body: String,
}

impl HttpResponse {
    /// Create a response without headers
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// Builder form for adding a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Zero-fill the body and headers. Used once a token has been parsed out.
    pub fn wipe(&mut self) {
        self.body.zeroize();
        self.headers.wipe();
    }
}

impl From<HttpResponse> for FullResponse {
    fn from(response: HttpResponse) -> Self {
        FullResponse {
            status: response.status,
            headers: response.headers,
            body: response.body,
        }
    }
}

/// Sends one request and returns whatever the server answered.
///
/// Non-2xx statuses are not errors at this level; only failing to get an
/// answer is.
#[async_trait]
pub trait HttpSender: Send + Sync {
    /// Send `request` and wait for the complete response
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}
