//! Default sender backed by `reqwest`

use crate::{HttpRequest, HttpResponse, HttpSender, TlsPolicy, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use safeguard_protocol::{Headers, Method};
use tracing::{debug, warn};

/// [`HttpSender`] over a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestSender {
    client: Client,
}

impl ReqwestSender {
    /// Build a sender honouring the TLS policy
    pub fn new(policy: &TlsPolicy) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .timeout(policy.timeout)
            .danger_accept_invalid_certs(policy.ignore_ssl);

        if policy.ignore_ssl {
            warn!("TLS certificate verification is disabled");
        }

        if let Some(identity) = &policy.client_identity {
            let identity = reqwest::Identity::from_pkcs12_der(identity.der(), identity.passphrase())
                .map_err(|e| {
                    TransportError::Config(format!("Invalid client certificate: {e}"))
                })?;
            builder = builder.identity(identity);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    fn prepare(&self, request: &HttpRequest) -> Result<reqwest::Request, TransportError> {
        let url = request.full_url()?;
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), url);

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, header_value(name, value)?);
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        builder
            .build()
            .map_err(|e| TransportError::Protocol(format!("Unable to build request: {e}")))
    }
}

/// Header value for reqwest; `Authorization` is marked sensitive so it never
/// shows up in `Debug` output
fn header_value(name: &str, value: &str) -> Result<HeaderValue, TransportError> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| TransportError::Protocol(format!("Invalid value for header {name}")))?;
    if name.eq_ignore_ascii_case(AUTHORIZATION.as_str()) {
        header.set_sensitive(true);
    }
    Ok(header)
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl HttpSender for ReqwestSender {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let outgoing = self.prepare(request)?;

        let response = self.client.execute(outgoing).await.map_err(|e| {
            debug!(url = %request.url, error = %e, "Request failed");
            TransportError::Connection(e.to_string())
        })?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Protocol(format!("Failed to read response body: {e}")))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod http_tests;
