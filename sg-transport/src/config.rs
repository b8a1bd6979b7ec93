//! Transport configuration

use crate::TransportError;
use safeguard_protocol::ConnectionConfig;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use zeroize::Zeroizing;

/// PKCS#12 client certificate used for mutual TLS with the STS
#[derive(Clone)]
pub struct ClientIdentity {
    pkcs12: Zeroizing<Vec<u8>>,
    passphrase: Zeroizing<String>,
}

impl ClientIdentity {
    /// Wrap DER-encoded PKCS#12 bytes and their passphrase
    pub fn from_pkcs12_der(der: Vec<u8>, passphrase: impl Into<String>) -> Self {
        Self {
            pkcs12: Zeroizing::new(der),
            passphrase: Zeroizing::new(passphrase.into()),
        }
    }

    /// Read a PKCS#12 file
    pub async fn load_pkcs12(
        path: impl AsRef<Path>,
        passphrase: impl Into<String>,
    ) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let der = tokio::fs::read(path).await.map_err(|e| {
            TransportError::Config(format!(
                "Unable to read client certificate {}: {e}",
                path.display()
            ))
        })?;
        Ok(Self::from_pkcs12_der(der, passphrase))
    }

    /// Raw PKCS#12 bytes
    pub fn der(&self) -> &[u8] {
        &self.pkcs12
    }

    /// Passphrase protecting the PKCS#12 bundle
    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("der_len", &self.pkcs12.len())
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

/// TLS and timeout settings for a sender
#[derive(Debug, Clone)]
pub struct TlsPolicy {
    /// Accept any server certificate
    pub ignore_ssl: bool,
    /// Client certificate presented during the handshake
    pub client_identity: Option<ClientIdentity>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for TlsPolicy {
    fn default() -> Self {
        Self {
            ignore_ssl: false,
            client_identity: None,
            timeout: Duration::from_secs(safeguard_protocol::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl TlsPolicy {
    /// Derive the policy from a connection configuration
    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self {
            ignore_ssl: config.ignore_ssl,
            client_identity: None,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Present a client certificate
    pub fn with_client_identity(mut self, identity: ClientIdentity) -> Self {
        self.client_identity = Some(identity);
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
