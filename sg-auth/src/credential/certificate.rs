//! Client certificate credential

use super::{CredentialKind, FederationCredential};
use crate::{FederationClient, SecretBuffer};
use async_trait::async_trait;
use safeguard_protocol::{ConnectionConfig, Error, PRIMARY_PROVIDER_SCOPE_PREFIX, Result};
use safeguard_transport::{ClientIdentity, TlsPolicy};

/// Provider id of the certificate identity provider
pub const CERTIFICATE_PROVIDER: &str = "certificate";

/// Certificate login using the `client_credentials` grant.
///
/// The TLS handshake itself is done by the transport; build the sender from
/// [`CertificateCredential::tls_policy`] so it presents the certificate.
#[derive(Debug, Clone)]
pub struct CertificateCredential {
    identity: Option<ClientIdentity>,
    provider_scope: String,
}

impl CertificateCredential {
    /// Use the default certificate identity provider
    pub fn new(identity: ClientIdentity) -> Self {
        Self::with_provider(identity, CERTIFICATE_PROVIDER)
    }

    /// Use a specific identity provider id
    pub fn with_provider(identity: ClientIdentity, provider: &str) -> Self {
        Self {
            identity: Some(identity),
            provider_scope: format!("{PRIMARY_PROVIDER_SCOPE_PREFIX}{provider}"),
        }
    }

    /// Scope sent with the grant
    pub fn provider_scope(&self) -> &str {
        &self.provider_scope
    }

    /// Transport policy presenting this certificate
    pub fn tls_policy(&self, config: &ConnectionConfig) -> Result<TlsPolicy> {
        let identity = self
            .identity
            .clone()
            .ok_or_else(|| Error::disposed("CertificateCredential"))?;
        Ok(TlsPolicy::from_config(config).with_client_identity(identity))
    }
}

#[async_trait]
impl FederationCredential for CertificateCredential {
    fn kind(&self) -> CredentialKind {
        CredentialKind::Certificate
    }

    async fn federation_token(&mut self, federation: &FederationClient) -> Result<SecretBuffer> {
        if self.identity.is_none() {
            return Err(Error::disposed("CertificateCredential"));
        }
        federation
            .client_credentials_grant(&self.provider_scope)
            .await
    }

    fn boxed_clone(&self) -> Box<dyn FederationCredential> {
        Box::new(self.clone())
    }

    fn wipe(&mut self) {
        // ClientIdentity zeroizes its bytes and passphrase on drop
        self.identity = None;
    }
}
