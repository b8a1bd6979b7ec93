//! Credential variants
//!
//! A credential knows how to obtain a federation token from the STS and
//! nothing else. Caching, the resource API token exchange and disposal are
//! handled uniformly by the [`Authenticator`](crate::Authenticator).

pub mod anonymous;
pub mod certificate;
pub mod password;
pub mod sts_token;

pub use anonymous::AnonymousCredential;
pub use certificate::CertificateCredential;
pub use password::PasswordCredential;
pub use sts_token::StsTokenCredential;

use crate::{FederationClient, SecretBuffer};
use async_trait::async_trait;
use safeguard_protocol::Result;
use std::fmt;

/// Which credential variant is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// Username and password against an identity provider
    Password,
    /// Client certificate over mutual TLS
    Certificate,
    /// STS token issued elsewhere
    StsToken,
    /// No credential at all
    Anonymous,
}

impl CredentialKind {
    /// Identifier used in error messages
    pub fn id(&self) -> &'static str {
        match self {
            CredentialKind::Password => "Password",
            CredentialKind::Certificate => "Certificate",
            CredentialKind::StsToken => "AccessToken",
            CredentialKind::Anonymous => "Anonymous",
        }
    }

    /// Whether the credential can log in again on its own
    pub fn can_reauthenticate(&self) -> bool {
        matches!(self, CredentialKind::Password | CredentialKind::Certificate)
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Something that can be traded for a federation token
#[async_trait]
pub trait FederationCredential: Send + Sync + fmt::Debug {
    /// Variant of this credential
    fn kind(&self) -> CredentialKind;

    /// Obtain a fresh federation token from the STS
    async fn federation_token(&mut self, federation: &FederationClient) -> Result<SecretBuffer>;

    /// Deep copy for a cloned authenticator
    fn boxed_clone(&self) -> Box<dyn FederationCredential>;

    /// Zero-fill all secret material
    fn wipe(&mut self);
}

impl Clone for Box<dyn FederationCredential> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}
