//! Pre-issued STS token credential

use super::{CredentialKind, FederationCredential};
use crate::{FederationClient, SecretBuffer};
use async_trait::async_trait;
use safeguard_protocol::{Error, Result};

/// An STS access token obtained out of band.
///
/// No grant is performed; the token goes straight to the resource API
/// exchange on every refresh.
#[derive(Debug, Clone)]
pub struct StsTokenCredential {
    token: SecretBuffer,
}

impl StsTokenCredential {
    /// Wrap a token. The token must not be empty.
    pub fn new(token: SecretBuffer) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::argument("The access token parameter can not be null"));
        }
        Ok(Self { token })
    }
}

#[async_trait]
impl FederationCredential for StsTokenCredential {
    fn kind(&self) -> CredentialKind {
        CredentialKind::StsToken
    }

    async fn federation_token(&mut self, _federation: &FederationClient) -> Result<SecretBuffer> {
        if self.token.is_empty() {
            return Err(Error::disposed("StsTokenCredential"));
        }
        Ok(self.token.clone())
    }

    fn boxed_clone(&self) -> Box<dyn FederationCredential> {
        Box::new(self.clone())
    }

    fn wipe(&mut self) {
        self.token.wipe();
    }
}
