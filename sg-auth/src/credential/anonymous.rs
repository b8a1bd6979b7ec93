//! Anonymous access

use super::{CredentialKind, FederationCredential};
use crate::{FederationClient, SecretBuffer};
use async_trait::async_trait;
use safeguard_protocol::{Error, Result};

/// No credential. Only unauthenticated endpoints such as the notification
/// service can be called.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousCredential;

#[async_trait]
impl FederationCredential for AnonymousCredential {
    fn kind(&self) -> CredentialKind {
        CredentialKind::Anonymous
    }

    async fn federation_token(&mut self, _federation: &FederationClient) -> Result<SecretBuffer> {
        Err(Error::session(
            "Anonymous connection cannot be used to get an API access token, Error: Unsupported operation",
        ))
    }

    fn boxed_clone(&self) -> Box<dyn FederationCredential> {
        Box::new(*self)
    }

    fn wipe(&mut self) {}
}
