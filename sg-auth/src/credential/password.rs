//! Username and password credential

use super::{CredentialKind, FederationCredential};
use crate::{FederationClient, SecretBuffer};
use async_trait::async_trait;
use safeguard_protocol::{Error, LOCAL_PROVIDER_SCOPE, Result};

/// Password login against an identity provider.
///
/// The provider scope is resolved on first use and cached for the lifetime
/// of the credential. An empty provider, or `local`, needs no lookup.
#[derive(Debug)]
pub struct PasswordCredential {
    provider: String,
    provider_scope: Option<String>,
    username: String,
    password: SecretBuffer,
}

impl PasswordCredential {
    /// Create a password credential. The password must not be empty.
    pub fn new(
        provider: impl Into<String>,
        username: impl Into<String>,
        password: SecretBuffer,
    ) -> Result<Self> {
        if password.is_empty() {
            return Err(Error::argument("The password parameter can not be null"));
        }
        let provider = provider.into();
        let provider_scope = initial_scope(&provider);
        Ok(Self {
            provider,
            provider_scope,
            username: username.into(),
            password,
        })
    }

    /// Identity provider name as given
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Resolved scope, if known
    pub fn provider_scope(&self) -> Option<&str> {
        self.provider_scope.as_deref()
    }

    /// Login name
    pub fn username(&self) -> &str {
        &self.username
    }
}

fn initial_scope(provider: &str) -> Option<String> {
    if provider.is_empty() || provider.eq_ignore_ascii_case("local") {
        Some(LOCAL_PROVIDER_SCOPE.to_string())
    } else {
        None
    }
}

// Clones re-resolve the scope.
impl Clone for PasswordCredential {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            provider_scope: initial_scope(&self.provider),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[async_trait]
impl FederationCredential for PasswordCredential {
    fn kind(&self) -> CredentialKind {
        CredentialKind::Password
    }

    async fn federation_token(&mut self, federation: &FederationClient) -> Result<SecretBuffer> {
        let scope = match &self.provider_scope {
            Some(scope) => scope.clone(),
            None => {
                let scope = federation.resolve_provider_scope(&self.provider).await?;
                self.provider_scope = Some(scope.clone());
                scope
            }
        };

        federation
            .password_grant(&self.username, &self.password, &scope)
            .await
    }

    fn boxed_clone(&self) -> Box<dyn FederationCredential> {
        Box::new(self.clone())
    }

    fn wipe(&mut self) {
        self.password.wipe();
    }
}
