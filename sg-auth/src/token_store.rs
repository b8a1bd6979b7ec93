//! Bearer token storage

use crate::SecretBuffer;
use safeguard_protocol::{Error, Result};

/// Holds the current bearer token.
///
/// Replacing or clearing the token zero-fills the previous buffer. Once
/// disposed the store refuses to hand out tokens.
#[derive(Debug, Default)]
pub struct TokenStore {
    token: Option<SecretBuffer>,
    disposed: bool,
}

impl TokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new token, wiping the previous one
    pub fn set(&mut self, token: SecretBuffer) -> Result<()> {
        if self.disposed {
            return Err(Error::disposed("TokenStore"));
        }
        self.clear();
        self.token = Some(token);
        Ok(())
    }

    /// Current token, if any
    pub fn get(&self) -> Result<Option<&SecretBuffer>> {
        if self.disposed {
            return Err(Error::disposed("TokenStore"));
        }
        Ok(self.token.as_ref())
    }

    /// Whether a token is held
    pub fn has(&self) -> bool {
        self.token.is_some()
    }

    /// Wipe and drop the token. Idempotent.
    pub fn clear(&mut self) {
        if let Some(mut token) = self.token.take() {
            token.wipe();
        }
    }

    /// Clear the token and refuse any further use
    pub fn dispose(&mut self) {
        self.clear();
        self.disposed = true;
    }

    /// Whether [`dispose`](TokenStore::dispose) has been called
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Independent store holding a copy of the current token
    pub fn duplicate(&self) -> TokenStore {
        TokenStore {
            token: self.token.clone(),
            disposed: self.disposed,
        }
    }
}

#[cfg(test)]
#[path = "token_store_tests.rs"]
mod token_store_tests;
