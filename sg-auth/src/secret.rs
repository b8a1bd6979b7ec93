//! Wipeable secret text

use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// Secret string that is zero-filled on [`wipe`](SecretBuffer::wipe) and on drop.
///
/// `Debug` never prints the contents. Cloning makes an independent copy.
#[derive(Clone, Default)]
pub struct SecretBuffer(Zeroizing<String>);

impl SecretBuffer {
    /// Take ownership of a secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    /// Borrow the secret text
    pub fn expose_secret(&self) -> &str {
        self.0.as_str()
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the buffer holds no bytes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Zero-fill the buffer and leave it empty
    pub fn wipe(&mut self) {
        self.0.zeroize();
    }
}

impl From<String> for SecretBuffer {
    fn from(secret: String) -> Self {
        Self::new(secret)
    }
}

impl From<&str> for SecretBuffer {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl From<Zeroizing<String>> for SecretBuffer {
    fn from(secret: Zeroizing<String>) -> Self {
        Self(secret)
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer([REDACTED])")
    }
}
