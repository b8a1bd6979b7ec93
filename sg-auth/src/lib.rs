//! Authentication for the Safeguard session client
//!
//! Turns a credential into a bearer token usable against the resource API:
//!
//! 1. the credential obtains a federation token from the STS (identity
//!    provider scope lookup plus an OAuth grant, or a pre-issued token);
//! 2. the [`Authenticator`] exchanges it at `Token/LoginResponse` for a
//!    `UserToken` and keeps it in a [`TokenStore`].
//!
//! Secret material lives in [`SecretBuffer`]s and is zero-filled when it is
//! cleared, disposed or dropped.
//!
//! # Example
//!
//! ```rust,no_run
//! use safeguard_auth::{Authenticator, PasswordCredential, SecretBuffer};
//! use safeguard_protocol::ConnectionConfig;
//! use safeguard_transport::{ReqwestSender, TlsPolicy};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConnectionConfig::new("sg.example.com");
//! let sender = Arc::new(ReqwestSender::new(&TlsPolicy::from_config(&config))?);
//! let credential = PasswordCredential::new("local", "admin", SecretBuffer::from("secret"))?;
//!
//! let mut auth = Authenticator::new(config, Box::new(credential), sender)?;
//! auth.refresh_access_token().await?;
//! println!("{} minutes left", auth.access_token_lifetime_remaining().await?);
//! # Ok(())
//! # }
//! ```

pub mod authenticator;
pub mod credential;
pub mod federation;
pub mod secret;
pub mod token_store;

pub use authenticator::{Authenticator, bearer_headers};
pub use credential::{
    AnonymousCredential, CertificateCredential, CredentialKind, FederationCredential,
    PasswordCredential, StsTokenCredential,
};
pub use federation::{FederationClient, match_provider_scope, parse_provider_ids};
pub use secret::SecretBuffer;
pub use token_store::TokenStore;
