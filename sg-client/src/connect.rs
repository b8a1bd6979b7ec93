//! Shortcuts for opening a session
//!
//! Each helper builds the credential, the authenticator and the
//! connection, then logs in. Anonymous sessions skip the login.

use crate::SessionConnection;
use safeguard_auth::{
    AnonymousCredential, Authenticator, CertificateCredential, FederationCredential,
    PasswordCredential, SecretBuffer, StsTokenCredential,
};
use safeguard_logging::{SessionObserver, tracing_observer};
use safeguard_protocol::{ConnectionConfig, Error, Result};
use safeguard_transport::{ClientIdentity, HttpSender, ReqwestSender, TlsPolicy};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Opens sessions against one appliance.
///
/// Without an explicit sender a [`ReqwestSender`] is built from the
/// connection settings (and the client certificate, for certificate logins).
#[derive(Clone)]
pub struct Connector {
    config: ConnectionConfig,
    sender: Option<Arc<dyn HttpSender>>,
    observer: Arc<dyn SessionObserver>,
}

impl Connector {
    /// Connector for `config`, logging through `tracing`
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            sender: None,
            observer: tracing_observer(),
        }
    }

    /// Send every request through `sender`
    pub fn with_sender(mut self, sender: Arc<dyn HttpSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Report session events to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Connection settings
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn sender_for(
        &self,
        policy: impl FnOnce() -> Result<TlsPolicy>,
    ) -> Result<Arc<dyn HttpSender>> {
        if let Some(sender) = &self.sender {
            return Ok(Arc::clone(sender));
        }
        let sender =
            ReqwestSender::new(&policy()?).map_err(|e| Error::argument(e.to_string()))?;
        Ok(Arc::new(sender))
    }

    fn open(
        &self,
        credential: Box<dyn FederationCredential>,
        sender: Arc<dyn HttpSender>,
    ) -> Result<SessionConnection> {
        let authenticator = Authenticator::with_observer(
            self.config.clone(),
            credential,
            sender,
            Arc::clone(&self.observer),
        )?;
        Ok(SessionConnection::new(authenticator))
    }

    async fn open_and_login(
        &self,
        credential: Box<dyn FederationCredential>,
        sender: Arc<dyn HttpSender>,
    ) -> Result<SessionConnection> {
        let mut connection = self.open(credential, sender)?;
        connection.refresh_access_token().await?;
        info!(
            address = %self.config.network_address,
            authenticator = connection.authenticator().id(),
            "Connected"
        );
        Ok(connection)
    }

    /// Log in with a username and password. An empty `provider` or `local`
    /// selects the local identity provider.
    pub async fn password(
        &self,
        provider: &str,
        username: &str,
        password: SecretBuffer,
    ) -> Result<SessionConnection> {
        self.config.validate()?;
        let credential = PasswordCredential::new(provider, username, password)?;
        let sender = self.sender_for(|| Ok(TlsPolicy::from_config(&self.config)))?;
        self.open_and_login(Box::new(credential), sender).await
    }

    /// Log in with a client certificate
    pub async fn certificate(&self, identity: ClientIdentity) -> Result<SessionConnection> {
        self.config.validate()?;
        let credential = CertificateCredential::new(identity);
        let sender = self.sender_for(|| credential.tls_policy(&self.config))?;
        self.open_and_login(Box::new(credential), sender).await
    }

    /// Log in with a token already issued by the STS
    pub async fn sts_token(&self, token: SecretBuffer) -> Result<SessionConnection> {
        self.config.validate()?;
        let credential = StsTokenCredential::new(token)?;
        let sender = self.sender_for(|| Ok(TlsPolicy::from_config(&self.config)))?;
        self.open_and_login(Box::new(credential), sender).await
    }

    /// Open an unauthenticated session
    pub fn anonymous(&self) -> Result<SessionConnection> {
        self.config.validate()?;
        let sender = self.sender_for(|| Ok(TlsPolicy::from_config(&self.config)))?;
        self.open(Box::new(AnonymousCredential), sender)
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("config", &self.config)
            .field("custom_sender", &self.sender.is_some())
            .field("observer", &self.observer)
            .finish()
    }
}

/// Password login with default settings
pub async fn connect_password(
    config: ConnectionConfig,
    provider: &str,
    username: &str,
    password: SecretBuffer,
) -> Result<SessionConnection> {
    Connector::new(config)
        .password(provider, username, password)
        .await
}

/// Certificate login with default settings
pub async fn connect_certificate(
    config: ConnectionConfig,
    identity: ClientIdentity,
) -> Result<SessionConnection> {
    Connector::new(config).certificate(identity).await
}

/// STS token login with default settings
pub async fn connect_sts_token(
    config: ConnectionConfig,
    token: SecretBuffer,
) -> Result<SessionConnection> {
    Connector::new(config).sts_token(token).await
}

/// Anonymous session with default settings
pub fn connect_anonymous(config: ConnectionConfig) -> Result<SessionConnection> {
    Connector::new(config).anonymous()
}

#[cfg(test)]
#[path = "connect_tests.rs"]
mod connect_tests;
