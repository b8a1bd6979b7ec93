//! Token lifecycle orchestration

use crate::credential::{CredentialKind, FederationCredential};
use crate::{FederationClient, SecretBuffer, TokenStore};
use safeguard_logging::{FederationStage, SessionEvent, SessionObserver, tracing_observer};
use safeguard_protocol::{
    ConnectionConfig, Error, Headers, Result, Service, TOKEN_LIFETIME_HEADER,
    UNKNOWN_LIFETIME_REMAINING,
};
use safeguard_transport::{HttpSender, RestClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use zeroize::Zeroizing;

#[derive(Serialize)]
struct AccessTokenBody<'a> {
    #[serde(rename = "StsAccessToken")]
    sts_access_token: &'a str,
}

#[derive(Deserialize)]
struct LoginResponseReply {
    #[serde(rename = "UserToken")]
    user_token: Option<Zeroizing<String>>,
}

/// Build `Authorization: Bearer <token>` headers
pub fn bearer_headers(token: &SecretBuffer) -> Headers {
    Headers::new().with(
        "Authorization",
        format!("Bearer {}", token.expose_secret()),
    )
}

/// Produces and refreshes the bearer token used against the resource API.
///
/// The token moves through `absent -> obtained -> cleared -> absent`. A
/// refresh asks the credential for a federation token and exchanges it at
/// `Token/LoginResponse`; the store is only written once that exchange
/// succeeds.
#[derive(Debug)]
pub struct Authenticator {
    config: ConnectionConfig,
    federation: FederationClient,
    core: RestClient,
    token: TokenStore,
    credential: Box<dyn FederationCredential>,
    observer: Arc<dyn SessionObserver>,
    disposed: bool,
}

impl Authenticator {
    /// Create an authenticator logging through `tracing`
    pub fn new(
        config: ConnectionConfig,
        credential: Box<dyn FederationCredential>,
        sender: Arc<dyn HttpSender>,
    ) -> Result<Self> {
        Self::with_observer(config, credential, sender, tracing_observer())
    }

    /// Create an authenticator reporting to a custom observer
    pub fn with_observer(
        config: ConnectionConfig,
        credential: Box<dyn FederationCredential>,
        sender: Arc<dyn HttpSender>,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<Self> {
        config.validate()?;

        let rsts = RestClient::new(config.rsts_url(), Arc::clone(&sender));
        let core = RestClient::new(config.service_url(Service::Core), sender);

        Ok(Self {
            federation: FederationClient::new(rsts, Arc::clone(&observer)),
            core,
            token: TokenStore::new(),
            credential,
            observer,
            config,
            disposed: false,
        })
    }

    fn ensure_not_disposed(&self) -> Result<()> {
        if self.disposed {
            return Err(Error::disposed("Authenticator"));
        }
        Ok(())
    }

    /// Variant name, e.g. `Password`
    pub fn id(&self) -> &'static str {
        self.credential.kind().id()
    }

    /// Credential variant
    pub fn kind(&self) -> CredentialKind {
        self.credential.kind()
    }

    /// Appliance address
    pub fn network_address(&self) -> &str {
        &self.config.network_address
    }

    /// Resource API version
    pub fn api_version(&self) -> u32 {
        self.config.api_version
    }

    /// Whether TLS verification is skipped
    pub fn ignore_ssl(&self) -> bool {
        self.config.ignore_ssl
    }

    /// Connection settings
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Sender shared by every client of this session
    pub fn sender(&self) -> Arc<dyn HttpSender> {
        self.core.sender()
    }

    /// Observer receiving session events
    pub fn observer(&self) -> Arc<dyn SessionObserver> {
        Arc::clone(&self.observer)
    }

    /// True only for anonymous sessions
    pub fn is_anonymous(&self) -> bool {
        self.kind() == CredentialKind::Anonymous
    }

    /// Whether a listener can log in again after the token expires
    pub fn supports_persistent_listener(&self) -> bool {
        self.kind().can_reauthenticate()
    }

    /// Whether a token is held
    pub fn has_access_token(&self) -> bool {
        self.token.has()
    }

    /// Current token, if any
    pub fn access_token(&self) -> Result<Option<&SecretBuffer>> {
        self.ensure_not_disposed()?;
        self.token.get()
    }

    /// Wipe the current token
    pub fn clear_access_token(&mut self) {
        if self.token.has() {
            self.token.clear();
            self.observer.on_event(&SessionEvent::TokenCleared {
                authenticator: self.id().to_string(),
            });
        }
    }

    fn exchange_failed(&self, error: Error) -> Error {
        self.observer.on_event(&SessionEvent::FederationFailed {
            stage: FederationStage::TokenExchange,
            message: error.to_string(),
        });
        error
    }

    /// Obtain a new token through the credential and the token exchange
    pub async fn refresh_access_token(&mut self) -> Result<()> {
        self.ensure_not_disposed()?;

        let mut sts_token = self.credential.federation_token(&self.federation).await?;
        let body = serde_json::to_string(&AccessTokenBody {
            sts_access_token: sts_token.expose_secret(),
        })
        .map(Zeroizing::new);
        sts_token.wipe();
        let body = body.map_err(|e| Error::session(format!("Unable to encode token exchange: {e}")))?;

        let headers = Headers::new()
            .with("Content-Type", "application/json")
            .with("Accept", "application/json");

        let mut response = self
            .core
            .exec_post("Token/LoginResponse", &[], &headers, Some(body.as_str()))
            .await
            .map_err(|_| {
                self.exchange_failed(Error::session(format!(
                    "Unable to connect to web service {}",
                    self.core.base_url()
                )))
            })?;

        if !response.is_success() {
            let error = Error::session_response(
                &format!(
                    "Error exchanging RSTS token from {} authenticator for Safeguard API access token",
                    self.id()
                ),
                response.status,
                std::mem::take(&mut response.body),
            );
            return Err(self.exchange_failed(error));
        }

        let reply = serde_json::from_str::<LoginResponseReply>(&response.body);
        response.wipe();

        let user_token = reply.ok().and_then(|reply| reply.user_token).ok_or_else(|| {
            self.exchange_failed(Error::session(format!(
                "Token exchange with {} did not return a UserToken",
                self.core.base_url()
            )))
        })?;

        self.token.set(SecretBuffer::from(user_token))?;
        self.observer.on_event(&SessionEvent::TokenObtained {
            authenticator: self.id().to_string(),
        });
        Ok(())
    }

    /// Minutes the current token stays valid.
    ///
    /// `0` when there is no token, the server rejects it, or the server
    /// reports a negative lifetime. When the server accepts the token without
    /// a readable lifetime, [`UNKNOWN_LIFETIME_REMAINING`] is returned.
    pub async fn access_token_lifetime_remaining(&self) -> Result<u32> {
        self.ensure_not_disposed()?;
        let Some(token) = self.token.get()? else {
            return Ok(0);
        };

        let mut headers = bearer_headers(token).with(TOKEN_LIFETIME_HEADER, "");
        let response = self.core.exec_get("LoginMessage", &[], &headers).await;
        headers.wipe();

        let response = response.map_err(|_| {
            Error::session(format!(
                "Unable to connect to web service {}",
                self.core.base_url()
            ))
        })?;

        if !response.is_success() {
            debug!(status = response.status, "Access token rejected by LoginMessage");
            return Ok(0);
        }

        Ok(response
            .headers
            .get(TOKEN_LIFETIME_HEADER)
            .and_then(|value| value.trim().parse::<i64>().ok())
            .map(|minutes| u32::try_from(minutes.max(0)).unwrap_or(u32::MAX))
            .unwrap_or(UNKNOWN_LIFETIME_REMAINING))
    }

    /// Wipe the token and the credential and refuse further use. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.token.dispose();
        self.credential.wipe();
        self.disposed = true;
        info!(authenticator = self.id(), "Authenticator disposed");
        self.observer.on_event(&SessionEvent::Disposed {
            object: "Authenticator".to_string(),
        });
    }

    /// Whether [`dispose`](Authenticator::dispose) has been called
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Clone for Authenticator {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            federation: self.federation.clone(),
            core: self.core.clone(),
            token: self.token.duplicate(),
            credential: self.credential.boxed_clone(),
            observer: Arc::clone(&self.observer),
            disposed: self.disposed,
        }
    }
}

impl Drop for Authenticator {
    fn drop(&mut self) {
        self.token.clear();
        self.credential.wipe();
    }
}

#[cfg(test)]
#[path = "authenticator_tests.rs"]
mod authenticator_tests;
