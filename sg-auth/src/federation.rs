//! Security token service (RSTS) client
//!
//! Federation happens in two stages. The identity provider scope is looked
//! up through the login controller, then an OAuth grant against
//! `oauth2/token` yields the federation token.

use crate::SecretBuffer;
use safeguard_logging::{FederationStage, SessionEvent, SessionObserver};
use safeguard_protocol::{Error, Headers, PRIMARY_PROVIDER_SCOPE_PREFIX, Result};
use safeguard_transport::{HttpResponse, RestClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use zeroize::Zeroizing;

const LOGIN_CONTROLLER: &str = "UserLogin/LoginController";
const TOKEN_ENDPOINT: &str = "oauth2/token";

#[derive(Deserialize)]
struct LoginControllerReply {
    #[serde(rename = "Providers")]
    providers: Vec<ProviderEntry>,
}

#[derive(Deserialize)]
struct ProviderEntry {
    #[serde(rename = "Id")]
    id: Option<String>,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    grant_type: &'static str,
    username: &'a str,
    password: &'a str,
    scope: &'a str,
}

#[derive(Serialize)]
struct ClientCredentialsGrant<'a> {
    grant_type: &'static str,
    scope: &'a str,
}

#[derive(Deserialize)]
struct GrantReply {
    access_token: Option<Zeroizing<String>>,
}

/// Pick the provider id matching `provider`.
///
/// A case-insensitive exact match wins; failing that, the first id that
/// contains `provider` (case-insensitive) is used.
pub fn match_provider_scope(provider: &str, candidates: &[String]) -> Option<String> {
    let wanted = provider.to_lowercase();

    candidates
        .iter()
        .find(|candidate| candidate.to_lowercase() == wanted)
        .or_else(|| {
            candidates
                .iter()
                .find(|candidate| candidate.to_lowercase().contains(&wanted))
        })
        .cloned()
}

/// Extract provider ids from a login controller reply
pub fn parse_provider_ids(body: &str) -> Result<Vec<String>> {
    let reply: LoginControllerReply = serde_json::from_str(body).map_err(|e| {
        Error::federation(format!(
            "Unable to parse identity provider scopes from RSTS: {e}"
        ))
    })?;
    Ok(reply
        .providers
        .into_iter()
        .filter_map(|provider| provider.id)
        .collect())
}

fn json_headers() -> Headers {
    Headers::new()
        .with("Content-Type", "application/json")
        .with("Accept", "application/json")
}

/// Client for the STS endpoints used during federation
#[derive(Debug, Clone)]
pub struct FederationClient {
    rsts: RestClient,
    observer: Arc<dyn SessionObserver>,
}

impl FederationClient {
    /// Create a client over the STS base URL
    pub fn new(rsts: RestClient, observer: Arc<dyn SessionObserver>) -> Self {
        Self { rsts, observer }
    }

    /// STS base URL
    pub fn base_url(&self) -> &str {
        self.rsts.base_url()
    }

    fn fail(&self, stage: FederationStage, error: Error) -> Error {
        self.observer.on_event(&SessionEvent::FederationFailed {
            stage,
            message: error.to_string(),
        });
        error
    }

    /// Fetch the ids of every identity provider the STS offers
    pub async fn fetch_provider_ids(&self) -> Result<Vec<String>> {
        let query = vec![
            ("response_type".to_string(), "token".to_string()),
            ("redirect_uri".to_string(), "urn:InstalledApplication".to_string()),
            ("loginRequestStep".to_string(), "1".to_string()),
        ];
        let headers = Headers::new().with("Content-type", "application/x-www-form-urlencoded");

        let response = match self
            .rsts
            .exec_post(LOGIN_CONTROLLER, &query, &headers, Some("RelayState="))
            .await
        {
            Ok(response) if response.is_success() => response,
            first => {
                debug!(
                    status = first.as_ref().ok().map(|r| r.status),
                    "Login controller POST failed, retrying with GET"
                );
                self.rsts
                    .exec_get(LOGIN_CONTROLLER, &query, &headers)
                    .await
                    .map_err(|_| {
                        self.fail(
                            FederationStage::ScopeResolution,
                            Error::federation(
                                "Unable to connect to RSTS to find identity provider scopes",
                            ),
                        )
                    })?
            }
        };

        if !response.is_success() {
            return Err(self.fail(
                FederationStage::ScopeResolution,
                Error::federation_response(
                    "Error requesting identity provider scopes from RSTS",
                    response.status,
                    response.body,
                ),
            ));
        }

        parse_provider_ids(&response.body)
            .map_err(|e| self.fail(FederationStage::ScopeResolution, e))
    }

    /// Resolve `provider` to a full `rsts:sts:primaryproviderid:<id>` scope
    pub async fn resolve_provider_scope(&self, provider: &str) -> Result<String> {
        let known = self.fetch_provider_ids().await?;

        let Some(id) = match_provider_scope(provider, &known) else {
            return Err(self.fail(
                FederationStage::ScopeResolution,
                Error::federation(format!(
                    "Unable to find scope matching '{}' in [{}]",
                    provider,
                    known.join(",")
                )),
            ));
        };

        let scope = format!("{PRIMARY_PROVIDER_SCOPE_PREFIX}{id}");
        self.observer.on_event(&SessionEvent::ScopeResolved {
            scope: scope.clone(),
        });
        Ok(scope)
    }

    /// Resource owner password grant
    pub async fn password_grant(
        &self,
        username: &str,
        password: &SecretBuffer,
        scope: &str,
    ) -> Result<SecretBuffer> {
        let body = serialize_grant(&PasswordGrant {
            grant_type: "password",
            username,
            password: password.expose_secret(),
            scope,
        })?;
        self.grant(
            &body,
            &format!("Error using password grant_type with scope {scope}"),
            scope,
        )
        .await
    }

    /// Client credentials grant; the transport presents the client certificate
    pub async fn client_credentials_grant(&self, scope: &str) -> Result<SecretBuffer> {
        let body = serialize_grant(&ClientCredentialsGrant {
            grant_type: "client_credentials",
            scope,
        })?;
        self.grant(
            &body,
            &format!("Error using client_credentials grant_type with scope {scope}"),
            scope,
        )
        .await
    }

    async fn grant(&self, body: &str, error_prefix: &str, scope: &str) -> Result<SecretBuffer> {
        let mut response = self
            .rsts
            .exec_post(TOKEN_ENDPOINT, &[], &json_headers(), Some(body))
            .await
            .map_err(|_| {
                self.fail(
                    FederationStage::TokenGrant,
                    Error::federation(format!(
                        "Unable to connect to RSTS service {}",
                        self.rsts.base_url()
                    )),
                )
            })?;

        if !response.is_success() {
            let error = Error::federation_response(
                error_prefix,
                response.status,
                std::mem::take(&mut response.body),
            );
            return Err(self.fail(FederationStage::TokenGrant, error));
        }

        extract_access_token(&mut response).ok_or_else(|| {
            self.fail(
                FederationStage::TokenGrant,
                Error::federation(format!(
                    "Error retrieving the access key for scope: {scope}"
                )),
            )
        })
    }
}

fn serialize_grant<T: Serialize>(grant: &T) -> Result<Zeroizing<String>> {
    serde_json::to_string(grant)
        .map(Zeroizing::new)
        .map_err(|e| Error::federation(format!("Unable to encode token request: {e}")))
}

/// Parse `access_token` out of a grant reply, wiping the reply
fn extract_access_token(response: &mut HttpResponse) -> Option<SecretBuffer> {
    let parsed = serde_json::from_str::<GrantReply>(&response.body);
    response.wipe();
    parsed
        .ok()
        .and_then(|reply| reply.access_token)
        .map(SecretBuffer::from)
}

#[cfg(test)]
#[path = "federation_tests.rs"]
mod federation_tests;
