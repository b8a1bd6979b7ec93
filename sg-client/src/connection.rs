//! Authenticated session against the Safeguard resource API

use crate::events::{EventListenerFactory, EventListenerTarget};
use safeguard_auth::{Authenticator, bearer_headers};
use safeguard_logging::{ErrorClassification, SessionEvent, SessionObserver, get_sanitizer};
use safeguard_protocol::{Error, FullResponse, Headers, Method, Result, Service};
use safeguard_transport::{HttpResponse, RestClient, TransportError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One authenticated session.
///
/// Owns an [`Authenticator`] and a REST client per backend service. Every
/// call checks disposal and token presence before touching the network, so
/// a disposed or logged-out session fails without I/O.
#[derive(Debug, Clone)]
pub struct SessionConnection {
    authenticator: Authenticator,
    core: RestClient,
    appliance: RestClient,
    notification: RestClient,
    observer: Arc<dyn SessionObserver>,
    disposed: bool,
}

impl SessionConnection {
    /// Wrap an authenticator. Backend clients share its sender and observer.
    pub fn new(authenticator: Authenticator) -> Self {
        let config = authenticator.config();
        let sender = authenticator.sender();
        let core = RestClient::new(config.service_url(Service::Core), Arc::clone(&sender));
        let appliance =
            RestClient::new(config.service_url(Service::Appliance), Arc::clone(&sender));
        let notification = RestClient::new(config.service_url(Service::Notification), sender);
        let observer = authenticator.observer();

        Self {
            authenticator,
            core,
            appliance,
            notification,
            observer,
            disposed: false,
        }
    }

    fn ensure_not_disposed(&self) -> Result<()> {
        if self.disposed {
            return Err(Error::disposed("SessionConnection"));
        }
        Ok(())
    }

    /// The authenticator behind this session
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// Whether [`dispose`](SessionConnection::dispose) has been called
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn client_for(&self, service: Service) -> Result<&RestClient> {
        match service {
            Service::Core => Ok(&self.core),
            Service::Appliance => Ok(&self.appliance),
            Service::Notification => Ok(&self.notification),
            Service::A2A => Err(Error::session(
                "You must call the A2A service using the A2A specific method, Error: Unsupported operation",
            )),
        }
    }

    fn request_headers(&self, caller: &Headers) -> Result<Headers> {
        let mut headers = if self.authenticator.is_anonymous() {
            Headers::new()
        } else {
            match self.authenticator.access_token()? {
                Some(token) => bearer_headers(token),
                None => {
                    return Err(Error::session(
                        "Access token is missing due to log out, you must refresh the access token to invoke a method",
                    ));
                }
            }
        };

        headers.extend(caller);
        if !headers.contains("Accept") {
            headers.insert("Accept", "application/json");
        }
        Ok(headers)
    }

    async fn dispatch(
        client: &RestClient,
        method: Method,
        relative_url: &str,
        body: Option<&str>,
        query: &[(String, String)],
        headers: &Headers,
    ) -> std::result::Result<HttpResponse, TransportError> {
        if body.is_some() && !method.carries_body() {
            debug!(method = %method, "Dropping request body, verb does not send one");
        }
        let body = body.filter(|_| method.carries_body());

        match method {
            Method::Get => client.exec_get(relative_url, query, headers).await,
            Method::Post => client.exec_post(relative_url, query, headers, body).await,
            Method::Put => client.exec_put(relative_url, query, headers, body).await,
            Method::Delete => client.exec_delete(relative_url, query, headers).await,
        }
    }

    /// Call the resource API and return status, headers and body.
    ///
    /// Callers may add headers; theirs win over the defaults. `Accept`
    /// defaults to `application/json`.
    pub async fn invoke_full(
        &self,
        service: Service,
        method: Method,
        relative_url: &str,
        body: Option<&str>,
        query: &[(String, String)],
        headers: &Headers,
    ) -> Result<FullResponse> {
        self.ensure_not_disposed()?;
        if relative_url.trim().is_empty() {
            return Err(Error::argument(
                "Parameter may not be null or empty: relative_url",
            ));
        }
        let client = self.client_for(service)?;
        let mut headers = self.request_headers(headers)?;

        let url = client.absolute_url(relative_url);
        self.observer.on_event(&SessionEvent::RequestStarted {
            method: method.to_string(),
            url: url.clone(),
            query_keys: query.iter().map(|(key, _)| key.clone()).collect(),
            header_names: headers.names(),
        });

        let response = Self::dispatch(client, method, relative_url, body, query, &headers).await;
        headers.wipe();

        let response = response.map_err(|e| {
            debug!(
                error = %get_sanitizer().sanitize_error(&e),
                service = %service,
                "Resource API request failed"
            );
            Error::session(format!(
                "Unable to connect to web service {}",
                client.base_url()
            ))
        })?;

        self.observer.on_event(&SessionEvent::ResponseReceived {
            method: method.to_string(),
            url,
            status: response.status,
            header_count: response.headers.len(),
            body_size: response.body.len(),
        });

        if !response.is_success() {
            let error = Error::session_response(
                "Error returned from Safeguard API",
                response.status,
                response.body,
            );
            debug!(
                status = response.status,
                error_type = error.error_type(),
                retryable = error.is_retryable(),
                auth = error.is_auth_error(),
                "Safeguard API returned an error"
            );
            return Err(error);
        }
        Ok(response.into())
    }

    /// Call the resource API and return only the body
    pub async fn invoke(
        &self,
        service: Service,
        method: Method,
        relative_url: &str,
        body: Option<&str>,
        query: &[(String, String)],
        headers: &Headers,
    ) -> Result<String> {
        self.invoke_full(service, method, relative_url, body, query, headers)
            .await
            .map(|response| response.body)
    }

    /// Call the resource API asking for CSV
    pub async fn invoke_csv(
        &self,
        service: Service,
        method: Method,
        relative_url: &str,
        body: Option<&str>,
        query: &[(String, String)],
        headers: &Headers,
    ) -> Result<String> {
        let mut headers = headers.clone();
        headers.insert("Accept", "text/csv");
        self.invoke(service, method, relative_url, body, query, &headers)
            .await
    }

    /// End the server-side session and drop the token.
    ///
    /// The logout call is best effort; whatever it returns, the local token
    /// is cleared.
    pub async fn log_out(&mut self) -> Result<()> {
        self.ensure_not_disposed()?;
        let Some(token) = self.authenticator.access_token()? else {
            return Ok(());
        };

        let mut headers = bearer_headers(token).with("Accept", "application/json");
        let response = self
            .core
            .exec_post("Token/Logout", &[], &headers, None)
            .await;
        headers.wipe();

        let failure = match response {
            Ok(response) if response.is_success() => None,
            Ok(response) => Some(format!("Token/Logout returned {}", response.status)),
            Err(e) => Some(e.to_string()),
        };
        if let Some(message) = failure {
            warn!(authenticator = self.authenticator.id(), "Logout request failed");
            self.observer.on_event(&SessionEvent::LogoutFailed { message });
        }

        self.authenticator.clear_access_token();
        info!(authenticator = self.authenticator.id(), "Logged out");
        Ok(())
    }

    /// Obtain a new access token
    pub async fn refresh_access_token(&mut self) -> Result<()> {
        self.ensure_not_disposed()?;
        self.authenticator.refresh_access_token().await?;
        info!(authenticator = self.authenticator.id(), "Access token refreshed");
        Ok(())
    }

    /// Minutes the current access token stays valid
    pub async fn access_token_lifetime_remaining(&self) -> Result<u32> {
        self.ensure_not_disposed()?;
        let remaining = self.authenticator.access_token_lifetime_remaining().await?;
        debug!(remaining, "Access token lifetime checked");
        Ok(remaining)
    }

    /// Listener bound to the current token
    pub fn event_listener<F: EventListenerFactory>(&self, factory: &F) -> Result<F::Listener> {
        self.ensure_not_disposed()?;
        let target = EventListenerTarget {
            event_url: self.authenticator.config().event_url(),
            access_token: self.authenticator.access_token()?.cloned(),
            ignore_ssl: self.authenticator.ignore_ssl(),
        };
        factory.event_listener(target)
    }

    /// Listener owning its own copy of this session.
    ///
    /// Only credentials that can log in again without a user (password,
    /// certificate) qualify.
    pub fn persistent_event_listener<F: EventListenerFactory>(
        &self,
        factory: &F,
    ) -> Result<F::Listener> {
        self.ensure_not_disposed()?;
        if !self.authenticator.supports_persistent_listener() {
            return Err(Error::session(format!(
                "Unable to create persistent event listener from {}",
                self.authenticator.id()
            )));
        }
        factory.persistent_event_listener(self.clone())
    }

    /// Dispose the authenticator and refuse further use. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.authenticator.dispose();
        self.disposed = true;
        self.observer.on_event(&SessionEvent::Disposed {
            object: "SessionConnection".to_string(),
        });
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod connection_tests;
