//! Integration tests for the Safeguard session client
//!
//! These scenarios drive whole sessions (credential, federation, token
//! exchange, resource calls, logout) across the crates, with a scripted
//! transport standing in for the appliance.

#![allow(clippy::uninlined_format_args)] // Allow traditional format strings in tests

#[cfg(test)]
mod federation_scenarios;
#[cfg(test)]
mod listener_scenarios;
#[cfg(test)]
mod session_scenarios;
#[cfg(test)]
mod token_lifecycle;

/// Common test utilities for integration tests
pub mod test_utils {
    use safeguard_auth::{Authenticator, FederationCredential};
    use safeguard_client::{Connector, SessionConnection};
    use safeguard_logging::RecordingObserver;
    use safeguard_protocol::{ConnectionConfig, Method};
    use safeguard_transport::mock::ScriptedSender;
    use std::sync::Arc;

    /// Appliance address used by every scenario
    pub const APPLIANCE: &str = "sg.test";

    /// Access token returned by the scripted token exchange
    pub const USER_TOKEN: &str = "user-token-0001";

    /// Token returned by the scripted STS grant
    pub const STS_TOKEN: &str = "sts-token-0001";

    /// Identity providers known to the scripted STS
    pub fn providers_body() -> String {
        serde_json::json!({
            "Providers": [
                {"Id": "AD", "DisplayName": "Active Directory"},
                {"Id": "Local", "DisplayName": "Local"},
                {"Id": "RADIUS", "DisplayName": "Radius"}
            ]
        })
        .to_string()
    }

    /// Connection settings for the scripted appliance
    pub fn test_config() -> ConnectionConfig {
        ConnectionConfig::new(APPLIANCE)
    }

    /// Install the log subscriber once per test binary
    pub fn init_test_logging() {
        safeguard_logging::try_init_logging();
    }

    /// An appliance that accepts every login
    pub fn appliance() -> Arc<ScriptedSender> {
        init_test_logging();
        let sender = Arc::new(ScriptedSender::new());
        sender
            .respond(
                Method::Post,
                "UserLogin/LoginController",
                200,
                &providers_body(),
            )
            .respond(
                Method::Post,
                "oauth2/token",
                200,
                &serde_json::json!({"access_token": STS_TOKEN, "token_type": "Bearer"})
                    .to_string(),
            )
            .respond(
                Method::Post,
                "Token/LoginResponse",
                200,
                &serde_json::json!({"UserToken": USER_TOKEN, "Status": "Success"}).to_string(),
            );
        sender
    }

    /// Connector wired to `sender` and `observer`
    pub fn connector(
        sender: &Arc<ScriptedSender>,
        observer: &Arc<RecordingObserver>,
    ) -> Connector {
        Connector::new(test_config())
            .with_sender(sender.clone())
            .with_observer(observer.clone())
    }

    /// Authenticator for `credential`, not yet logged in
    pub fn authenticator(
        credential: Box<dyn FederationCredential>,
        sender: &Arc<ScriptedSender>,
        observer: &Arc<RecordingObserver>,
    ) -> anyhow::Result<Authenticator> {
        Ok(Authenticator::with_observer(
            test_config(),
            credential,
            sender.clone(),
            observer.clone(),
        )?)
    }

    /// Session for `credential`, not yet logged in
    pub fn session(
        credential: Box<dyn FederationCredential>,
        sender: &Arc<ScriptedSender>,
        observer: &Arc<RecordingObserver>,
    ) -> anyhow::Result<SessionConnection> {
        Ok(SessionConnection::new(authenticator(
            credential, sender, observer,
        )?))
    }
}
