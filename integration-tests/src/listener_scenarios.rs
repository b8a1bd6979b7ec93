//! Hand-off of sessions to an event listener implementation

use crate::test_utils::*;
use assert_matches::assert_matches;
use safeguard_auth::SecretBuffer;
use safeguard_client::{EventListenerFactory, EventListenerTarget, SessionConnection};
use safeguard_logging::RecordingObserver;
use safeguard_protocol::{Error, Result};
use safeguard_transport::ClientIdentity;
use std::sync::Arc;

/// Minimal listener standing in for the event subsystem
#[derive(Debug)]
enum StubListener {
    Plain(EventListenerTarget),
    Persistent(SessionConnection),
}

impl StubListener {
    /// Token the listener would present, logging in again if it can
    async fn current_token(&mut self) -> Result<Option<String>> {
        match self {
            StubListener::Plain(target) => Ok(target
                .access_token
                .as_ref()
                .map(|token| token.expose_secret().to_string())),
            StubListener::Persistent(connection) => {
                if !connection.authenticator().has_access_token() {
                    connection.refresh_access_token().await?;
                }
                Ok(connection
                    .authenticator()
                    .access_token()?
                    .map(|token| token.expose_secret().to_string()))
            }
        }
    }
}

struct StubFactory;

impl EventListenerFactory for StubFactory {
    type Listener = StubListener;

    fn event_listener(&self, target: EventListenerTarget) -> Result<StubListener> {
        Ok(StubListener::Plain(target))
    }

    fn persistent_event_listener(&self, connection: SessionConnection) -> Result<StubListener> {
        Ok(StubListener::Persistent(connection))
    }
}

#[tokio::test]
async fn test_plain_listener_keeps_its_token_copy() -> anyhow::Result<()> {
    let sender = appliance();
    let observer = Arc::new(RecordingObserver::new());
    let mut connection = connector(&sender, &observer)
        .password("local", "admin", SecretBuffer::from("pw"))
        .await?;

    let mut listener = connection.event_listener(&StubFactory)?;
    assert_matches!(&listener, StubListener::Plain(target)
        if target.event_url == "https://sg.test/service/event" && !target.ignore_ssl);

    connection.log_out().await?;
    assert_eq!(listener.current_token().await?.as_deref(), Some(USER_TOKEN));
    Ok(())
}

#[tokio::test]
async fn test_persistent_listener_logs_in_again() -> anyhow::Result<()> {
    let sender = appliance();
    let observer = Arc::new(RecordingObserver::new());
    let identity = ClientIdentity::from_pkcs12_der(vec![0x30, 0x82], "pfx");
    let mut connection = connector(&sender, &observer).certificate(identity).await?;

    let mut listener = connection.persistent_event_listener(&StubFactory)?;
    connection.log_out().await?;
    connection.dispose();

    if let StubListener::Persistent(owned) = &mut listener {
        owned.log_out().await?;
    }
    assert_eq!(listener.current_token().await?.as_deref(), Some(USER_TOKEN));
    assert_eq!(sender.count(safeguard_protocol::Method::Post, "oauth2/token"), 2);
    Ok(())
}

#[tokio::test]
async fn test_persistent_listener_needs_reusable_credential() -> anyhow::Result<()> {
    let sender = appliance();
    let observer = Arc::new(RecordingObserver::new());
    let connection = connector(&sender, &observer)
        .sts_token(SecretBuffer::from(STS_TOKEN))
        .await?;

    let error = connection.persistent_event_listener(&StubFactory).unwrap_err();
    assert_eq!(
        error.to_string(),
        "Unable to create persistent event listener from AccessToken"
    );

    let anonymous = connector(&sender, &observer).anonymous()?;
    assert_matches!(
        anonymous.persistent_event_listener(&StubFactory),
        Err(Error::Session { .. })
    );
    assert_matches!(
        anonymous.event_listener(&StubFactory)?,
        StubListener::Plain(EventListenerTarget { access_token: None, .. })
    );
    Ok(())
}
