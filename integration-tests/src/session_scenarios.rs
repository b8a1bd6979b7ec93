//! Resource API calls, logout and disposal on a live session

use crate::test_utils::*;
use assert_matches::assert_matches;
use safeguard_auth::SecretBuffer;
use safeguard_client::{SessionConnection, connect_anonymous};
use safeguard_logging::{RecordingObserver, SessionEvent};
use safeguard_protocol::{ConnectionConfig, Error, Headers, Method, Service};
use safeguard_transport::mock::{Reply, ScriptedSender};
use std::sync::Arc;

async fn logged_in(
    sender: &Arc<ScriptedSender>,
) -> anyhow::Result<(SessionConnection, Arc<RecordingObserver>)> {
    let observer = Arc::new(RecordingObserver::new());
    let connection = connector(sender, &observer)
        .password("local", "admin", SecretBuffer::from("Admin123"))
        .await?;
    Ok((connection, observer))
}

#[tokio::test]
async fn test_complete_session() -> anyhow::Result<()> {
    let sender = appliance();
    sender
        .respond(Method::Get, "core/v4/Me", 200, r#"{"Id":1,"Name":"admin"}"#)
        .respond(Method::Post, "core/v4/Assets", 201, r#"{"Id":42}"#)
        .respond(Method::Get, "appliance/v4/ApplianceStatus", 200, "Online")
        .respond(Method::Post, "Token/Logout", 200, "");
    let (mut connection, observer) = logged_in(&sender).await?;

    let me: serde_json::Value = serde_json::from_str(
        &connection
            .invoke(Service::Core, Method::Get, "Me", None, &[], &Headers::new())
            .await?,
    )?;
    assert_eq!(me["Name"], "admin");

    let created = connection
        .invoke_full(
            Service::Core,
            Method::Post,
            "Assets",
            Some(r#"{"Name":"web01"}"#),
            &[],
            &Headers::new().with("Content-Type", "application/json"),
        )
        .await?;
    assert_eq!(created.status, 201);

    let status = connection
        .invoke(Service::Appliance, Method::Get, "ApplianceStatus", None, &[], &Headers::new())
        .await?;
    assert_eq!(status, "Online");

    connection.log_out().await?;
    assert!(!connection.authenticator().has_access_token());

    let error = connection
        .invoke(Service::Core, Method::Get, "Me", None, &[], &Headers::new())
        .await
        .unwrap_err();
    assert_matches!(error, Error::Session { .. });
    assert!(error.to_string().starts_with("Access token is missing"));

    // every outgoing call after login carried the bearer token
    for request in sender
        .requests()
        .iter()
        .filter(|r| r.url.contains("/service/"))
        .filter(|r| !r.url.ends_with("Token/LoginResponse"))
    {
        assert_eq!(
            request.header("Authorization"),
            Some(format!("Bearer {USER_TOKEN}").as_str()),
            "{}",
            request.url
        );
    }

    let rendered = format!("{:?}", observer.events());
    assert!(!rendered.contains(USER_TOKEN));
    assert!(!rendered.contains("Admin123"));
    Ok(())
}

#[tokio::test]
async fn test_a2a_is_always_rejected() -> anyhow::Result<()> {
    let sender = appliance();
    let (connection, _) = logged_in(&sender).await?;
    let before = sender.requests().len();

    let error = connection
        .invoke(Service::A2A, Method::Get, "Credentials", None, &[], &Headers::new())
        .await
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "You must call the A2A service using the A2A specific method, Error: Unsupported operation"
    );

    let anonymous = connect_anonymous(test_config())?;
    assert_matches!(
        anonymous
            .invoke(Service::A2A, Method::Post, "Credentials", None, &[], &Headers::new())
            .await,
        Err(Error::Session { .. })
    );
    assert_eq!(sender.requests().len(), before);
    Ok(())
}

#[tokio::test]
async fn test_empty_path_fails_before_transport() -> anyhow::Result<()> {
    let sender = appliance();
    let (connection, _) = logged_in(&sender).await?;
    let before = sender.requests().len();

    let error = connection
        .invoke_full(Service::Core, Method::Get, "", None, &[], &Headers::new())
        .await
        .unwrap_err();
    assert_matches!(error, Error::Argument(_));
    assert_eq!(sender.requests().len(), before);
    Ok(())
}

#[tokio::test]
async fn test_logout_with_failing_transport_clears_token() -> anyhow::Result<()> {
    let sender = appliance();
    sender.on(Method::Post, "Token/Logout", Reply::Refuse);
    let (mut connection, observer) = logged_in(&sender).await?;

    connection.log_out().await?;

    assert!(!connection.authenticator().has_access_token());
    assert_eq!(sender.count(Method::Post, "Token/Logout"), 1);
    assert!(
        observer
            .events()
            .iter()
            .any(|e| matches!(e, SessionEvent::LogoutFailed { .. }))
    );
    assert_eq!(connection.access_token_lifetime_remaining().await?, 0);

    // logging out again has nothing to send
    connection.log_out().await?;
    assert_eq!(sender.count(Method::Post, "Token/Logout"), 1);
    Ok(())
}

#[tokio::test]
async fn test_server_errors_carry_status_and_body() -> anyhow::Result<()> {
    let sender = appliance();
    sender.respond(Method::Delete, "Assets/42", 403, "Forbidden");
    let (connection, _) = logged_in(&sender).await?;

    let error = connection
        .invoke(Service::Core, Method::Delete, "Assets/42", None, &[], &Headers::new())
        .await
        .unwrap_err();
    assert_eq!(error.status(), Some(403));
    assert_eq!(error.body(), Some("Forbidden"));
    assert!(!error.is_unreachable());
    Ok(())
}

#[tokio::test]
async fn test_connection_clone_is_independent() -> anyhow::Result<()> {
    let sender = appliance();
    sender.respond(Method::Get, "Me", 200, "{}");
    let (mut original, _) = logged_in(&sender).await?;
    let mut clone = original.clone();

    original.log_out().await?;
    assert!(!original.authenticator().has_access_token());
    assert!(clone.authenticator().has_access_token());
    clone
        .invoke(Service::Core, Method::Get, "Me", None, &[], &Headers::new())
        .await?;

    clone.dispose();
    assert_matches!(
        clone
            .invoke(Service::Core, Method::Get, "Me", None, &[], &Headers::new())
            .await,
        Err(Error::Disposed { .. })
    );

    original.refresh_access_token().await?;
    original
        .invoke(Service::Core, Method::Get, "Me", None, &[], &Headers::new())
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_settings_from_toml() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("safeguard.toml");
    std::fs::write(
        &path,
        "network_address = \"sg.test\"\napi_version = 3\nignore_ssl = true\n",
    )?;
    let config = ConnectionConfig::from_toml_file(&path)?;

    let sender = Arc::new(ScriptedSender::new());
    sender.respond(Method::Get, "core/v3/Status", 200, "ok");
    let observer = Arc::new(RecordingObserver::new());
    let connection = safeguard_client::Connector::new(config)
        .with_sender(sender.clone())
        .with_observer(observer)
        .anonymous()?;

    assert!(connection.authenticator().ignore_ssl());
    connection
        .invoke(Service::Core, Method::Get, "Status", None, &[], &Headers::new())
        .await?;
    assert_eq!(
        sender.requests()[0].url,
        "https://sg.test/service/core/v3/Status"
    );
    Ok(())
}
