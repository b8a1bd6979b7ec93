//! Identity provider resolution and STS failures seen through a full login

use crate::test_utils::*;
use assert_matches::assert_matches;
use safeguard_auth::{AnonymousCredential, PasswordCredential, SecretBuffer};
use safeguard_logging::{FederationStage, RecordingObserver, SessionEvent};
use safeguard_protocol::{Error, Method};
use safeguard_transport::mock::{Reply, ScriptedSender};
use std::sync::Arc;

fn grant_scope(sender: &ScriptedSender) -> Option<String> {
    let grant = sender
        .requests()
        .into_iter()
        .find(|r| r.url.ends_with("oauth2/token"))?;
    let body: serde_json::Value = serde_json::from_str(grant.body.as_deref()?).ok()?;
    body["scope"].as_str().map(str::to_string)
}

#[tokio::test]
async fn test_provider_names_resolve_to_scopes() -> anyhow::Result<()> {
    let cases = [
        ("ad", "rsts:sts:primaryproviderid:AD"),
        ("AD", "rsts:sts:primaryproviderid:AD"),
        ("rad", "rsts:sts:primaryproviderid:RADIUS"),
        ("local", "rsts:sts:primaryproviderid:local"),
        ("", "rsts:sts:primaryproviderid:local"),
    ];

    for (provider, expected) in cases {
        let sender = appliance();
        let observer = Arc::new(RecordingObserver::new());
        connector(&sender, &observer)
            .password(provider, "alice", SecretBuffer::from("pw"))
            .await?;
        assert_eq!(grant_scope(&sender).as_deref(), Some(expected), "{provider:?}");
    }
    Ok(())
}

#[tokio::test]
async fn test_unknown_provider_lists_known_ids() {
    let sender = appliance();
    let observer = Arc::new(RecordingObserver::new());

    let error = connector(&sender, &observer)
        .password("xyz", "alice", SecretBuffer::from("pw"))
        .await
        .unwrap_err();

    assert_matches!(error, Error::Federation { .. });
    assert_eq!(
        error.to_string(),
        "Unable to find scope matching 'xyz' in [AD,Local,RADIUS]"
    );
    assert_eq!(sender.count(Method::Post, "oauth2/token"), 0);
}

#[tokio::test]
async fn test_login_controller_get_fallback() -> anyhow::Result<()> {
    let sender = Arc::new(ScriptedSender::new());
    sender
        .respond(Method::Post, "UserLogin/LoginController", 404, "")
        .respond(Method::Get, "UserLogin/LoginController", 200, &providers_body())
        .respond(Method::Post, "oauth2/token", 200, r#"{"access_token":"sts"}"#)
        .respond(Method::Post, "Token/LoginResponse", 200, r#"{"UserToken":"u"}"#);
    let observer = Arc::new(RecordingObserver::new());

    let connection = connector(&sender, &observer)
        .password("radius", "bob", SecretBuffer::from("pw"))
        .await?;

    assert!(connection.authenticator().has_access_token());
    assert_eq!(sender.count(Method::Get, "UserLogin/LoginController"), 1);
    assert_eq!(
        grant_scope(&sender).as_deref(),
        Some("rsts:sts:primaryproviderid:RADIUS")
    );
    Ok(())
}

#[tokio::test]
async fn test_unreachable_sts() {
    let sender = Arc::new(ScriptedSender::new());
    sender.on(Method::Post, "UserLogin/LoginController", Reply::Refuse);
    let observer = Arc::new(RecordingObserver::new());

    let error = connector(&sender, &observer)
        .password("ad", "alice", SecretBuffer::from("pw"))
        .await
        .unwrap_err();

    assert!(error.is_unreachable());
    assert_eq!(
        error.to_string(),
        "Unable to connect to RSTS to find identity provider scopes"
    );
    assert!(observer.events().iter().any(|e| matches!(
        e,
        SessionEvent::FederationFailed {
            stage: FederationStage::ScopeResolution,
            ..
        }
    )));
}

#[tokio::test]
async fn test_rejected_password_grant() {
    let sender = Arc::new(ScriptedSender::new());
    sender.respond(Method::Post, "oauth2/token", 400, r#"{"error":"invalid_grant"}"#);
    let observer = Arc::new(RecordingObserver::new());

    let error = connector(&sender, &observer)
        .password("local", "alice", SecretBuffer::from("wrong"))
        .await
        .unwrap_err();

    assert_matches!(error, Error::Federation { status: Some(400), .. });
    assert_eq!(
        error.to_string(),
        r#"Error using password grant_type with scope rsts:sts:primaryproviderid:local, Error: 400 {"error":"invalid_grant"}"#
    );
    assert_eq!(sender.count(Method::Post, "Token/LoginResponse"), 0);
}

#[tokio::test]
async fn test_scope_survives_failed_grant() -> anyhow::Result<()> {
    let sender = Arc::new(ScriptedSender::new());
    sender
        .respond(Method::Post, "UserLogin/LoginController", 200, &providers_body())
        .respond(Method::Post, "oauth2/token", 401, r#"{"error":"invalid_grant"}"#)
        .respond(Method::Post, "oauth2/token", 200, r#"{"access_token":"sts"}"#)
        .respond(
            Method::Post,
            "Token/LoginResponse",
            200,
            &format!(r#"{{"UserToken":"{USER_TOKEN}"}}"#),
        );
    let observer = Arc::new(RecordingObserver::new());
    let credential = PasswordCredential::new("ad", "alice", SecretBuffer::from("pw"))?;
    let mut connection = session(Box::new(credential), &sender, &observer)?;

    let error = connection.refresh_access_token().await.unwrap_err();
    assert_eq!(error.status(), Some(401));
    assert!(!connection.authenticator().has_access_token());

    connection.refresh_access_token().await?;
    assert!(connection.authenticator().has_access_token());
    assert_eq!(sender.count(Method::Post, "UserLogin/LoginController"), 1);
    assert_eq!(sender.count(Method::Post, "oauth2/token"), 2);

    let scopes: Vec<_> = observer
        .events()
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::ScopeResolved { scope } => Some(scope),
            _ => None,
        })
        .collect();
    assert_eq!(scopes, ["rsts:sts:primaryproviderid:AD"]);
    Ok(())
}

#[tokio::test]
async fn test_anonymous_refresh_is_unsupported() -> anyhow::Result<()> {
    let sender = appliance();
    let observer = Arc::new(RecordingObserver::new());
    let mut connection = session(Box::new(AnonymousCredential), &sender, &observer)?;

    let error = connection.refresh_access_token().await.unwrap_err();
    assert_matches!(error, Error::Session { .. });
    assert!(error.to_string().contains("Unsupported operation"));
    assert!(sender.requests().is_empty());
    Ok(())
}
