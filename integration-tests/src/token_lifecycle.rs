//! Token lifecycle across credential variants

use crate::test_utils::*;
use safeguard_auth::{
    CertificateCredential, FederationCredential, PasswordCredential, SecretBuffer,
    StsTokenCredential, TokenStore,
};
use safeguard_logging::{RecordingObserver, SessionEvent};
use safeguard_protocol::Method;
use safeguard_transport::mock::Reply;
use safeguard_transport::{ClientIdentity, HttpResponse};
use std::sync::Arc;

fn credentialed_variants() -> anyhow::Result<Vec<Box<dyn FederationCredential>>> {
    Ok(vec![
        Box::new(PasswordCredential::new(
            "local",
            "admin",
            SecretBuffer::from("Admin123"),
        )?),
        Box::new(PasswordCredential::new(
            "ad",
            "CORP\\alice",
            SecretBuffer::from("Winter2024"),
        )?),
        Box::new(CertificateCredential::new(ClientIdentity::from_pkcs12_der(
            vec![0x30, 0x82, 0x01],
            "pfx-pass",
        ))),
        Box::new(StsTokenCredential::new(SecretBuffer::from(STS_TOKEN))?),
    ])
}

#[tokio::test]
async fn test_every_variant_obtains_a_token() -> anyhow::Result<()> {
    for credential in credentialed_variants()? {
        let sender = appliance();
        let observer = Arc::new(RecordingObserver::new());
        let mut auth = authenticator(credential, &sender, &observer)?;

        assert!(!auth.has_access_token());
        assert!(auth.access_token()?.is_none());

        auth.refresh_access_token().await?;

        let token = auth
            .access_token()?
            .map(|token| token.expose_secret().to_string());
        assert_eq!(token.as_deref(), Some(USER_TOKEN), "{}", auth.id());
        assert_eq!(sender.count(Method::Post, "Token/LoginResponse"), 1);
        assert!(observer.events().contains(&SessionEvent::TokenObtained {
            authenticator: auth.id().to_string()
        }));
    }
    Ok(())
}

#[tokio::test]
async fn test_sts_token_variant_skips_the_sts() -> anyhow::Result<()> {
    let sender = appliance();
    let observer = Arc::new(RecordingObserver::new());
    let credential = StsTokenCredential::new(SecretBuffer::from("pre-issued"))?;
    let mut auth = authenticator(Box::new(credential), &sender, &observer)?;

    auth.refresh_access_token().await?;

    assert_eq!(sender.count(Method::Post, "oauth2/token"), 0);
    assert_eq!(sender.count(Method::Post, "UserLogin/LoginController"), 0);
    let exchange = sender
        .requests()
        .into_iter()
        .find(|r| r.url.ends_with("Token/LoginResponse"))
        .ok_or_else(|| anyhow::anyhow!("no token exchange"))?;
    let body: serde_json::Value =
        serde_json::from_str(exchange.body.as_deref().unwrap_or_default())?;
    assert_eq!(body["StsAccessToken"], "pre-issued");
    Ok(())
}

#[tokio::test]
async fn test_refresh_replaces_the_token() -> anyhow::Result<()> {
    let sender = appliance();
    sender.respond(
        Method::Post,
        "Token/LoginResponse",
        200,
        r#"{"UserToken":"user-token-0002"}"#,
    );
    let observer = Arc::new(RecordingObserver::new());
    let credential = PasswordCredential::new("", "admin", SecretBuffer::from("pw"))?;
    let mut auth = authenticator(Box::new(credential), &sender, &observer)?;

    auth.refresh_access_token().await?;
    assert_eq!(
        auth.access_token()?.map(SecretBuffer::expose_secret),
        Some(USER_TOKEN)
    );
    auth.refresh_access_token().await?;
    assert_eq!(
        auth.access_token()?.map(SecretBuffer::expose_secret),
        Some("user-token-0002")
    );
    Ok(())
}

#[tokio::test]
async fn test_clear_wipes_the_token() -> anyhow::Result<()> {
    let sender = appliance();
    let observer = Arc::new(RecordingObserver::new());
    let credential = PasswordCredential::new("local", "admin", SecretBuffer::from("pw"))?;
    let mut auth = authenticator(Box::new(credential), &sender, &observer)?;
    auth.refresh_access_token().await?;

    auth.clear_access_token();

    assert!(!auth.has_access_token());
    assert!(auth.access_token()?.is_none());
    Ok(())
}

#[test]
fn test_wiped_buffer_exposes_nothing() -> anyhow::Result<()> {
    let mut store = TokenStore::new();
    store.set(SecretBuffer::from(USER_TOKEN))?;
    let copy = store.duplicate();

    store.clear();
    assert!(!store.has());
    assert!(store.get()?.is_none());
    assert_eq!(
        copy.get()?.map(SecretBuffer::expose_secret),
        Some(USER_TOKEN)
    );

    let mut buffer = SecretBuffer::from(USER_TOKEN);
    buffer.wipe();
    assert!(buffer.is_empty());
    assert_eq!(buffer.expose_secret(), "");
    Ok(())
}

#[tokio::test]
async fn test_lifetime_check() -> anyhow::Result<()> {
    let sender = appliance();
    let observer = Arc::new(RecordingObserver::new());
    let credential = PasswordCredential::new("local", "admin", SecretBuffer::from("pw"))?;
    let mut auth = authenticator(Box::new(credential), &sender, &observer)?;

    assert_eq!(auth.access_token_lifetime_remaining().await?, 0);
    assert_eq!(sender.count(Method::Get, "LoginMessage"), 0);

    auth.refresh_access_token().await?;
    sender.respond(Method::Get, "LoginMessage", 200, "");
    sender.on(
        Method::Get,
        "LoginMessage",
        Reply::Respond(HttpResponse::new(200, "").with_header("X-TokenLifetimeRemaining", "42")),
    );

    // header missing first, then present
    assert_eq!(auth.access_token_lifetime_remaining().await?, 10);
    assert_eq!(auth.access_token_lifetime_remaining().await?, 42);
    Ok(())
}

#[tokio::test]
async fn test_authenticator_clone_is_independent() -> anyhow::Result<()> {
    let sender = appliance();
    let observer = Arc::new(RecordingObserver::new());
    let credential = PasswordCredential::new("ad", "alice", SecretBuffer::from("pw"))?;
    let mut original = authenticator(Box::new(credential), &sender, &observer)?;
    original.refresh_access_token().await?;

    let mut clone = original.clone();
    clone.clear_access_token();
    assert!(original.has_access_token());

    original.dispose();
    assert!(original.is_disposed());
    assert!(!clone.is_disposed());

    // the clone re-resolves the identity provider scope on its own
    clone.refresh_access_token().await?;
    assert!(clone.has_access_token());
    assert_eq!(sender.count(Method::Post, "UserLogin/LoginController"), 2);
    Ok(())
}
