//! Authority lifecycle: issue, verify, authorize, refresh, logout.

use std::sync::Arc;
use std::time::Duration;

use gwt::core::RbacError;
use gwt::store::{MemoryStore, SignatureStore};
use gwt::token::{ManualClock, TOKEN_EXPIRE_TIME};
use gwt::vhash::{CardCodec, CardConfig};
use gwt::{
    AuthError, Authority, AuthorityConfig, DefaultRole, Registry, Resource, ResourceType,
    Resources, Spice, TokenError, UserId,
};
use image::{Rgba, RgbaImage};

const NOW: i64 = 1_736_870_400_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn spice() -> Spice {
    Spice::new(b"authority-salt".to_vec(), b"authority-pepper".to_vec())
}

fn authority(clock: &Arc<ManualClock>) -> Authority<MemoryStore> {
    init_tracing();
    Authority::new(
        AuthorityConfig::new("Authentity"),
        spice(),
        Arc::new(Registry::standard()),
        MemoryStore::new(),
    )
    .with_clock(clock.clone())
}

fn alice() -> Resources {
    Resources::new(UserId::from_bytes([0xa1; 16])).with_resource(Resource::new(
        ResourceType::DATA_MANAGEMENT,
        [DefaultRole::User.role()],
    ))
}

#[tokio::test]
async fn test_issue_and_verify() {
    let clock = Arc::new(ManualClock::new(NOW));
    let authority = authority(&clock);

    let token = authority.issue("alice", alice()).await.unwrap();
    let envelope = authority.verify(&token.token).await.unwrap();

    assert_eq!(envelope.header.issuer, "Authentity");
    assert_eq!(envelope.header.recipient, "alice");
    assert_eq!(envelope.header.expires, NOW + 15 * 60 * 1000);
    assert_eq!(envelope.body, alice());

    let record = authority.store().get_signature("alice").await.unwrap().unwrap();
    assert_eq!(record.signature, token.signature);
    assert_eq!(record.issued_at, NOW);
}

#[tokio::test]
async fn test_authorize() {
    let clock = Arc::new(ManualClock::new(NOW));
    let authority = authority(&clock);
    let token = authority.issue("alice", alice()).await.unwrap();

    authority
        .authorize(
            &token.token,
            &ResourceType::DATA_MANAGEMENT,
            &[DefaultRole::User.role()],
        )
        .await
        .unwrap();

    let err = authority
        .authorize(
            &token.token,
            &ResourceType::DATA_MANAGEMENT,
            &[DefaultRole::Admin.role()],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccessDenied { .. }));
    assert_eq!(err.status_hint(), 403);

    let err = authority
        .authorize(&token.token, &ResourceType::NETWORK, &[DefaultRole::User.role()])
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccessDenied { .. }));
}

#[tokio::test]
async fn test_expired_token() {
    let clock = Arc::new(ManualClock::new(NOW));
    let authority = authority(&clock);
    let token = authority.issue("alice", alice()).await.unwrap();

    clock.advance(TOKEN_EXPIRE_TIME * 2);
    let err = authority.verify(&token.token).await.unwrap_err();
    assert!(matches!(err, AuthError::Token(TokenError::ExpiredToken)));
    assert_eq!(err.status_hint(), 401);
}

#[tokio::test]
async fn test_reissue_supersedes() {
    let clock = Arc::new(ManualClock::new(NOW));
    let authority = authority(&clock);

    let first = authority.issue("alice", alice()).await.unwrap();
    clock.advance(Duration::from_secs(1));
    let second = authority.issue("alice", alice()).await.unwrap();
    assert_ne!(first.token, second.token);

    assert!(matches!(
        authority.verify(&first.token).await,
        Err(AuthError::Revoked(_))
    ));
    authority.verify(&second.token).await.unwrap();
}

#[tokio::test]
async fn test_refresh() {
    let clock = Arc::new(ManualClock::new(NOW));
    let authority = authority(&clock);
    let token = authority.issue("alice", alice()).await.unwrap();

    clock.advance(Duration::from_secs(10 * 60));
    let refreshed = authority.refresh(&token.token).await.unwrap();

    let envelope = authority.verify(&refreshed.token).await.unwrap();
    assert_eq!(envelope.header.expires, NOW + 25 * 60 * 1000);
    assert_eq!(envelope.body, alice());
    assert!(matches!(
        authority.verify(&token.token).await,
        Err(AuthError::Revoked(_))
    ));
}

#[tokio::test]
async fn test_logout() {
    let clock = Arc::new(ManualClock::new(NOW));
    let authority = authority(&clock);
    let token = authority.issue("alice", alice()).await.unwrap();

    authority.logout(&token.token).await.unwrap();
    assert!(authority.store().is_empty().await);
    assert!(matches!(
        authority.verify(&token.token).await,
        Err(AuthError::Revoked(_))
    ));
    assert!(matches!(
        authority.logout(&token.token).await,
        Err(AuthError::Revoked(_))
    ));
}

#[tokio::test]
async fn test_untrusted_issuer() {
    let clock = Arc::new(ManualClock::new(NOW));
    let foreign = Authority::new(
        AuthorityConfig::new("Elsewhere"),
        spice(),
        Arc::new(Registry::standard()),
        MemoryStore::new(),
    )
    .with_clock(clock.clone());
    let token = foreign.issue("alice", alice()).await.unwrap();

    let ours = authority(&clock);
    let err = ours.verify(&token.token).await.unwrap_err();
    assert!(matches!(err, AuthError::UnknownIssuer(ref i) if i == "Elsewhere"));

    let trusting = Authority::new(
        AuthorityConfig {
            trusted_issuers: vec!["Elsewhere".into()],
            ..AuthorityConfig::new("Authentity")
        },
        spice(),
        Arc::new(Registry::standard()),
        MemoryStore::new(),
    )
    .with_clock(clock.clone());
    // Trusted, but this store never saw the token.
    assert!(matches!(
        trusting.verify(&token.token).await,
        Err(AuthError::Revoked(_))
    ));
}

#[tokio::test]
async fn test_foreign_spice() {
    let clock = Arc::new(ManualClock::new(NOW));
    let authority = authority(&clock);
    let other = Authority::new(
        AuthorityConfig::new("Authentity"),
        Spice::generate(),
        Arc::new(Registry::standard()),
        MemoryStore::new(),
    );
    let token = other.issue("alice", alice()).await.unwrap();
    let err = authority.verify(&token.token).await.unwrap_err();
    assert!(matches!(err, AuthError::Token(TokenError::InvalidSignature)));
}

#[tokio::test]
async fn test_issue_unregistered_type() {
    let clock = Arc::new(ManualClock::new(NOW));
    let authority = authority(&clock);
    let resources = Resources::new(UserId::from_bytes([0xb2; 16])).with_resource(Resource::new(
        ResourceType::new("not_registered"),
        [DefaultRole::Owner.role()],
    ));

    let err = authority.issue("bob", resources).await.unwrap_err();
    assert!(matches!(
        err,
        AuthError::Rbac(RbacError::UnregisteredType { .. })
    ));
    assert_eq!(err.status_hint(), 500);
    assert!(authority.store().is_empty().await);
}

#[tokio::test]
async fn test_malformed_token() {
    let clock = Arc::new(ManualClock::new(NOW));
    let err = authority(&clock).verify("not-a-token").await.unwrap_err();
    assert!(matches!(err, AuthError::Token(TokenError::MalformedToken(_))));
    assert_eq!(err.status_hint(), 400);
}

#[tokio::test]
async fn test_cards() {
    let clock = Arc::new(ManualClock::new(NOW));
    let cards = CardCodec::new(
        CardConfig::default(),
        RgbaImage::from_pixel(144, 144, Rgba([250, 250, 250, 255])),
        None,
    )
    .unwrap();
    let authority = authority(&clock).with_cards(cards);

    let alice_token = authority.issue("alice", alice()).await.unwrap();
    let bob_token = authority.issue("bob", alice()).await.unwrap();

    let card = authority.render_card(&alice_token).unwrap();
    assert!(card.one_time_mask.is_none());
    assert!(authority.card_matches(&card.png, &alice_token).unwrap());
    assert!(!authority.card_matches(&card.png, &bob_token).unwrap());
}

#[tokio::test]
async fn test_cards_require_codec() {
    let clock = Arc::new(ManualClock::new(NOW));
    let authority = authority(&clock);
    let token = authority.issue("alice", alice()).await.unwrap();
    assert!(matches!(
        authority.render_card(&token),
        Err(AuthError::Card(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issue_and_verify() {
    let clock = Arc::new(ManualClock::new(NOW));
    let authority = Arc::new(authority(&clock));

    let mut handles = Vec::new();
    for i in 0..16 {
        let authority = authority.clone();
        handles.push(tokio::spawn(async move {
            let name = format!("user-{i}");
            let token = authority.issue(&name, alice()).await.unwrap();
            let envelope = authority.verify(&token.token).await.unwrap();
            assert_eq!(envelope.header.recipient, name);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(authority.store().len().await, 16);
}
