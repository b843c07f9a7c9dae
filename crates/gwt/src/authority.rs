//! The Authority: issues, verifies and retires tokens for one issuer.
//!
//! The Authority brings together the token codec, the RBAC registry, a
//! signature store and (optionally) a card codec. Each identity has at most
//! one live token: issuing or refreshing replaces it, logout clears it.

use std::sync::Arc;
use std::time::Duration;

use gwt_core::{RbacError, Registry, ResourceType, Resources, Role};
use gwt_store::{SignatureRecord, SignatureStore};
use gwt_token::{
    BoxError, Clock, Envelope, Header, RbacCodec, Spice, Token, TokenCodec, TokenError,
    TOKEN_EXPIRE_TIME,
};
use gwt_vhash::{CardCodec, CardError, EncodedCard, MaskMode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AuthError, Result};

/// Configuration for the Authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// Name written into every issued header.
    pub issuer: String,
    /// Token lifetime; also the grace window past expiry.
    pub ttl: Duration,
    /// Other issuers whose tokens are accepted. This authority's own issuer
    /// is always accepted.
    pub trusted_issuers: Vec<String>,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            issuer: "gwt".to_owned(),
            ttl: TOKEN_EXPIRE_TIME,
            trusted_issuers: Vec::new(),
        }
    }
}

impl AuthorityConfig {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            ..Self::default()
        }
    }

    pub fn trusts(&self, issuer: &str) -> bool {
        issuer == self.issuer || self.trusted_issuers.iter().any(|i| i == issuer)
    }
}

/// Issuer-side token lifecycle over a [`SignatureStore`].
pub struct Authority<S: SignatureStore> {
    config: AuthorityConfig,
    spice: Spice,
    codec: TokenCodec<RbacCodec>,
    store: Arc<S>,
    cards: Option<CardCodec>,
}

impl<S: SignatureStore> Authority<S> {
    /// Create a new authority.
    pub fn new(config: AuthorityConfig, spice: Spice, registry: Arc<Registry>, store: S) -> Self {
        let codec = TokenCodec::new(spice.clone(), RbacCodec::new(registry)).with_ttl(config.ttl);
        Self {
            config,
            spice,
            codec,
            store: Arc::new(store),
            cards: None,
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.codec = self.codec.with_clock(clock);
        self
    }

    /// Enable visual hash cards.
    pub fn with_cards(mut self, cards: CardCodec) -> Self {
        self.cards = Some(cards);
        self
    }

    pub fn config(&self) -> &AuthorityConfig {
        &self.config
    }

    pub fn codec(&self) -> &TokenCodec<RbacCodec> {
        &self.codec
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Token Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue a token carrying `resources` to `recipient`.
    ///
    /// Any token previously issued to `recipient` stops verifying.
    pub async fn issue(&self, recipient: &str, resources: Resources) -> Result<Token> {
        let header = self.codec.header(self.config.issuer.clone(), recipient);
        let mut envelope = Envelope::new(header, resources);
        let token = self.codec.encode(&mut envelope).map_err(issue_failure)?;

        let record = SignatureRecord {
            signature: token.signature,
            issued_at: self.codec.clock().now_ms(),
            expires: envelope.header.expires,
        };
        if self.store.put_signature(recipient, record).await?.is_some() {
            debug!(recipient, "replaced previous token");
        }

        info!(
            recipient,
            resources = envelope.body.len(),
            expires = envelope.header.expires,
            "issued token"
        );
        Ok(token)
    }

    /// Decode, validate, and check that the token is the recipient's
    /// current one.
    pub async fn verify(&self, token: &str) -> Result<Envelope<Resources>> {
        let envelope = self.codec.decode(token).map_err(|e| {
            debug!(error = %e, "token rejected");
            e
        })?;

        {
            let trusted = |header: &Header| -> std::result::Result<(), BoxError> {
                if self.config.trusts(&header.issuer) {
                    Ok(())
                } else {
                    Err(Box::new(UntrustedIssuer(header.issuer.clone())))
                }
            };
            self.codec
                .validate_with(&envelope, Some(&trusted), None)
                .map_err(|e| {
                    let e = untrusted_to_auth(e);
                    debug!(recipient = %envelope.header.recipient, error = %e, "token rejected");
                    e
                })?;
        }

        self.check_current(&envelope).await?;
        Ok(envelope)
    }

    /// Verify, then require a role matching one of `roles` on a resource of
    /// `resource_type`.
    pub async fn authorize(
        &self,
        token: &str,
        resource_type: &ResourceType,
        roles: &[Role],
    ) -> Result<Envelope<Resources>> {
        let envelope = self.verify(token).await?;
        if !envelope.body.has_access(resource_type, roles) {
            warn!(
                recipient = %envelope.header.recipient,
                resource_type = %resource_type,
                "access denied"
            );
            return Err(AuthError::AccessDenied {
                recipient: envelope.header.recipient,
                resource_type: resource_type.clone(),
            });
        }
        Ok(envelope)
    }

    /// Exchange a valid token for a fresh one with a new expiry.
    ///
    /// The old token is superseded.
    pub async fn refresh(&self, token: &str) -> Result<Token> {
        let envelope = self.verify(token).await?;
        debug!(recipient = %envelope.header.recipient, "refreshing token");
        self.issue(&envelope.header.recipient, envelope.body).await
    }

    /// Retire the recipient's current token.
    ///
    /// An expired token may still log out, as long as it is authentic and
    /// current.
    pub async fn logout(&self, token: &str) -> Result<()> {
        let envelope = self.codec.decode(token)?;
        self.check_current(&envelope).await?;
        self.store
            .clear_signature(&envelope.header.recipient)
            .await?;
        info!(recipient = %envelope.header.recipient, "logged out");
        Ok(())
    }

    async fn check_current(&self, envelope: &Envelope<Resources>) -> Result<()> {
        let recipient = &envelope.header.recipient;
        let stored = self.store.get_signature(recipient).await?;
        match (stored, envelope.signature) {
            (Some(record), Some(signature)) if record.signature == signature => Ok(()),
            _ => {
                warn!(recipient = %recipient, "token is not current");
                Err(AuthError::Revoked(recipient.clone()))
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Visual Hash Cards
    // ─────────────────────────────────────────────────────────────────────────

    /// Render the token's signature as a card, masked with a key derived
    /// from this authority's spice.
    pub fn render_card(&self, token: &Token) -> Result<EncodedCard> {
        let cards = self.cards()?;
        Ok(cards.encode(token.signature.as_bytes(), MaskMode::Derived(self.spice.pepper()))?)
    }

    /// Check that a card shows `token`'s signature.
    pub fn card_matches(&self, png: &[u8], token: &Token) -> Result<bool> {
        let cards = self.cards()?;
        let mask = cards.derived_mask(self.spice.pepper());
        let shown = cards.decode(png, Some(&mask))?;
        Ok(shown.as_slice() == token.signature.as_bytes())
    }

    fn cards(&self) -> Result<&CardCodec> {
        self.cards
            .as_ref()
            .ok_or_else(|| CardError::MissingAsset("no card codec configured".into()).into())
    }
}

/// Body errors while issuing come from our own resources, not a caller's
/// token: surface them as RBAC errors.
fn issue_failure(err: TokenError) -> AuthError {
    match err {
        TokenError::Body(inner) => match inner.downcast::<RbacError>() {
            Ok(rbac) => AuthError::Rbac(*rbac),
            Err(inner) => AuthError::Token(TokenError::Body(inner)),
        },
        other => AuthError::Token(other),
    }
}

#[derive(Debug, thiserror::Error)]
#[error("issuer {0:?} is not trusted")]
struct UntrustedIssuer(String);

fn untrusted_to_auth(err: TokenError) -> AuthError {
    match err {
        TokenError::HeaderRejected(inner) => match inner.downcast::<UntrustedIssuer>() {
            Ok(untrusted) => AuthError::UnknownIssuer(untrusted.0),
            Err(inner) => AuthError::Token(TokenError::HeaderRejected(inner)),
        },
        other => AuthError::Token(other),
    }
}
