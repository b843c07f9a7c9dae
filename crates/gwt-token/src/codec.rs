//! The token codec: sign, parse and validate envelopes.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::body::BodyCodec;
use crate::canonical::{decode_payload, encode_payload};
use crate::clock::{duration_ms, Clock, SystemClock};
use crate::envelope::{Envelope, Header, Signature, Token};
use crate::error::{BoxError, Result, TokenError};
use crate::signer;
use crate::spice::Spice;

/// Default validity window.
pub const TOKEN_EXPIRE_TIME: Duration = Duration::from_secs(15 * 60);

/// Separator between the payload and signature segments.
pub const SEGMENT_SEPARATOR: char = '.';

/// Caller-supplied header check run during validation.
pub type HeaderPredicate<'a> = &'a (dyn Fn(&Header) -> std::result::Result<(), BoxError> + 'a);

/// Caller-supplied body check run during validation.
pub type BodyPredicate<'a, T> = &'a (dyn Fn(&T) -> std::result::Result<(), BoxError> + 'a);

/// Encodes, decodes and validates tokens for one body type.
///
/// Holds only immutable state; share it freely across threads.
pub struct TokenCodec<C> {
    spice: Spice,
    body: C,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<C: BodyCodec> TokenCodec<C> {
    pub fn new(spice: Spice, body: C) -> Self {
        Self {
            spice,
            body,
            clock: Arc::new(SystemClock),
            ttl: TOKEN_EXPIRE_TIME,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn body_codec(&self) -> &C {
        &self.body
    }

    /// A header for `recipient` that expires one ttl from now.
    pub fn header(&self, issuer: impl Into<String>, recipient: impl Into<String>) -> Header {
        Header::expiring(issuer, recipient, self.clock.as_ref(), self.ttl)
    }

    /// Sign an envelope and attach the resulting token.
    pub fn encode(&self, envelope: &mut Envelope<C::Body>) -> Result<Token> {
        envelope.header.check_complete()?;

        let payload = self.payload_for(&envelope.header, &envelope.body)?;
        let signature = signer::sign(&self.spice, &payload);

        let mut token = URL_SAFE_NO_PAD.encode(&payload);
        token.push(SEGMENT_SEPARATOR);
        token.push_str(&URL_SAFE_NO_PAD.encode(signature.as_bytes()));

        envelope.token = Some(token.clone());
        envelope.signature = Some(signature);

        Ok(Token { token, signature })
    }

    /// Parse and authenticate a token string.
    ///
    /// The signature is checked before any payload parsing. Expiry is not
    /// checked here; see [`TokenCodec::validate`].
    pub fn decode(&self, token: &str) -> Result<Envelope<C::Body>> {
        let (payload, signature) = split_token(token)?;

        if !signer::verify(&self.spice, &payload, signature.as_bytes()) {
            return Err(TokenError::InvalidSignature);
        }

        let (header, body_bytes) = decode_payload(&payload)?;
        let body = self
            .body
            .decode_body(&body_bytes)
            .map_err(TokenError::body)?;

        Ok(Envelope {
            header,
            body,
            token: Some(token.to_owned()),
            signature: Some(signature),
        })
    }

    /// Validate without caller predicates.
    pub fn validate(&self, envelope: &Envelope<C::Body>) -> Result<()> {
        self.validate_with(envelope, None, None)
    }

    /// Validate a decoded or freshly encoded envelope.
    ///
    /// Checks run in order: header completeness, the expiry window, the
    /// header predicate, the body predicate, and finally that the attached
    /// token still signs this header and a body that encodes the same way.
    pub fn validate_with(
        &self,
        envelope: &Envelope<C::Body>,
        header_check: Option<HeaderPredicate<'_>>,
        body_check: Option<BodyPredicate<'_, C::Body>>,
    ) -> Result<()> {
        envelope.header.check_complete()?;

        let elapsed = self.clock.now_ms().saturating_sub(envelope.header.expires);
        if elapsed >= duration_ms(self.ttl) {
            return Err(TokenError::ExpiredToken);
        }

        if let Some(check) = header_check {
            check(&envelope.header).map_err(TokenError::HeaderRejected)?;
        }
        if let Some(check) = body_check {
            check(&envelope.body).map_err(TokenError::BodyRejected)?;
        }

        let token = envelope.token.as_deref().ok_or(TokenError::Unsigned)?;
        let (payload, signature) = split_token(token)?;
        if !signer::verify(&self.spice, &payload, signature.as_bytes()) {
            return Err(TokenError::InvalidSignature);
        }
        if let Some(attached) = &envelope.signature {
            if attached != &signature {
                return Err(TokenError::InvalidSignature);
            }
        }

        // Bodies compare through the codec; the signed frame may use another
        // version than this codec writes.
        let (signed_header, signed_body) = decode_payload(&payload)?;
        if signed_header != envelope.header {
            return Err(TokenError::InvalidSignature);
        }
        let signed_body = self
            .body
            .decode_body(&signed_body)
            .map_err(TokenError::body)?;
        let current = self.body.encode_body(&envelope.body).map_err(TokenError::body)?;
        if self.body.encode_body(&signed_body).map_err(TokenError::body)? != current {
            return Err(TokenError::InvalidSignature);
        }

        Ok(())
    }

    /// Decode then validate in one step.
    pub fn verify(&self, token: &str) -> Result<Envelope<C::Body>> {
        let envelope = self.decode(token)?;
        self.validate(&envelope)?;
        Ok(envelope)
    }

    fn payload_for(&self, header: &Header, body: &C::Body) -> Result<Vec<u8>> {
        let body_bytes = self.body.encode_body(body).map_err(TokenError::body)?;
        Ok(encode_payload(header, &body_bytes))
    }
}

impl<C> std::fmt::Debug for TokenCodec<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("spice", &self.spice)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Split a wire token into its payload bytes and signature.
fn split_token(token: &str) -> Result<(Vec<u8>, Signature)> {
    let mut parts = token.split(SEGMENT_SEPARATOR);
    let (payload, signature) = match (parts.next(), parts.next(), parts.next()) {
        (Some(p), Some(s), None) if !p.is_empty() && !s.is_empty() => (p, s),
        _ => {
            return Err(TokenError::MalformedToken(
                "expected two non-empty segments".into(),
            ))
        }
    };

    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| TokenError::MalformedToken(format!("payload: {e}")))?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|e| TokenError::MalformedToken(format!("signature: {e}")))?;

    // A tag of the wrong length cannot match; report it like any other
    // mismatch.
    let signature =
        Signature::try_from(signature.as_slice()).map_err(|_| TokenError::InvalidSignature)?;
    Ok((payload, signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{RawCodec, RbacCodec};
    use crate::clock::ManualClock;

    use gwt_core::{DefaultRole, FrameFormat, Registry, Resource, ResourceType, Resources, UserId};

    const NOW: i64 = 1_700_000_000_000;

    fn spice() -> Spice {
        Spice::new(b"test-salt".to_vec(), b"test-pepper".to_vec())
    }

    fn raw_codec(clock: &Arc<ManualClock>) -> TokenCodec<RawCodec> {
        TokenCodec::new(spice(), RawCodec).with_clock(clock.clone())
    }

    fn alice_envelope(codec: &TokenCodec<RawCodec>) -> Envelope<Vec<u8>> {
        Envelope::new(
            codec.header("Authentity", "alice"),
            b"dataManagementUserData".to_vec(),
        )
    }

    #[test]
    fn test_authentity_alice_scenario() {
        let clock = Arc::new(ManualClock::new(NOW));
        let registry = Registry::builder()
            .with_standard_types()
            .resource_type("dataManagementUserData")
            .build()
            .unwrap();
        let codec = TokenCodec::new(spice(), RbacCodec::new(Arc::new(registry)))
            .with_clock(clock.clone());

        let user_id = UserId::generate();
        let data = ResourceType::new("dataManagementUserData");
        let resources = Resources::new(user_id)
            .with_resource(Resource::new(data.clone(), [DefaultRole::Owner.role()]));

        let mut envelope = Envelope::new(codec.header("Authentity", "alice"), resources.clone());
        let token = codec.encode(&mut envelope).unwrap();

        let segments: Vec<&str> = token.token.split('.').collect();
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| !s.is_empty()));

        let verified = codec.verify(&token.token).unwrap();
        assert_eq!(verified.header.issuer, "Authentity");
        assert_eq!(verified.header.recipient, "alice");
        assert_eq!(verified.body.user_id, user_id);
        assert_eq!(verified.body, resources);
        assert!(verified.body.has_access(&data, &[DefaultRole::Owner.role()]));
        assert!(!verified.body.has_access(&data, &[DefaultRole::Guest.role()]));
    }

    #[test]
    fn test_raw_body_roundtrip() {
        let clock = Arc::new(ManualClock::new(NOW));
        let codec = raw_codec(&clock);

        let mut envelope = alice_envelope(&codec);
        let token = codec.encode(&mut envelope).unwrap();
        assert_eq!(envelope.token.as_deref(), Some(token.token.as_str()));
        assert_eq!(envelope.signature, Some(token.signature));

        let decoded = codec.decode(&token.token).unwrap();
        assert_eq!(decoded.header.issuer, "Authentity");
        assert_eq!(decoded.header.recipient, "alice");
        assert_eq!(decoded.body, b"dataManagementUserData");
        assert_eq!(decoded, envelope);

        codec.validate(&decoded).unwrap();
    }

    #[test]
    fn test_encode_is_deterministic() {
        let clock = Arc::new(ManualClock::new(NOW));
        let codec = raw_codec(&clock);
        let a = codec.encode(&mut alice_envelope(&codec)).unwrap();
        let b = codec.encode(&mut alice_envelope(&codec)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_incomplete_header_rejected_on_encode() {
        let codec = TokenCodec::new(spice(), RawCodec);
        let mut envelope = Envelope::new(Header::new("iss", "", NOW), vec![]);
        assert!(matches!(
            codec.encode(&mut envelope),
            Err(TokenError::InvalidHeader(_))
        ));
        assert!(envelope.token.is_none());
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = TokenCodec::new(spice(), RawCodec);
        for bad in ["", "abc", ".", "abc.", ".abc", "a.b.c", "!!!.abc", "abc.!!!"] {
            assert!(
                matches!(codec.decode(bad), Err(TokenError::MalformedToken(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_bit_flips_are_detected() {
        let clock = Arc::new(ManualClock::new(NOW));
        let codec = raw_codec(&clock);
        let token = codec.encode(&mut alice_envelope(&codec)).unwrap().token;
        let (payload_b64, sig_b64) = token.split_once('.').unwrap();

        let payload = URL_SAFE_NO_PAD.decode(payload_b64).unwrap();
        let sig = URL_SAFE_NO_PAD.decode(sig_b64).unwrap();

        for i in 0..payload.len() {
            let mut p = payload.clone();
            p[i] ^= 0x01;
            let forged = format!("{}.{}", URL_SAFE_NO_PAD.encode(&p), sig_b64);
            assert!(matches!(
                codec.decode(&forged),
                Err(TokenError::InvalidSignature)
            ));
        }
        for i in 0..sig.len() {
            let mut s = sig.clone();
            s[i] ^= 0x80;
            let forged = format!("{}.{}", payload_b64, URL_SAFE_NO_PAD.encode(&s));
            assert!(matches!(
                codec.decode(&forged),
                Err(TokenError::InvalidSignature)
            ));
        }
    }

    #[test]
    fn test_wire_character_flips_are_rejected() {
        // Flipping any of the low seven bits keeps the token ASCII. Results
        // split between a signature mismatch and a malformed token (characters
        // outside the alphabet, an extra separator, non-zero trailing bits).
        let clock = Arc::new(ManualClock::new(NOW));
        let codec = raw_codec(&clock);
        let token = codec.encode(&mut alice_envelope(&codec)).unwrap().token;

        for i in 0..token.len() {
            for bit in 0..7 {
                let mut bytes = token.clone().into_bytes();
                bytes[i] ^= 1 << bit;
                let forged = String::from_utf8(bytes).unwrap();
                match codec.decode(&forged) {
                    Err(TokenError::InvalidSignature) | Err(TokenError::MalformedToken(_)) => {}
                    other => panic!("flip at {i} bit {bit}: {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_short_signature_is_a_mismatch() {
        let clock = Arc::new(ManualClock::new(NOW));
        let codec = raw_codec(&clock);
        let token = codec.encode(&mut alice_envelope(&codec)).unwrap();
        let (payload_b64, _) = token.token.split_once('.').unwrap();

        for len in [1, 32, 63, 65] {
            let forged = format!(
                "{payload_b64}.{}",
                URL_SAFE_NO_PAD.encode(&token.signature.as_bytes().repeat(2)[..len])
            );
            assert!(
                matches!(codec.decode(&forged), Err(TokenError::InvalidSignature)),
                "{len}"
            );
        }
    }

    #[test]
    fn test_verify_accepts_either_frame_version() {
        let clock = Arc::new(ManualClock::new(NOW));
        let registry = Arc::new(Registry::standard());
        let compact = TokenCodec::new(spice(), RbacCodec::new(registry.clone()))
            .with_clock(clock.clone());
        let varint = TokenCodec::new(
            spice(),
            RbacCodec::new(registry).with_format(FrameFormat::Varint),
        )
        .with_clock(clock.clone());

        let resources = Resources::new(UserId::generate()).with_resource(Resource::new(
            ResourceType::NETWORK,
            [DefaultRole::Dev.role().with_claim("team", "edge").unwrap()],
        ));

        let mut envelope = Envelope::new(compact.header("iss", "alice"), resources.clone());
        let old = compact.encode(&mut envelope).unwrap();
        assert_eq!(varint.verify(&old.token).unwrap().body, resources);

        let mut envelope = Envelope::new(varint.header("iss", "alice"), resources.clone());
        let new = varint.encode(&mut envelope).unwrap();
        assert_eq!(compact.verify(&new.token).unwrap().body, resources);

        // Local edits are still caught across versions.
        let mut edited = varint.decode(&old.token).unwrap();
        edited.body.resources[0].roles.push(DefaultRole::Admin.role());
        assert!(matches!(
            varint.validate(&edited),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_wrong_spice_is_rejected() {
        let clock = Arc::new(ManualClock::new(NOW));
        let codec = raw_codec(&clock);
        let token = codec.encode(&mut alice_envelope(&codec)).unwrap().token;

        let other = TokenCodec::new(Spice::generate(), RawCodec);
        assert!(matches!(
            other.decode(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expiry_window() {
        let clock = Arc::new(ManualClock::new(NOW));
        let codec = raw_codec(&clock);
        let mut envelope = alice_envelope(&codec);
        codec.encode(&mut envelope).unwrap();

        // Valid until one ttl past `expires`.
        clock.advance(TOKEN_EXPIRE_TIME * 2 - Duration::from_millis(1));
        codec.validate(&envelope).unwrap();

        clock.advance(Duration::from_millis(1));
        assert!(matches!(
            codec.validate(&envelope),
            Err(TokenError::ExpiredToken)
        ));
    }

    #[test]
    fn test_custom_ttl() {
        let clock = Arc::new(ManualClock::new(NOW));
        let codec = raw_codec(&clock).with_ttl(Duration::from_secs(1));
        let mut envelope = alice_envelope(&codec);
        assert_eq!(envelope.header.expires, NOW + 1_000);
        codec.encode(&mut envelope).unwrap();

        clock.set(NOW + 2_000);
        assert!(matches!(
            codec.validate(&envelope),
            Err(TokenError::ExpiredToken)
        ));
    }

    #[test]
    fn test_predicates() {
        let clock = Arc::new(ManualClock::new(NOW));
        let codec = raw_codec(&clock);
        let mut envelope = alice_envelope(&codec);
        codec.encode(&mut envelope).unwrap();

        let only_bob = |h: &Header| -> std::result::Result<(), BoxError> {
            if h.recipient == "bob" {
                Ok(())
            } else {
                Err("not bob".into())
            }
        };
        assert!(matches!(
            codec.validate_with(&envelope, Some(&only_bob), None),
            Err(TokenError::HeaderRejected(_))
        ));

        let non_empty = |b: &Vec<u8>| -> std::result::Result<(), BoxError> {
            if b.is_empty() {
                Err("empty".into())
            } else {
                Ok(())
            }
        };
        codec
            .validate_with(&envelope, None, Some(&non_empty))
            .unwrap();

        let reject_all = |_: &Vec<u8>| -> std::result::Result<(), BoxError> { Err("no".into()) };
        assert!(matches!(
            codec.validate_with(&envelope, None, Some(&reject_all)),
            Err(TokenError::BodyRejected(_))
        ));
    }

    #[test]
    fn test_validate_detects_local_edits() {
        let clock = Arc::new(ManualClock::new(NOW));
        let codec = raw_codec(&clock);
        let mut envelope = alice_envelope(&codec);
        codec.encode(&mut envelope).unwrap();

        let mut edited = envelope.clone();
        edited.body = b"escalated".to_vec();
        assert!(matches!(
            codec.validate(&edited),
            Err(TokenError::InvalidSignature)
        ));

        let mut edited = envelope.clone();
        edited.header.recipient = "mallory".into();
        assert!(matches!(
            codec.validate(&edited),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_validate_unsigned() {
        let clock = Arc::new(ManualClock::new(NOW));
        let codec = raw_codec(&clock);
        let envelope = alice_envelope(&codec);
        assert!(matches!(
            codec.validate(&envelope),
            Err(TokenError::Unsigned)
        ));
    }

    #[test]
    fn test_rbac_body() {
        let clock = Arc::new(ManualClock::new(NOW));
        let codec = TokenCodec::new(spice(), RbacCodec::new(Arc::new(Registry::standard())))
            .with_clock(clock.clone());

        let resources = Resources::new(UserId::generate()).with_resource(Resource::new(
            ResourceType::DATA_MANAGEMENT,
            [DefaultRole::Mod.role().with_claim("dept", "finance").unwrap()],
        ));
        let mut envelope = Envelope::new(codec.header("Authentity", "alice"), resources.clone());
        let token = codec.encode(&mut envelope).unwrap();

        let decoded = codec.verify(&token.token).unwrap();
        assert_eq!(decoded.body, resources);
        assert!(decoded
            .body
            .has_access(&ResourceType::DATA_MANAGEMENT, &[DefaultRole::Mod.role()]));
    }

    #[test]
    fn test_body_errors_surface_after_signature_check() {
        // A correctly signed payload whose body is not a valid RBAC frame.
        let clock = Arc::new(ManualClock::new(NOW));
        let raw = raw_codec(&clock);
        let mut envelope = Envelope::new(raw.header("iss", "rcp"), vec![0x7f]);
        let token = raw.encode(&mut envelope).unwrap().token;

        let rbac = TokenCodec::new(spice(), RbacCodec::new(Arc::new(Registry::standard())));
        assert!(matches!(rbac.decode(&token), Err(TokenError::Body(_))));
    }

    #[test]
    fn test_concurrent_use() {
        let clock = Arc::new(ManualClock::new(NOW));
        let codec = raw_codec(&clock);
        std::thread::scope(|s| {
            for i in 0..8u8 {
                let codec = &codec;
                s.spawn(move || {
                    for j in 0..32u8 {
                        let mut env = Envelope::new(codec.header("iss", format!("u{i}")), vec![i, j]);
                        let token = codec.encode(&mut env).unwrap();
                        let decoded = codec.verify(&token.token).unwrap();
                        assert_eq!(decoded.body, vec![i, j]);
                    }
                });
            }
        });
    }
}
