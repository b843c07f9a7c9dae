//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the RBAC frame, the canonical payload and the HMAC
//! construction. Any change to the wire formats shows up here first.

use gwt_core::{
    DefaultRole, Registry, Resource, ResourceId, ResourceType, Resources, Role, RoleType, UserId,
};
use gwt_token::{Envelope, Header, RbacCodec, Spice, TokenCodec};
use serde::Serialize;
use std::sync::Arc;

/// Salt shared by all vectors.
pub const GOLDEN_SALT: &[u8] = b"golden-salt";

/// Pepper shared by all vectors.
pub const GOLDEN_PEPPER: &[u8] = b"golden-pepper";

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// The token body.
    pub resources: Resources,
    /// The token header.
    pub header: Header,
    /// Expected Compact RBAC frame (hex).
    pub expected_frame: &'static str,
    /// Expected HMAC-SHA512 signature (hex).
    pub expected_signature: &'static str,
    /// Expected wire token.
    pub expected_token: &'static str,
}

/// Serializable form of a computed vector, for dumping to JSON.
#[derive(Debug, Serialize)]
pub struct VectorDump {
    pub name: String,
    pub issuer: String,
    pub recipient: String,
    pub expires: i64,
    pub frame: String,
    pub signature: String,
    pub token: String,
}

/// The fixed spice all vectors are signed with.
pub fn golden_spice() -> Spice {
    Spice::new(GOLDEN_SALT.to_vec(), GOLDEN_PEPPER.to_vec())
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "empty resource set",
            resources: Resources::new(UserId::from_bytes([0x11; 16])),
            header: Header::new("Authentity", "alice", 1_736_870_400_000),
            expected_frame: "011111111111111111111111111111111100",
            expected_signature: "9efffec4a0832fc0b1db3e67598f0343eb3420cf34cf5f8368af5bea80025847\
                                 94beb276e6030af72ff072cd869e56ef0e4ef32912f97b518034cd4535afa242",
            expected_token: "pQABAWpBdXRoZW50aXR5AmVhbGljZQMbAAABlGWLEAAEUgERERERERERERERERERERERAA.\
                             nv_-xKCDL8Cx2z5nWY8DQ-s0IM80z1-DaK9b6oACWEeUvrJ25gMK9y_wcs2GnlbvDk7zKRL5e1GANM1FNa-iQg",
        },
        GoldenVector {
            name: "dev on network with a claim",
            resources: Resources::new(UserId::from_bytes([0xaa; 16])).with_resource(Resource {
                res_id: ResourceId::from_bytes([0x01; 16]),
                resource_type: ResourceType::NETWORK,
                roles: vec![DefaultRole::Dev
                    .role()
                    .with_claim("team", "platform")
                    .expect("valid claim key")],
            }),
            header: Header::new("Authentity", "alice", 1_736_870_400_000),
            expected_frame: "01aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa01010101010101010101010101010101010001020f010d\
                             7465616d2e706c6174666f726d",
            expected_signature: "9c8b528bb851630dffff57c783b404bd11e5dd892dc193af9e4abe248013db4c\
                                 8ef21cd0239c02643e3662668bbdb1bac0288e0a10c7f1b815a456433cf5f418",
            expected_token: "pQABAWpBdXRoZW50aXR5AmVhbGljZQMbAAABlGWLEAAEWDUBqqqqqqqqqqqqqqqqqqqqqgEBAQEBAQEBAQEBAQEBAQEB\
                             AAECDwENdGVhbS5wbGF0Zm9ybQ.\
                             nItSi7hRYw3__1fHg7QEvRHl3YktwZOvnkq-JIAT20yO8hzQI5wCZD42YmaLvbG6wCiOChDH8bgVpFZDPPX0GA",
        },
        GoldenVector {
            name: "mod and guest on data management, bare third party",
            resources: Resources::new(UserId::from_bytes([0x22; 16]))
                .with_resource(Resource {
                    res_id: ResourceId::from_bytes([0x02; 16]),
                    resource_type: ResourceType::DATA_MANAGEMENT,
                    roles: vec![
                        DefaultRole::Mod.role(),
                        Role::new(RoleType::GUEST, DefaultRole::Guest.permissions())
                            .with_claim("email", "bob@example.com")
                            .expect("valid claim key"),
                    ],
                })
                .with_resource(Resource {
                    res_id: ResourceId::from_bytes([0x03; 16]),
                    resource_type: ResourceType::THIRD_PARTY,
                    roles: vec![],
                }),
            header: Header::new("Authentity", "bob", 1_736_871_300_000),
            expected_frame: "01222222222222222222222222222222220202020202020202020202020202020202010203050004\
                             010115656d61696c2e626f62406578616d706c652e636f6d030303030303030303030303030303\
                             030600",
            expected_signature: "e9a7c55050292e0e1473623c3ac3c6b5e966f17b71352555b500f1d753a1ac10\
                                 2409ea50ba690be3d864d4e48ab3797ec9041c1c10c08b70724a825bfa1a2db1",
            expected_token: "pQABAWpBdXRoZW50aXR5AmNib2IDGwAAAZRlmMugBFhSASIiIiIiIiIiIiIiIiIiIiICAgICAgICAgICAgICAgIC\
                             AgECAwUABAEBFWVtYWlsLmJvYkBleGFtcGxlLmNvbQMDAwMDAwMDAwMDAwMDAwMGAA.\
                             6afFUFApLg4Uc2I8OsPGtelm8XtxNSVVtQDx11OhrBAkCepQumkL49hk1OSKs3l-yQQcHBDAi3BySoJb-hotsQ",
        },
    ]
}

/// Compute a vector's outputs with the current implementation.
pub fn compute_vector(vector: &GoldenVector) -> VectorDump {
    let registry = Arc::new(Registry::standard());
    let frame = vector
        .resources
        .serialize(&registry)
        .expect("vector resources fit a compact frame");

    let codec = TokenCodec::new(golden_spice(), RbacCodec::new(registry));
    let mut envelope = Envelope::new(vector.header.clone(), vector.resources.clone());
    let token = codec.encode(&mut envelope).expect("vector header is complete");

    VectorDump {
        name: vector.name.to_owned(),
        issuer: vector.header.issuer.clone(),
        recipient: vector.header.recipient.clone(),
        expires: vector.header.expires,
        frame: hex::encode(frame),
        signature: token.signature.to_hex(),
        token: token.token,
    }
}

/// Check one vector. Returns a description of the first mismatch.
pub fn check_vector(vector: &GoldenVector) -> Result<(), String> {
    let computed = compute_vector(vector);
    let checks = [
        ("frame", vector.expected_frame, computed.frame.as_str()),
        ("signature", vector.expected_signature, computed.signature.as_str()),
        ("token", vector.expected_token, computed.token.as_str()),
    ];
    for (field, expected, actual) in checks {
        if expected != actual {
            return Err(format!(
                "{}: {field} mismatch\n  expected: {expected}\n  actual:   {actual}",
                vector.name
            ));
        }
    }
    Ok(())
}

/// Check every vector, collecting all mismatches.
pub fn verify_all_vectors() -> Result<(), Vec<String>> {
    let failures: Vec<String> = all_vectors()
        .iter()
        .filter_map(|v| check_vector(v).err())
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}

/// Dump every computed vector as pretty JSON.
pub fn dump_vectors_json() -> serde_json::Result<String> {
    let dumps: Vec<VectorDump> = all_vectors().iter().map(compute_vector).collect();
    serde_json::to_string_pretty(&dumps)
}
