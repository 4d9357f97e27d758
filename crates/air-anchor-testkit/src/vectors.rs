//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the parts of the protocol a remote ledger checks
//! byte-for-byte: key derivation, the family prefix, and address layout.

use air_anchor_core::{make_address, sha512_hex, Family, SigningIdentity};

/// A golden address vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Private key bytes.
    pub secret: [u8; 32],
    /// Payload whose SHA-512 picks the address suffix.
    pub payload: &'static [u8],
    /// Expected compressed public key (hex).
    pub expected_public_key: &'static str,
    /// Expected state address.
    pub expected_address: &'static str,
}

/// The `AirAnchor` family prefix.
pub const AIR_ANCHOR_PREFIX: &str = "2519a4";

/// Scenario: key `aabbccddeeff` with a repeating `1122` hash.
pub const SCENARIO_KEY: &str = "aabbccddeeff";
pub const SCENARIO_HASH: &str =
    "11221122112211221122112211221122112211221122112211221122112211221122112211221122";
pub const SCENARIO_ADDRESS: &str =
    "2519a4aabbcc2211221122112211221122112211221122112211221122112211221122";

fn secret_one() -> [u8; 32] {
    let mut s = [0u8; 32];
    s[31] = 1;
    s
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "generator point, hello payload",
            secret: secret_one(),
            payload: b"hello",
            expected_public_key:
                "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
            expected_address:
                "2519a40279bed99ba5c11d7c7acc6e14b8c5da0c4663475c2e5c3adef46f73bcdec043",
        },
        GoldenVector {
            name: "0x42 key, hello payload",
            secret: [0x42; 32],
            payload: b"hello",
            expected_public_key:
                "0324653eac434488002cc06bbfb7f10fe18991e35f9fe4302dbea6d2353dc0ab1c",
            expected_address:
                "2519a4032465d99ba5c11d7c7acc6e14b8c5da0c4663475c2e5c3adef46f73bcdec043",
        },
        GoldenVector {
            name: "0x01 key, empty payload",
            secret: [0x01; 32],
            payload: b"",
            expected_public_key:
                "031b84c5567b126440995d3ed5aaba0565d71e1834604819ff9c17f5e9d5dd078f",
            expected_address:
                "2519a4031b843c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e",
        },
    ]
}

/// Compute `(public key, address)` for a vector.
pub fn compute(vector: &GoldenVector) -> (String, String) {
    let identity = SigningIdentity::from_bytes(&vector.secret)
        .unwrap_or_else(|e| panic!("vector '{}': {e}", vector.name));
    let public_key = identity.public_key_hex();
    let address = Family::air_anchor()
        .address(&public_key, Some(&sha512_hex(vector.payload)))
        .unwrap_or_else(|e| panic!("vector '{}': {e}", vector.name));
    (public_key, address.into_string())
}

/// Check every vector. Returns `(name, matches, computed address)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let (public_key, address) = compute(v);
            let matches = public_key == v.expected_public_key && address == v.expected_address;
            (v.name.to_string(), matches, address)
        })
        .collect()
}

/// The scenario address, computed.
pub fn scenario_address() -> String {
    make_address(SCENARIO_KEY, Some(SCENARIO_HASH))
        .map(|a| a.into_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_are_deterministic() {
        for vector in all_vectors() {
            assert_eq!(
                compute(&vector),
                compute(&vector),
                "Vector '{}' changed on regeneration",
                vector.name
            );
        }
    }

    #[test]
    fn test_different_secrets_different_addresses() {
        let vectors = all_vectors();
        assert_ne!(compute(&vectors[0]).1, compute(&vectors[1]).1);
    }
}
