//! Signing identity: the client's secp256k1 keypair.
//!
//! An identity is loaded once at startup from a hex key file, or generated
//! ephemerally when no path is given, and then shared read-only by every
//! builder and worker.

use k256::ecdsa::{signature::Signer, Signature as EcdsaSignature, SigningKey};
use std::fmt;
use std::path::Path;

use crate::crypto::{PublicKey, Signature};
use crate::error::{CoreError, Result};

/// A secp256k1 keypair used to sign requests, transactions and batches.
#[derive(Clone)]
pub struct SigningIdentity {
    signing_key: SigningKey,
    public_key: PublicKey,
}

impl SigningIdentity {
    /// Generate a new random identity.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Create from 32 secret key bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let signing_key =
            SigningKey::from_bytes(bytes.into()).map_err(|_| CoreError::InvalidPrivateKey)?;
        Ok(Self::from_signing_key(signing_key))
    }

    /// Parse a hex-encoded private key. Surrounding whitespace is ignored.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim()).map_err(|_| CoreError::InvalidPrivateKey)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::InvalidPrivateKey)?;
        Self::from_bytes(&arr)
    }

    /// Load the identity from `path`, or generate an ephemeral one when no
    /// path is given.
    pub fn load_or_generate(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::generate());
        };

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::KeyLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_hex(&content).map_err(|e| CoreError::KeyLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let point = signing_key.verifying_key().to_encoded_point(true);
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(point.as_bytes());
        Self {
            signing_key,
            public_key: PublicKey(bytes),
        }
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// The public key as 66 lowercase hex characters.
    pub fn public_key_hex(&self) -> String {
        self.public_key.to_hex()
    }

    /// Sign a message. The message is hashed with SHA-256 and signed with
    /// RFC 6979 deterministic nonces.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig: EcdsaSignature = self.signing_key.sign(message);
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&sig.to_bytes());
        Signature(bytes)
    }

    /// The secret key as hex, in the format `from_hex` reads.
    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningIdentity({:?})", self.public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sign_verify() {
        let identity = SigningIdentity::generate();
        let message = b"hello anchor";
        let signature = identity.sign(message);

        identity
            .public_key()
            .verify(message, &signature)
            .expect("valid signature should verify");

        assert!(identity.public_key().verify(b"hello anchoR", &signature).is_err());
    }

    #[test]
    fn test_signature_fails_under_other_key() {
        let a = SigningIdentity::generate();
        let b = SigningIdentity::generate();
        let signature = a.sign(b"payload");
        assert!(b.public_key().verify(b"payload", &signature).is_err());
    }

    #[test]
    fn test_public_key_hex_shape() {
        let identity = SigningIdentity::from_bytes(&[0x42; 32]).unwrap();
        let hex = identity.public_key_hex();
        assert_eq!(hex.len(), PublicKey::HEX_LEN);
        assert!(hex.starts_with("02") || hex.starts_with("03"));
        assert_eq!(PublicKey::from_hex(&hex).unwrap(), identity.public_key());
    }

    #[test]
    fn test_deterministic_from_bytes() {
        let a = SigningIdentity::from_bytes(&[0x42; 32]).unwrap();
        let b = SigningIdentity::from_bytes(&[0x42; 32]).unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.sign(b"m"), b.sign(b"m"));
    }

    #[test]
    fn test_zero_key_rejected() {
        assert!(matches!(
            SigningIdentity::from_bytes(&[0u8; 32]),
            Err(CoreError::InvalidPrivateKey)
        ));
    }

    #[test]
    fn test_load_from_file_strips_whitespace() {
        let original = SigningIdentity::generate();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  {}  ", original.secret_hex()).unwrap();

        let loaded = SigningIdentity::load_or_generate(Some(file.path())).unwrap();
        assert_eq!(loaded.public_key(), original.public_key());
    }

    #[test]
    fn test_load_missing_file_is_key_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist.priv");
        let err = SigningIdentity::load_or_generate(Some(&missing)).unwrap_err();
        assert!(matches!(err, CoreError::KeyLoad { .. }));
    }

    #[test]
    fn test_load_malformed_file_is_key_load_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not a key").unwrap();
        let err = SigningIdentity::load_or_generate(Some(file.path())).unwrap_err();
        assert!(matches!(err, CoreError::KeyLoad { .. }));
    }

    #[test]
    fn test_ephemeral_identities_differ() {
        let a = SigningIdentity::load_or_generate(None).unwrap();
        let b = SigningIdentity::load_or_generate(None).unwrap();
        assert_ne!(a.public_key(), b.public_key());
    }
}
