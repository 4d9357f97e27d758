//! Signed requests: the certificate request and the transaction request.
//!
//! A certificate request is a self-asserted claim binding a distinguished name
//! to the submitter's public key. A transaction request embeds one, together
//! with the SHA-512 of the submitted data, and is the unit relayed through the
//! gateway queue.
//!
//! Both headers are signed over their canonical JSON encoding.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_json;
use crate::crypto::{random_nonce_hex, sha512_hex, PublicKey, Signature};
use crate::error::{CoreError, Result};
use crate::identity::SigningIdentity;

/// Header of a certificate request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRequestHeader {
    /// The subject the submitter claims to be.
    pub distinguished_name: String,

    /// The submitter's public key.
    pub sender_public_key: PublicKey,

    /// Fresh random hex nonce, never reused.
    pub nonce: String,
}

impl CertificateRequestHeader {
    /// The exact bytes covered by the signature.
    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        canonical_json(self)
    }
}

/// A signed certificate request. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRequest {
    pub header: CertificateRequestHeader,
    pub signature: Signature,
}

impl CertificateRequest {
    /// Build and sign a certificate request for `distinguished_name`.
    pub fn create(identity: &SigningIdentity, distinguished_name: &str) -> Result<Self> {
        let header = CertificateRequestHeader {
            distinguished_name: distinguished_name.to_string(),
            sender_public_key: identity.public_key(),
            nonce: random_nonce_hex(),
        };

        let signature = identity.sign(&header.signing_bytes()?);

        Ok(Self { header, signature })
    }

    /// Verify the header signature against the embedded public key.
    pub fn verify(&self) -> Result<()> {
        self.header
            .sender_public_key
            .verify(&self.header.signing_bytes()?, &self.signature)
    }
}

/// Header of a transaction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequestHeader {
    pub sender_public_key: PublicKey,

    /// The embedded identity claim.
    pub certificate_request: CertificateRequest,

    /// Fresh random hex nonce, never reused.
    pub nonce: String,

    /// Hex SHA-512 of the UTF-8 data bytes.
    pub data_sha512: String,
}

impl TransactionRequestHeader {
    /// The exact bytes covered by the signature.
    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        canonical_json(self)
    }
}

/// A signed transaction request carrying the submitted data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub header: TransactionRequestHeader,
    pub signature: Signature,
    pub data: String,
}

impl TransactionRequest {
    /// Build and sign a transaction request for `data`.
    pub fn create(
        identity: &SigningIdentity,
        certificate_request: CertificateRequest,
        data: &str,
    ) -> Result<Self> {
        let header = TransactionRequestHeader {
            sender_public_key: identity.public_key(),
            certificate_request,
            nonce: random_nonce_hex(),
            data_sha512: sha512_hex(data.as_bytes()),
        };

        let signature = identity.sign(&header.signing_bytes()?);

        Ok(Self {
            header,
            signature,
            data: data.to_string(),
        })
    }

    /// Verify the signature, the embedded certificate request, and that
    /// `data_sha512` matches `data`.
    pub fn verify(&self) -> Result<()> {
        let actual = sha512_hex(self.data.as_bytes());
        if actual != self.header.data_sha512 {
            return Err(CoreError::DataHashMismatch {
                expected: self.header.data_sha512.clone(),
                actual,
            });
        }

        self.header.certificate_request.verify()?;

        self.header
            .sender_public_key
            .verify(&self.header.signing_bytes()?, &self.signature)
    }

    /// Canonical JSON bytes, as published to the gateway queue.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        canonical_json(self)
    }

    /// Parse bytes produced by [`TransactionRequest::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
    }
}
