//! The location payload carried inside ledger transactions.
//!
//! Encoded as a canonical CBOR map with the keys `csr`, `csr_firm`, `nonce`
//! and `data`.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_cbor;
use crate::crypto::random_nonce_hex;
use crate::error::{CoreError, Result};
use crate::request::CertificateRequest;

/// A location record as written to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPayload {
    /// The signed certificate request of the submitter.
    #[serde(rename = "csr")]
    pub certificate_request: CertificateRequest,

    /// The certificate authority's countersignature, if one was obtained.
    #[serde(rename = "csr_firm")]
    pub ca_signature: Option<serde_json::Value>,

    pub nonce: String,

    pub data: String,
}

impl LocationPayload {
    /// Assemble a payload with a fresh nonce.
    pub fn new(
        certificate_request: CertificateRequest,
        ca_signature: Option<serde_json::Value>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            certificate_request,
            ca_signature,
            nonce: random_nonce_hex(),
            data: data.into(),
        }
    }

    /// Canonical CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        canonical_cbor(self)
    }

    /// Parse CBOR bytes.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::decode_cbor;
    use crate::identity::SigningIdentity;
    use ciborium::value::Value;

    fn payload() -> LocationPayload {
        let id = SigningIdentity::from_bytes(&[0x33; 32]).unwrap();
        let csr = CertificateRequest::create(&id, "DRON").unwrap();
        LocationPayload::new(csr, Some(serde_json::json!({"signature": "ab"})), "0xfeed")
    }

    #[test]
    fn test_payload_keys_on_wire() {
        let bytes = payload().to_cbor().unwrap();
        let Value::Map(entries) = decode_cbor(&bytes).unwrap() else {
            panic!("payload must encode as a map");
        };

        let keys: Vec<_> = entries
            .iter()
            .filter_map(|(k, _)| k.as_text().map(str::to_string))
            .collect();
        assert_eq!(keys, vec!["csr", "data", "nonce", "csr_firm"]);
    }

    #[test]
    fn test_payload_roundtrip() {
        let original = payload();
        let decoded = LocationPayload::from_cbor(&original.to_cbor().unwrap()).unwrap();
        assert_eq!(decoded, original);
        decoded.certificate_request.verify().unwrap();
    }

    #[test]
    fn test_missing_countersignature_is_null() {
        let mut p = payload();
        p.ca_signature = None;
        let Value::Map(entries) = decode_cbor(&p.to_cbor().unwrap()).unwrap() else {
            panic!("payload must encode as a map");
        };
        let firm = entries
            .iter()
            .find(|(k, _)| k.as_text() == Some("csr_firm"))
            .map(|(_, v)| v);
        assert_eq!(firm, Some(&Value::Null));
    }

    #[test]
    fn test_payload_encoding_is_deterministic() {
        let p = payload();
        assert_eq!(p.to_cbor().unwrap(), p.to_cbor().unwrap());
    }
}
