//! Ledger state queries and the decode chain.
//!
//! State comes back as a JSON envelope whose `data` field is base64 text over
//! CBOR. A single-address read holds a map keyed by payload hash; a prefix
//! read holds a list of such entries.
//!
//! By default any failure in the decode chain is reported as
//! [`AnchorError::NotFound`], so a malformed response looks the same as an
//! empty one. Strict mode reports [`AnchorError::Decode`] instead.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ciborium::value::Value;
use serde::Deserialize;

use air_anchor_core::Family;
use air_anchor_transport::{LedgerHttp, RetryConfig};

use crate::error::{AnchorError, Result};

#[derive(Deserialize)]
struct StateEnvelope {
    data: String,
}

#[derive(Deserialize)]
struct StateListEnvelope {
    data: Vec<StateEntry>,
}

#[derive(Deserialize)]
struct StateEntry {
    data: String,
}

/// Reads and decodes records from ledger state.
#[derive(Debug, Clone)]
pub struct QueryClient {
    http: LedgerHttp,
    family: Family,
    retry: RetryConfig,
    strict: bool,
}

impl QueryClient {
    pub fn new(http: LedgerHttp, family: Family) -> Self {
        Self {
            http,
            family,
            retry: RetryConfig::idempotent(),
            strict: false,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_strict_decode(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Fetch the record `hash` written by `key`.
    pub async fn show(&self, key: &str, hash: &str) -> Result<Value> {
        let address = self.family.address(key, Some(hash))?;
        let text = self.http.get_state(address.as_str(), &self.retry).await?;

        let entries = self.collapse(address.as_str(), decode_state(&text))?;
        lookup(entries, hash).ok_or_else(|| AnchorError::NotFound(address.into_string()))
    }

    /// Fetch every state entry written by `key`.
    pub async fn list(&self, key: &str) -> Result<Vec<Value>> {
        let prefix = self.family.address(key, None)?;
        let text = self.http.get_state_prefix(prefix.as_str(), &self.retry).await?;

        self.collapse(prefix.as_str(), decode_state_list(&text))
    }

    fn collapse<T>(&self, address: &str, decoded: std::result::Result<T, String>) -> Result<T> {
        decoded.map_err(|reason| {
            if self.strict {
                AnchorError::Decode(reason)
            } else {
                tracing::debug!(%address, %reason, "undecodable state reported as not found");
                AnchorError::NotFound(address.to_string())
            }
        })
    }
}

/// Decode a single-address envelope into its CBOR value.
pub fn decode_state(text: &str) -> std::result::Result<Value, String> {
    let envelope: StateEnvelope =
        serde_json::from_str(text).map_err(|e| format!("bad envelope: {e}"))?;
    decode_entry(&envelope.data)
}

/// Decode a prefix-query envelope, each entry independently.
pub fn decode_state_list(text: &str) -> std::result::Result<Vec<Value>, String> {
    let envelope: StateListEnvelope =
        serde_json::from_str(text).map_err(|e| format!("bad envelope: {e}"))?;
    envelope
        .data
        .iter()
        .map(|entry| decode_entry(&entry.data))
        .collect()
}

fn decode_entry(data: &str) -> std::result::Result<Value, String> {
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| format!("bad base64: {e}"))?;
    ciborium::from_reader(bytes.as_slice()).map_err(|e| format!("bad cbor: {e}"))
}

fn lookup(value: Value, hash: &str) -> Option<Value> {
    match value {
        Value::Map(entries) => entries
            .into_iter()
            .find(|(k, _)| k.as_text() == Some(hash))
            .map(|(_, v)| v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use air_anchor_core::canonical_cbor;
    use std::collections::BTreeMap;

    fn envelope(bytes: &[u8]) -> String {
        serde_json::json!({ "data": STANDARD.encode(bytes), "head": "abc" }).to_string()
    }

    #[test]
    fn test_decode_state_and_lookup() {
        let mut stored = BTreeMap::new();
        stored.insert("h1".to_string(), "first".to_string());
        stored.insert("h2".to_string(), "second".to_string());
        let text = envelope(&canonical_cbor(&stored).unwrap());

        let value = decode_state(&text).unwrap();
        assert_eq!(lookup(value.clone(), "h2"), Some(Value::Text("second".into())));
        assert_eq!(lookup(value, "h3"), None);
    }

    #[test]
    fn test_decode_chain_failures() {
        assert!(decode_state("not json").is_err());
        assert!(decode_state(r#"{"data": "%%%not base64"}"#).is_err());
        let not_cbor = serde_json::json!({"data": STANDARD.encode([0xffu8, 0x00])});
        assert!(decode_state(&not_cbor.to_string()).is_err());
        assert!(decode_state(r#"{"head": "abc"}"#).is_err());
    }

    #[test]
    fn test_decode_state_list() {
        let a = canonical_cbor(&BTreeMap::from([("h1", 1u8)])).unwrap();
        let b = canonical_cbor(&BTreeMap::from([("h2", 2u8)])).unwrap();
        let text = serde_json::json!({
            "data": [
                {"address": "x", "data": STANDARD.encode(&a)},
                {"address": "y", "data": STANDARD.encode(&b)},
            ]
        })
        .to_string();

        let values = decode_state_list(&text).unwrap();
        assert_eq!(values.len(), 2);
        assert!(lookup(values[1].clone(), "h2").is_some());
    }

    #[test]
    fn test_one_bad_entry_fails_list() {
        let good = canonical_cbor(&BTreeMap::from([("h1", 1u8)])).unwrap();
        let text = serde_json::json!({
            "data": [{"data": STANDARD.encode(&good)}, {"data": "!!"}]
        })
        .to_string();
        assert!(decode_state_list(&text).is_err());
    }

    #[test]
    fn test_lookup_on_non_map_is_none() {
        assert_eq!(lookup(Value::Text("x".into()), "x"), None);
    }
}
