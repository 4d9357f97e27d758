//! Canonical encodings for signed and hashed bytes.
//!
//! Two encodings are used:
//!
//! - **Canonical JSON** for certificate and transaction request headers. Object
//!   keys are sorted at every depth and no whitespace is emitted, so any
//!   verifier can rebuild the exact bytes that were signed.
//! - **Canonical CBOR** (RFC 8949 core deterministic encoding) for the location
//!   payload carried inside ledger transactions:
//!   - Map keys sorted by encoded byte comparison
//!   - Integers use smallest valid encoding
//!   - Definite lengths only
//!   - Floats always use the 64-bit form

use ciborium::value::Value;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::{CoreError, Result};

/// Encode any serializable value to canonical JSON bytes.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let value =
        serde_json::to_value(value).map_err(|e| CoreError::EncodingError(e.to_string()))?;
    let mut buf = Vec::new();
    write_json(&mut buf, &value)?;
    Ok(buf)
}

fn write_json(buf: &mut Vec<u8>, value: &JsonValue) -> Result<()> {
    match value {
        JsonValue::Object(map) => {
            let mut entries: Vec<(&String, &JsonValue)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            buf.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_json_scalar(buf, &JsonValue::String(key.clone()))?;
                buf.push(b':');
                write_json(buf, item)?;
            }
            buf.push(b'}');
        }
        JsonValue::Array(items) => {
            buf.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_json(buf, item)?;
            }
            buf.push(b']');
        }
        scalar => write_json_scalar(buf, scalar)?,
    }
    Ok(())
}

fn write_json_scalar(buf: &mut Vec<u8>, value: &JsonValue) -> Result<()> {
    serde_json::to_writer(&mut *buf, value).map_err(|e| CoreError::EncodingError(e.to_string()))
}

/// Encode any serializable value to canonical CBOR bytes.
pub fn canonical_cbor<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let value = Value::serialized(value).map_err(|e| CoreError::EncodingError(e.to_string()))?;
    encode_cbor_value_canonical(&value)
}

/// Decode CBOR bytes into a generic value.
pub fn decode_cbor(bytes: &[u8]) -> Result<Value> {
    ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
}

/// Encode a CBOR Value to canonical bytes.
pub fn encode_cbor_value_canonical(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value)?;
    Ok(buf)
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr)?,
        Value::Map(entries) => encode_map_canonical(buf, entries)?,
        Value::Tag(tag, inner) => {
            encode_uint(buf, 6, *tag);
            encode_value_to(buf, inner)?;
        }
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        Value::Float(f) => {
            buf.push(0xfb);
            buf.extend_from_slice(&f.to_be_bytes());
        }
        _ => {
            return Err(CoreError::EncodingError(
                "unsupported CBOR value type".into(),
            ))
        }
    }
    Ok(())
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        let abs = (-1 - n) as u64;
        encode_uint(buf, 1, abs);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode an array (major type 4).
fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) -> Result<()> {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item)?;
    }
    Ok(())
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> Result<()> {
    let mut key_value_pairs: Vec<(Vec<u8>, &Value)> = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut key_buf = Vec::new();
        encode_value_to(&mut key_buf, k)?;
        key_value_pairs.push((key_buf, v));
    }

    key_value_pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, key_value_pairs.len() as u64);

    for (key_bytes, value) in key_value_pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Unordered {
        zeta: u8,
        alpha: &'static str,
        middle: Vec<u8>,
    }

    #[test]
    fn test_json_keys_sorted_compact() {
        let value = Unordered {
            zeta: 1,
            alpha: "a b",
            middle: vec![1, 2],
        };
        let bytes = canonical_json(&value).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"alpha":"a b","middle":[1,2],"zeta":1}"#
        );
    }

    #[test]
    fn test_json_nested_objects_sorted() {
        let value = serde_json::json!({"b": {"y": 1, "x": 2}, "a": [{"d": 0, "c": null}]});
        let bytes = canonical_json(&value).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"a":[{"c":null,"d":0}],"b":{"x":2,"y":1}}"#
        );
    }

    #[test]
    fn test_json_escapes_strings() {
        let value = serde_json::json!({"k": "quote\" and \\ slash"});
        let bytes = canonical_json(&value).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_integer_encoding() {
        let mut buf = Vec::new();

        encode_uint(&mut buf, 0, 0);
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        buf.clear();
        encode_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 24]);

        buf.clear();
        encode_uint(&mut buf, 0, 256);
        assert_eq!(buf, vec![0x19, 0x01, 0x00]);

        buf.clear();
        encode_integer(&mut buf, (-1i64).into());
        assert_eq!(buf, vec![0x20]);
    }

    #[test]
    fn test_map_key_ordering() {
        let mut buf = Vec::new();
        let entries = vec![
            (Value::Text("nonce".into()), Value::Integer(1.into())),
            (Value::Text("csr".into()), Value::Integer(2.into())),
            (Value::Text("data".into()), Value::Integer(3.into())),
        ];
        encode_map_canonical(&mut buf, &entries).unwrap();

        // Shorter encoded keys sort first: "csr" (0x63) < "data" (0x64) < "nonce" (0x65)
        assert_eq!(buf[0], 0xa3);
        assert_eq!(&buf[1..5], &[0x63, b'c', b's', b'r']);
        assert_eq!(buf[5], 0x02);
        assert_eq!(&buf[6..11], &[0x64, b'd', b'a', b't', b'a']);
    }

    #[test]
    fn test_cbor_roundtrip_through_decoder() {
        let value = serde_json::json!({"data": "0xabc", "nonce": "ff", "n": 3});
        let bytes = canonical_cbor(&value).unwrap();
        let decoded = decode_cbor(&bytes).unwrap();
        let again = encode_cbor_value_canonical(&decoded).unwrap();
        assert_eq!(bytes, again);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_cbor(&[0xff, 0x00, 0x13]).is_err());
    }
}
