//! Deterministic ledger state addresses.
//!
//! An address is 70 lowercase hex characters:
//!
//! ```text
//! family_prefix (6) || public_key[..6] (6) || hash[-58..] (58)
//! ```
//!
//! where `family_prefix` is the first six hex characters of SHA-512 over the
//! family name. Dropping the hash part gives a 12-character prefix usable for
//! range queries over everything one key has written.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::crypto::sha512_hex;
use crate::error::{CoreError, Result};

/// The transaction family this client writes.
pub const FAMILY_NAME: &str = "AirAnchor";

/// The family version this client writes.
pub const FAMILY_VERSION: &str = "1.0";

/// Hex characters taken from the family digest.
pub const FAMILY_PREFIX_LEN: usize = 6;

/// Hex characters taken from the front of the public key.
pub const KEY_PREFIX_LEN: usize = 6;

/// Hex characters taken from the end of the payload hash.
pub const HASH_SUFFIX_LEN: usize = 58;

/// Total length of a full address.
pub const ADDRESS_LEN: usize = FAMILY_PREFIX_LEN + KEY_PREFIX_LEN + HASH_SUFFIX_LEN;

/// A transaction family: name, version and its cached address prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    name: String,
    version: String,
    prefix: String,
}

impl Family {
    /// Create a family, computing its address prefix once.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        let prefix = sha512_hex(name.as_bytes())[..FAMILY_PREFIX_LEN].to_string();
        Self {
            name,
            version: version.into(),
            prefix,
        }
    }

    /// The process-wide default family (`AirAnchor` 1.0).
    pub fn air_anchor() -> &'static Family {
        static FAMILY: OnceLock<Family> = OnceLock::new();
        FAMILY.get_or_init(|| Family::new(FAMILY_NAME, FAMILY_VERSION))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The six hex character namespace prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Derive an address from a public key and, optionally, a payload hash.
    ///
    /// Without a hash the result is the 12-character range prefix.
    pub fn address(&self, key: &str, hash: Option<&str>) -> Result<Address> {
        check_hex("key", key, KEY_PREFIX_LEN)?;

        let mut out = String::with_capacity(ADDRESS_LEN);
        out.push_str(&self.prefix);
        out.push_str(&key[..KEY_PREFIX_LEN].to_ascii_lowercase());

        if let Some(hash) = hash {
            check_hex("hash", hash, HASH_SUFFIX_LEN)?;
            out.push_str(&hash[hash.len() - HASH_SUFFIX_LEN..].to_ascii_lowercase());
        }

        Ok(Address(out))
    }
}

impl Default for Family {
    fn default() -> Self {
        Family::air_anchor().clone()
    }
}

/// Derive an address under the default family.
pub fn make_address(key: &str, hash: Option<&str>) -> Result<Address> {
    Family::air_anchor().address(key, hash)
}

fn check_hex(what: &str, value: &str, min_len: usize) -> Result<()> {
    if !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CoreError::MalformedAddress(format!("{what} is not hex")));
    }
    if value.len() < min_len {
        return Err(CoreError::MalformedAddress(format!(
            "{what} has {} hex characters, need at least {min_len}",
            value.len()
        )));
    }
    Ok(())
}

/// A ledger state address (or a 12-character address prefix).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for a full 70-character state address, false for a range prefix.
    pub fn is_full(&self) -> bool {
        self.0.len() == ADDRESS_LEN
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_of(data: &[u8]) -> String {
        sha512_hex(data)
    }

    #[test]
    fn test_family_prefix_is_digest_head() {
        let family = Family::air_anchor();
        assert_eq!(family.prefix(), &sha512_hex(b"AirAnchor")[..6]);
        assert_eq!(family.name(), FAMILY_NAME);
        assert_eq!(family.version(), FAMILY_VERSION);
    }

    #[test]
    fn test_full_address_layout() {
        let hash = hash_of(b"payload");
        let address = make_address("aabbccddeeff", Some(&hash)).unwrap();

        let expected = format!(
            "{}{}{}",
            Family::air_anchor().prefix(),
            "aabbcc",
            &hash[hash.len() - 58..]
        );
        assert_eq!(address.as_str(), expected);
        assert_eq!(address.as_str().len(), ADDRESS_LEN);
        assert!(address.is_full());
    }

    #[test]
    fn test_prefix_only_address() {
        let address = make_address("aabbccddeeff", None).unwrap();
        assert_eq!(address.as_str().len(), 12);
        assert!(address.as_str().ends_with("aabbcc"));
        assert!(!address.is_full());
    }

    #[test]
    fn test_exactly_58_hash_chars() {
        let hash = "1".repeat(58);
        let address = make_address("aabbcc", Some(&hash)).unwrap();
        assert!(address.as_str().ends_with(&hash));
    }

    #[test]
    fn test_uppercase_input_is_lowered() {
        let hash = "AB".repeat(32);
        let address = make_address("AABBCCDD", Some(&hash)).unwrap();
        assert_eq!(address.as_str(), address.as_str().to_ascii_lowercase());
    }

    #[test]
    fn test_rejects_malformed_input() {
        let hash = hash_of(b"x");
        assert!(make_address("aabb", Some(&hash)).is_err());
        assert!(make_address("zzzzzzzz", Some(&hash)).is_err());
        assert!(make_address("aabbccdd", Some("abc")).is_err());
        assert!(make_address("aabbccdd", Some(&"g".repeat(64))).is_err());
    }

    #[test]
    fn test_families_have_distinct_prefixes() {
        let a = Family::new("AirAnchor", "1.0");
        let b = Family::new("locationKey", "1.0");
        assert_ne!(a.prefix(), b.prefix());
        assert_eq!(&a, Family::air_anchor());
    }
}
