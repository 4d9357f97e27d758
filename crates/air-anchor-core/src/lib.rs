//! # Air Anchor Core
//!
//! Pure primitives for anchoring location records on a ledger: signing
//! identities, deterministic state addresses, signed requests, and the
//! transaction/batch envelopes the ledger accepts.
//!
//! This crate contains no I/O beyond reading a key file. Everything else is
//! computation over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`SigningIdentity`] - secp256k1 keypair that signs everything
//! - [`Family`] / [`Address`] - namespace prefix and derived state addresses
//! - [`CertificateRequest`] / [`TransactionRequest`] - signed identity claim and relay unit
//! - [`LedgerTransaction`] / [`Batch`] - the ledger's signed envelopes
//! - [`LocationPayload`] - the record written to state
//!
//! ## Canonicalization
//!
//! Request headers are signed over canonical JSON; the location payload uses
//! deterministic CBOR. See the [`canonical`] module.

pub mod address;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod payload;
pub mod request;
pub mod transaction;
pub mod wire;

pub use address::{make_address, Address, Family, ADDRESS_LEN, FAMILY_NAME, FAMILY_VERSION};
pub use canonical::{canonical_cbor, canonical_json, decode_cbor};
pub use crypto::{sha512_hex, PublicKey, Sha512Hash, Signature};
pub use error::{CoreError, Result};
pub use identity::SigningIdentity;
pub use payload::LocationPayload;
pub use request::{
    CertificateRequest, CertificateRequestHeader, TransactionRequest, TransactionRequestHeader,
};
pub use transaction::{
    decode_batch_list, encode_batch_list, payload_address, wrap, Batch, BatchBuilder,
    LedgerTransaction, TransactionBuilder,
};
