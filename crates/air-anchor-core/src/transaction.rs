//! Ledger transactions and batches.
//!
//! A [`LedgerTransaction`] wraps an opaque payload with a signed header that
//! declares the single state address it reads and writes. A [`Batch`] groups
//! one or more signed transactions under a covering signature; it is the
//! atomic unit the ledger accepts.

use bytes::Bytes;
use prost::Message;

use crate::address::{Address, Family};
use crate::crypto::{random_transaction_nonce, sha512_hex, PublicKey, Signature};
use crate::error::{CoreError, Result};
use crate::identity::SigningIdentity;
use crate::wire;

/// A signed ledger transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerTransaction {
    /// The decoded header.
    pub header: wire::TransactionHeader,

    /// The encoded header bytes, exactly as signed.
    pub header_bytes: Bytes,

    /// The opaque payload.
    pub payload: Bytes,

    /// Signature over `header_bytes`; doubles as the transaction id.
    pub header_signature: Signature,
}

impl LedgerTransaction {
    /// The transaction id (hex header signature).
    pub fn id(&self) -> String {
        self.header_signature.to_hex()
    }

    /// The state address this transaction writes.
    pub fn address(&self) -> Option<&str> {
        self.header.outputs.first().map(String::as_str)
    }

    /// Verify the header signature and the payload hash.
    pub fn verify(&self) -> Result<()> {
        let signer = PublicKey::from_hex(&self.header.signer_public_key)?;
        signer.verify(&self.header_bytes, &self.header_signature)?;

        let actual = sha512_hex(&self.payload);
        if actual != self.header.payload_sha512 {
            return Err(CoreError::DataHashMismatch {
                expected: self.header.payload_sha512.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// Convert to the wire message.
    pub fn to_wire(&self) -> wire::Transaction {
        wire::Transaction {
            header: self.header_bytes.to_vec(),
            header_signature: self.header_signature.to_hex(),
            payload: self.payload.to_vec(),
        }
    }

    /// Parse a wire message, decoding the embedded header.
    pub fn from_wire(txn: wire::Transaction) -> Result<Self> {
        let header = wire::TransactionHeader::decode(txn.header.as_slice())
            .map_err(|e| CoreError::DecodingError(e.to_string()))?;
        Ok(Self {
            header,
            header_bytes: txn.header.into(),
            payload: txn.payload.into(),
            header_signature: Signature::from_hex(&txn.header_signature)?,
        })
    }
}

/// Builder for signed ledger transactions.
pub struct TransactionBuilder {
    family: Family,
    payload: Bytes,
    nonce: Option<String>,
    dependencies: Vec<String>,
}

impl TransactionBuilder {
    /// Start building a transaction for `family`.
    pub fn new(family: &Family) -> Self {
        Self {
            family: family.clone(),
            payload: Bytes::new(),
            nonce: None,
            dependencies: Vec::new(),
        }
    }

    /// Set the payload.
    pub fn payload(mut self, p: impl Into<Bytes>) -> Self {
        self.payload = p.into();
        self
    }

    /// Fix the nonce instead of drawing a random one.
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Declare a transaction this one depends on.
    pub fn add_dependency(mut self, txn_id: impl Into<String>) -> Self {
        self.dependencies.push(txn_id.into());
        self
    }

    /// Build and sign the transaction.
    ///
    /// The signer also acts as batcher. Inputs and outputs are both the single
    /// address derived from the signer key and the payload hash.
    pub fn sign(self, identity: &SigningIdentity) -> Result<LedgerTransaction> {
        let payload_sha512 = sha512_hex(&self.payload);
        let key = identity.public_key_hex();
        let address = self.family.address(&key, Some(&payload_sha512))?;

        let header = wire::TransactionHeader {
            batcher_public_key: key.clone(),
            dependencies: self.dependencies,
            family_name: self.family.name().to_string(),
            family_version: self.family.version().to_string(),
            inputs: vec![address.as_str().to_string()],
            nonce: self.nonce.unwrap_or_else(random_transaction_nonce),
            outputs: vec![address.into_string()],
            payload_sha512,
            signer_public_key: key,
        };

        let header_bytes = header.encode_to_vec();
        let header_signature = identity.sign(&header_bytes);

        Ok(LedgerTransaction {
            header,
            header_bytes: header_bytes.into(),
            payload: self.payload,
            header_signature,
        })
    }
}

/// A signed batch of transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// The decoded header.
    pub header: wire::BatchHeader,

    /// The encoded header bytes, exactly as signed.
    pub header_bytes: Bytes,

    /// Transactions in header order.
    pub transactions: Vec<LedgerTransaction>,

    /// Signature over `header_bytes`.
    pub header_signature: Signature,
}

impl Batch {
    /// The batch id (hex header signature).
    pub fn id(&self) -> String {
        self.header_signature.to_hex()
    }

    /// Verify the batch signature, that the header's transaction id list
    /// matches the transactions in order, and every transaction.
    pub fn verify(&self) -> Result<()> {
        let signer = PublicKey::from_hex(&self.header.signer_public_key)?;
        signer.verify(&self.header_bytes, &self.header_signature)?;

        if self.header.transaction_ids.len() != self.transactions.len() {
            return Err(CoreError::MalformedBatch(format!(
                "header lists {} transactions, batch carries {}",
                self.header.transaction_ids.len(),
                self.transactions.len()
            )));
        }

        for (i, (id, txn)) in self
            .header
            .transaction_ids
            .iter()
            .zip(&self.transactions)
            .enumerate()
        {
            if *id != txn.id() {
                return Err(CoreError::MalformedBatch(format!(
                    "transaction {i} does not match header id"
                )));
            }
            txn.verify()?;
        }
        Ok(())
    }

    /// Convert to the wire message.
    pub fn to_wire(&self) -> wire::Batch {
        wire::Batch {
            header: self.header_bytes.to_vec(),
            header_signature: self.header_signature.to_hex(),
            transactions: self.transactions.iter().map(LedgerTransaction::to_wire).collect(),
            trace: false,
        }
    }

    /// Parse a wire message, decoding every embedded header.
    pub fn from_wire(batch: wire::Batch) -> Result<Self> {
        let header = wire::BatchHeader::decode(batch.header.as_slice())
            .map_err(|e| CoreError::DecodingError(e.to_string()))?;
        let transactions = batch
            .transactions
            .into_iter()
            .map(LedgerTransaction::from_wire)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            header,
            header_bytes: batch.header.into(),
            transactions,
            header_signature: Signature::from_hex(&batch.header_signature)?,
        })
    }

    /// Encode as a single-batch `BatchList`, the body of a submission.
    pub fn to_batch_list_bytes(&self) -> Vec<u8> {
        encode_batch_list(std::slice::from_ref(self))
    }
}

/// Builder for signed batches.
#[derive(Default)]
pub struct BatchBuilder {
    transactions: Vec<LedgerTransaction>,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction.
    pub fn add_transaction(mut self, txn: LedgerTransaction) -> Self {
        self.transactions.push(txn);
        self
    }

    /// Build and sign the batch. The header lists transaction ids in the same
    /// order as the transactions.
    pub fn sign(self, identity: &SigningIdentity) -> Result<Batch> {
        if self.transactions.is_empty() {
            return Err(CoreError::MalformedBatch("batch has no transactions".into()));
        }

        let header = wire::BatchHeader {
            signer_public_key: identity.public_key_hex(),
            transaction_ids: self.transactions.iter().map(LedgerTransaction::id).collect(),
        };

        let header_bytes = header.encode_to_vec();
        let header_signature = identity.sign(&header_bytes);

        Ok(Batch {
            header,
            header_bytes: header_bytes.into(),
            transactions: self.transactions,
            header_signature,
        })
    }
}

/// Wrap an opaque payload into a signed single-transaction batch.
pub fn wrap(identity: &SigningIdentity, payload: &[u8], family: &Family) -> Result<Batch> {
    let txn = TransactionBuilder::new(family)
        .payload(payload.to_vec())
        .sign(identity)?;

    BatchBuilder::new().add_transaction(txn).sign(identity)
}

/// The address a payload signed by `identity` will be written to.
pub fn payload_address(
    identity: &SigningIdentity,
    payload: &[u8],
    family: &Family,
) -> Result<Address> {
    family.address(&identity.public_key_hex(), Some(&sha512_hex(payload)))
}

/// Encode batches as a `BatchList` wire message.
pub fn encode_batch_list(batches: &[Batch]) -> Vec<u8> {
    wire::BatchList {
        batches: batches.iter().map(Batch::to_wire).collect(),
    }
    .encode_to_vec()
}

/// Decode a `BatchList` wire message.
pub fn decode_batch_list(bytes: &[u8]) -> Result<Vec<Batch>> {
    let list =
        wire::BatchList::decode(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;
    list.batches.into_iter().map(Batch::from_wire).collect()
}
