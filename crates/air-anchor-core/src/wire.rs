//! Protobuf wire messages understood by the ledger's REST API.
//!
//! Field numbers follow the ledger's `transaction.proto` and `batch.proto`.
//! Header messages are encoded once and the resulting bytes are what gets
//! signed, so they travel as opaque `bytes` inside their envelopes.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionHeader {
    #[prost(string, tag = "1")]
    pub batcher_public_key: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "2")]
    pub dependencies: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, tag = "3")]
    pub family_name: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub family_version: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "5")]
    pub inputs: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, tag = "6")]
    pub nonce: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "7")]
    pub outputs: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, tag = "9")]
    pub payload_sha512: ::prost::alloc::string::String,
    #[prost(string, tag = "10")]
    pub signer_public_key: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Transaction {
    #[prost(bytes = "vec", tag = "1")]
    pub header: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "2")]
    pub header_signature: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "3")]
    pub payload: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchHeader {
    #[prost(string, tag = "1")]
    pub signer_public_key: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "2")]
    pub transaction_ids: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Batch {
    #[prost(bytes = "vec", tag = "1")]
    pub header: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "2")]
    pub header_signature: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub transactions: ::prost::alloc::vec::Vec<Transaction>,
    #[prost(bool, tag = "4")]
    pub trace: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchList {
    #[prost(message, repeated, tag = "1")]
    pub batches: ::prost::alloc::vec::Vec<Batch>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_batch_header_encoding_is_field_ordered() {
        let header = BatchHeader {
            signer_public_key: "ab".into(),
            transaction_ids: vec!["cd".into(), "ef".into()],
        };

        let bytes = header.encode_to_vec();
        // field 1 (len-delimited) "ab", then field 2 twice
        assert_eq!(
            bytes,
            vec![0x0a, 2, b'a', b'b', 0x12, 2, b'c', b'd', 0x12, 2, b'e', b'f']
        );
    }

    #[test]
    fn test_batch_list_round_trip() {
        let list = BatchList {
            batches: vec![Batch {
                header: vec![1, 2, 3],
                header_signature: "sig".into(),
                transactions: vec![Transaction {
                    header: vec![4],
                    header_signature: "tsig".into(),
                    payload: b"payload".to_vec(),
                }],
                trace: false,
            }],
        };

        let decoded = BatchList::decode(list.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded, list);
    }
}
