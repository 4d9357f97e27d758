//! Proptest generators for property-based testing.

use proptest::prelude::*;

use air_anchor_core::{sha512_hex, SigningIdentity};

/// Generate a random signing identity.
///
/// Seeds outside the valid scalar range are vanishingly rare and filtered.
pub fn identity() -> impl Strategy<Value = SigningIdentity> {
    any::<[u8; 32]>().prop_filter_map("valid secp256k1 scalar", |seed| {
        SigningIdentity::from_bytes(&seed).ok()
    })
}

/// Generate a lowercase hex string with length in `len`.
pub fn hex_string(len: std::ops::RangeInclusive<usize>) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(b"0123456789abcdef".to_vec()), len)
        .prop_map(|chars| chars.into_iter().map(char::from).collect())
}

/// Generate a hex SHA-512 digest of random bytes.
pub fn payload_hash() -> impl Strategy<Value = String> {
    payload(256).prop_map(|p| sha512_hex(&p))
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate location data the way submitters produce it.
pub fn location_data() -> impl Strategy<Value = String> {
    prop_oneof![
        hex_string(1..=64).prop_map(|h| format!("0x{h}")),
        "[ -~]{0,64}",
    ]
}

/// Parameters for generating a batch.
#[derive(Debug, Clone)]
pub struct BatchParams {
    pub identity: SigningIdentity,
    pub payloads: Vec<Vec<u8>>,
}

impl Arbitrary for BatchParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (identity(), prop::collection::vec(payload(128), 1..=5))
            .prop_map(|(identity, payloads)| BatchParams { identity, payloads })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use air_anchor_core::{
        make_address, Batch, BatchBuilder, CertificateRequest, Family, LedgerTransaction,
        TransactionBuilder, TransactionRequest, ADDRESS_LEN,
    };

    fn build(params: &BatchParams) -> Batch {
        params
            .payloads
            .iter()
            .map(|p| {
                TransactionBuilder::new(Family::air_anchor())
                    .payload(p.clone())
                    .sign(&params.identity)
                    .unwrap()
            })
            .fold(BatchBuilder::new(), BatchBuilder::add_transaction)
            .sign(&params.identity)
            .unwrap()
    }

    proptest! {
        #[test]
        fn test_address_is_deterministic_and_fixed_length(
            key in hex_string(6..=66),
            hash in payload_hash(),
        ) {
            let a1 = make_address(&key, Some(&hash)).unwrap();
            let a2 = make_address(&key, Some(&hash)).unwrap();

            prop_assert_eq!(&a1, &a2);
            prop_assert_eq!(a1.as_str().len(), ADDRESS_LEN);
            prop_assert!(a1.as_str().starts_with(Family::air_anchor().prefix()));
            prop_assert!(a1.as_str().ends_with(&hash[hash.len() - 58..]));
        }

        #[test]
        fn test_signature_verifies_only_under_signer(
            signer in identity(),
            other in identity(),
            message in payload(512),
        ) {
            prop_assume!(signer.public_key() != other.public_key());

            let signature = signer.sign(&message);
            prop_assert!(signer.public_key().verify(&message, &signature).is_ok());
            prop_assert!(other.public_key().verify(&message, &signature).is_err());
        }

        #[test]
        fn test_batch_lists_transaction_ids_in_order(params: BatchParams) {
            let batch = build(&params);
            let ids: Vec<_> = batch.transactions.iter().map(LedgerTransaction::id).collect();

            prop_assert_eq!(batch.header.transaction_ids.len(), params.payloads.len());
            prop_assert_eq!(&batch.header.transaction_ids, &ids);
            prop_assert!(batch.verify().is_ok());
        }

        #[test]
        fn test_transaction_inputs_equal_outputs(params: BatchParams) {
            let batch = build(&params);
            for txn in &batch.transactions {
                prop_assert_eq!(txn.header.inputs.len(), 1);
                prop_assert_eq!(&txn.header.inputs, &txn.header.outputs);
                prop_assert!(txn.header.dependencies.is_empty());
            }
        }

        #[test]
        fn test_transaction_request_roundtrip(signer in identity(), data in location_data()) {
            let csr = CertificateRequest::create(&signer, "DRON").unwrap();
            let request = TransactionRequest::create(&signer, csr, &data).unwrap();

            let decoded = TransactionRequest::from_bytes(&request.to_bytes().unwrap()).unwrap();
            prop_assert_eq!(&decoded.data, &data);
            prop_assert_eq!(&decoded.header.data_sha512, &sha512_hex(data.as_bytes()));
            prop_assert!(decoded.verify().is_ok());
        }
    }
}
